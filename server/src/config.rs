use std::time::Duration;

use anyhow::{Context, Result, anyhow};

/// Where directory records live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// Process-local tables, optionally slowed down to mimic a remote store.
    Memory,
    /// sea-orm tables reached through `DATABASE_URL`.
    Database,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Memory => "memory",
            Backend::Database => "database",
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub backend: Backend,
    pub simulated_latency: Duration,
    pub seed_demo_data: bool,
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let backend = match lookup("DIRECTORY_BACKEND")
            .map(|val| val.trim().to_lowercase())
            .as_deref()
        {
            None | Some("") | Some("memory") => Backend::Memory,
            Some("database") | Some("db") => Backend::Database,
            Some(other) => {
                return Err(anyhow!(
                    "DIRECTORY_BACKEND must be `memory` or `database`, got `{other}`"
                ));
            }
        };

        let simulated_latency = match lookup("SIMULATED_LATENCY_MS") {
            Some(raw) if !raw.trim().is_empty() => {
                let millis: u64 = raw
                    .trim()
                    .parse()
                    .context("invalid SIMULATED_LATENCY_MS")?;
                Duration::from_millis(millis)
            }
            _ => Duration::ZERO,
        };

        let seed_demo_data = lookup("SEED_DEMO_DATA")
            .map(|val| matches!(val.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(true);

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect::<Vec<_>>();

        Ok(Self {
            backend,
            simulated_latency,
            seed_demo_data,
            cors_allowed_origins,
        })
    }
}
