//! Fixed seven-step onboarding checklist.
//!
//! Steps are independent flags: any step may be toggled at any time, and the
//! only thing derived from them is the completion percentage. The checklist is
//! never extended or shrunk at runtime.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{HrError, HrResult},
    model::{Employee, RecordId},
    service::EmployeeService,
};

#[derive(Clone, Copy, Debug)]
pub struct StepTemplate {
    pub id: u8,
    pub title: &'static str,
    pub description: &'static str,
}

pub const ONBOARDING_TEMPLATE: [StepTemplate; 7] = [
    StepTemplate {
        id: 1,
        title: "Complete Personal Information",
        description: "Fill out all required personal details and emergency contacts",
    },
    StepTemplate {
        id: 2,
        title: "Review Company Handbook",
        description: "Read and acknowledge the employee handbook and policies",
    },
    StepTemplate {
        id: 3,
        title: "Set Up IT Equipment",
        description: "Configure laptop, email, and access to necessary systems",
    },
    StepTemplate {
        id: 4,
        title: "Complete HR Paperwork",
        description: "Submit tax forms, benefits enrollment, and other required documents",
    },
    StepTemplate {
        id: 5,
        title: "Attend Orientation Session",
        description: "Participate in company orientation and meet team members",
    },
    StepTemplate {
        id: 6,
        title: "Complete Security Training",
        description: "Finish required security awareness and compliance training",
    },
    StepTemplate {
        id: 7,
        title: "Manager Check-in",
        description: "Schedule and complete initial check-in with direct manager",
    },
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingStep {
    pub id: u8,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

impl From<&StepTemplate> for OnboardingStep {
    fn from(template: &StepTemplate) -> Self {
        Self {
            id: template.id,
            title: template.title.to_string(),
            description: template.description.to_string(),
            completed: false,
        }
    }
}

/// The canonical checklist with nothing completed.
pub fn template_steps() -> Vec<OnboardingStep> {
    ONBOARDING_TEMPLATE.iter().map(OnboardingStep::from).collect()
}

/// True when `steps` carries exactly the template's step ids, in order.
pub fn matches_template(steps: &[OnboardingStep]) -> bool {
    steps.len() == ONBOARDING_TEMPLATE.len()
        && steps
            .iter()
            .zip(ONBOARDING_TEMPLATE.iter())
            .all(|(step, template)| step.id == template.id)
}

/// Copy of `steps` with `step_id` flipped. `None` if no such step exists.
pub fn toggled(steps: &[OnboardingStep], step_id: u8) -> Option<Vec<OnboardingStep>> {
    if !steps.iter().any(|step| step.id == step_id) {
        return None;
    }
    Some(
        steps
            .iter()
            .map(|step| {
                let mut step = step.clone();
                if step.id == step_id {
                    step.completed = !step.completed;
                }
                step
            })
            .collect(),
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OnboardingProgress {
    pub completed_count: usize,
    pub total_steps: usize,
    pub percentage: u8,
}

impl OnboardingProgress {
    pub fn of(steps: &[OnboardingStep]) -> Self {
        let completed_count = steps.iter().filter(|step| step.completed).count();
        let total_steps = steps.len();
        let percentage = if total_steps == 0 {
            0
        } else {
            (100.0 * completed_count as f64 / total_steps as f64).round() as u8
        };
        Self {
            completed_count,
            total_steps,
            percentage,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.percentage == 100
    }
}

/// Checklist state as shown to a user, kept in step with storage.
///
/// A toggle is applied to the visible steps first, then persisted; if
/// persisting fails the visible steps are reset to the last committed ones.
#[derive(Clone, Debug)]
pub struct OnboardingEditor {
    employee_id: RecordId,
    committed: Vec<OnboardingStep>,
    visible: Vec<OnboardingStep>,
}

impl OnboardingEditor {
    pub fn new(employee: &Employee) -> Self {
        Self {
            employee_id: employee.id,
            committed: employee.onboarding_progress.clone(),
            visible: employee.onboarding_progress.clone(),
        }
    }

    pub fn employee_id(&self) -> RecordId {
        self.employee_id
    }

    pub fn steps(&self) -> &[OnboardingStep] {
        &self.visible
    }

    pub fn progress(&self) -> OnboardingProgress {
        OnboardingProgress::of(&self.visible)
    }

    pub async fn toggle(
        &mut self,
        service: &EmployeeService,
        step_id: u8,
    ) -> HrResult<OnboardingStep> {
        let next = toggled(&self.visible, step_id)
            .ok_or_else(|| HrError::invalid_field("stepId", format!("unknown step {step_id}")))?;
        self.visible = next.clone();

        match service
            .update_onboarding_progress(self.employee_id, next)
            .await
        {
            Ok(stored) => {
                self.committed = stored.onboarding_progress;
                self.visible = self.committed.clone();
                debug!(employee_id = self.employee_id, step_id, "onboarding step committed");
                self.visible
                    .iter()
                    .find(|step| step.id == step_id)
                    .cloned()
                    .ok_or_else(|| {
                        HrError::invalid_field("stepId", format!("step {step_id} not persisted"))
                    })
            }
            Err(err) => {
                self.visible = self.committed.clone();
                Err(err)
            }
        }
    }
}
