use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Employees {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    Phone,
    PhotoUrl,
    Role,
    Department,
    StartDate,
    Status,
    ManagerId,
    OnboardingProgress,
}

#[derive(DeriveIden)]
enum Departments {
    Table,
    Id,
    Name,
    Description,
    HeadId,
    ParentDepartmentId,
    EmployeeCount,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Manager, head and parent ids are deliberately left without
        // foreign keys: dangling references are allowed.
        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Employees::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Employees::FirstName).string_len(128).not_null())
                    .col(ColumnDef::new(Employees::LastName).string_len(128).not_null())
                    .col(ColumnDef::new(Employees::Email).string_len(320).not_null())
                    .col(ColumnDef::new(Employees::Phone).string_len(64).not_null())
                    .col(ColumnDef::new(Employees::PhotoUrl).string_len(1024))
                    .col(ColumnDef::new(Employees::Role).string_len(128).not_null())
                    .col(ColumnDef::new(Employees::Department).string_len(128).not_null())
                    .col(ColumnDef::new(Employees::StartDate).date().not_null())
                    .col(
                        ColumnDef::new(Employees::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Employees::ManagerId).integer())
                    .col(ColumnDef::new(Employees::OnboardingProgress).json().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Departments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Departments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Departments::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Departments::Description).text())
                    .col(ColumnDef::new(Departments::HeadId).integer())
                    .col(ColumnDef::new(Departments::ParentDepartmentId).integer())
                    .col(
                        ColumnDef::new(Departments::EmployeeCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Departments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Employees::Table).to_owned())
            .await?;
        Ok(())
    }
}
