//! Migration: Track password changes and reset tokens on users.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const RESET_TOKEN_INDEX: &str = "idx_users_password_reset_token";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .add_column(
                        ColumnDef::new(Users::PasswordChangedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .add_column(ColumnDef::new(Users::PasswordResetToken).string().null())
                    .add_column(
                        ColumnDef::new(Users::PasswordResetExpires)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Reset links are looked up by token digest
        manager
            .create_index(
                Index::create()
                    .name(RESET_TOKEN_INDEX)
                    .table(Users::Table)
                    .col(Users::PasswordResetToken)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(RESET_TOKEN_INDEX)
                    .table(Users::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .drop_column(Users::PasswordChangedAt)
                    .drop_column(Users::PasswordResetToken)
                    .drop_column(Users::PasswordResetExpires)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    PasswordChangedAt,
    PasswordResetToken,
    PasswordResetExpires,
}
