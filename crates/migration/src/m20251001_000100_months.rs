//! Closed month summaries.
//!
//! One row per close, never updated. `id` is the recency key, so it must stay
//! monotonic (auto-increment).

use sea_orm_migration::prelude::*;

use crate::m20251001_000000_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Months {
    Table,
    Id,
    UserId,
    Month,
    ReceivedMinor,
    DiscountsMinor,
    RemainderMinor,
    ClosedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Months::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Months::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Months::UserId).string().not_null())
                    .col(ColumnDef::new(Months::Month).string().not_null())
                    .col(
                        ColumnDef::new(Months::ReceivedMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Months::DiscountsMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Months::RemainderMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Months::ClosedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-months-user_id")
                            .from(Months::Table, Months::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-months-user_id-id")
                    .table(Months::Table)
                    .col(Months::UserId)
                    .col(Months::Id)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Months::Table).to_owned())
            .await
    }
}
