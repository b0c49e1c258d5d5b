//! Create meep table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Meep::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Meep::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Meep::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Meep::Body).string_len(200).not_null())
                    .col(ColumnDef::new(Meep::LikesCount).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Meep::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Meep::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Composite index: (user_id, created_at) for author timelines
        manager
            .create_index(
                Index::create()
                    .name("idx_meep_user_id_created_at")
                    .table(Meep::Table)
                    .col(Meep::UserId)
                    .col(Meep::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (trending window predicate)
        manager
            .create_index(
                Index::create()
                    .name("idx_meep_created_at")
                    .table(Meep::Table)
                    .col(Meep::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Foreign key: user_id -> user.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_meep_user_id")
                    .from(Meep::Table, Meep::UserId)
                    .to(User::Table, User::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Meep::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Meep {
    Table,
    Id,
    UserId,
    Body,
    LikesCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
