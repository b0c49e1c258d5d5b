//! Create meep_like table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MeepLike::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MeepLike::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(MeepLike::MeepId).string_len(32).not_null())
                    .col(ColumnDef::new(MeepLike::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(MeepLike::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one like per (meep, user) pair
        manager
            .create_index(
                Index::create()
                    .name("idx_meep_like_pair")
                    .table(MeepLike::Table)
                    .col(MeepLike::MeepId)
                    .col(MeepLike::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Foreign key: meep_id -> meep.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_meep_like_meep_id")
                    .from(MeepLike::Table, MeepLike::MeepId)
                    .to(Meep::Table, Meep::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        // Foreign key: user_id -> user.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_meep_like_user_id")
                    .from(MeepLike::Table, MeepLike::UserId)
                    .to(User::Table, User::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MeepLike::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MeepLike {
    Table,
    Id,
    MeepId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum Meep {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
