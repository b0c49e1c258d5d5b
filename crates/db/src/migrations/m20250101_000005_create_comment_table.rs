//! Create comment table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Comment::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Comment::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Comment::MeepId).string_len(32).not_null())
                    .col(ColumnDef::new(Comment::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Comment::Body).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Comment::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (meep_id, created_at) for comment listings
        manager
            .create_index(
                Index::create()
                    .name("idx_comment_meep_id_created_at")
                    .table(Comment::Table)
                    .col(Comment::MeepId)
                    .col(Comment::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Foreign key: meep_id -> meep.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_comment_meep_id")
                    .from(Comment::Table, Comment::MeepId)
                    .to(Meep::Table, Meep::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        // Foreign key: user_id -> user.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_comment_user_id")
                    .from(Comment::Table, Comment::UserId)
                    .to(User::Table, User::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Comment::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Comment {
    Table,
    Id,
    MeepId,
    UserId,
    Body,
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
