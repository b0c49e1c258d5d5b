//! Create meep_hashtag link table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MeepHashtag::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MeepHashtag::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MeepHashtag::MeepId).string_len(32).not_null())
                    .col(ColumnDef::new(MeepHashtag::HashtagId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(MeepHashtag::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one link per (meep, hashtag) pair
        manager
            .create_index(
                Index::create()
                    .name("idx_meep_hashtag_pair")
                    .table(MeepHashtag::Table)
                    .col(MeepHashtag::MeepId)
                    .col(MeepHashtag::HashtagId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Composite index: (hashtag_id, created_at) for per-tag counting
        manager
            .create_index(
                Index::create()
                    .name("idx_meep_hashtag_hashtag_id_created_at")
                    .table(MeepHashtag::Table)
                    .col(MeepHashtag::HashtagId)
                    .col(MeepHashtag::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Composite index: (created_at, hashtag_id) for window scans
        manager
            .create_index(
                Index::create()
                    .name("idx_meep_hashtag_created_at_hashtag_id")
                    .table(MeepHashtag::Table)
                    .col(MeepHashtag::CreatedAt)
                    .col(MeepHashtag::HashtagId)
                    .to_owned(),
            )
            .await?;

        // Foreign key: meep_id -> meep.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_meep_hashtag_meep_id")
                    .from(MeepHashtag::Table, MeepHashtag::MeepId)
                    .to(Meep::Table, Meep::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        // Foreign key: hashtag_id -> hashtag.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_meep_hashtag_hashtag_id")
                    .from(MeepHashtag::Table, MeepHashtag::HashtagId)
                    .to(Hashtag::Table, Hashtag::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MeepHashtag::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MeepHashtag {
    Table,
    Id,
    MeepId,
    HashtagId,
    CreatedAt,
}

#[derive(Iden)]
enum Meep {
    Table,
    Id,
}

#[derive(Iden)]
enum Hashtag {
    Table,
    Id,
}
