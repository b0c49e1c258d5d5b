//! Meep-hashtag link repository.
//!
//! Owns the link table shared by the extractor (writes) and the trending
//! aggregator (windowed counts).

use std::sync::Arc;

use crate::entities::{MeepHashtag, hashtag, meep, meep_hashtag};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Alias, Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, SqlErr, TransactionTrait,
};
use squeaker_common::{AppError, AppResult, IdGenerator};

/// One hashtag's usage within a trending window.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct TagUsage {
    /// Hashtag name (lowercase, without #).
    pub name: String,
    /// Number of distinct meeps linking to the tag within the window.
    pub meep_count: i64,
}

/// Meep-hashtag link repository for database operations.
#[derive(Clone)]
pub struct MeepHashtagRepository {
    db: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
}

impl MeepHashtagRepository {
    /// Create a new meep-hashtag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// Find all links for a meep.
    pub async fn find_by_meep(&self, meep_id: &str) -> AppResult<Vec<meep_hashtag::Model>> {
        MeepHashtag::find()
            .filter(meep_hashtag::Column::MeepId.eq(meep_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a link if absent. Returns `true` if a row was inserted.
    ///
    /// A duplicate (meep, hashtag) pair trips the unique index and is
    /// treated as a silent no-op.
    pub async fn create_if_absent(&self, meep_id: &str, hashtag_id: &str) -> AppResult<bool> {
        let model = meep_hashtag::ActiveModel {
            id: Set(self.id_gen.generate()),
            meep_id: Set(meep_id.to_string()),
            hashtag_id: Set(hashtag_id.to_string()),
            created_at: Set(Utc::now().into()),
        };

        match model.insert(self.db.as_ref()).await {
            Ok(_) => Ok(true),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(false)
            }
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Replace a meep's entire link set in one transaction.
    ///
    /// Delete-and-replace keeps concurrent re-indexing of the same meep
    /// from interleaving: the meep ends up with exactly one submitted
    /// body's link set.
    pub async fn replace_for_meep(&self, meep_id: &str, hashtag_ids: &[String]) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        MeepHashtag::delete_many()
            .filter(meep_hashtag::Column::MeepId.eq(meep_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !hashtag_ids.is_empty() {
            let now = Utc::now();
            let models = hashtag_ids.iter().map(|hashtag_id| meep_hashtag::ActiveModel {
                id: Set(self.id_gen.generate()),
                meep_id: Set(meep_id.to_string()),
                hashtag_id: Set(hashtag_id.clone()),
                created_at: Set(now.into()),
            });

            MeepHashtag::insert_many(models)
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete every link row (used by the backfill tool before a rebuild).
    pub async fn delete_all(&self) -> AppResult<u64> {
        let result = MeepHashtag::delete_many()
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Windowed usage counts per hashtag, ordered for trending.
    ///
    /// Counts distinct meeps created at or after `window_start` per linked
    /// hashtag, keeps tags with at least `min_count` meeps, and orders by
    /// count descending with name ascending as the tie-break. The distinct
    /// count guards against join fan-out double counting.
    pub async fn count_by_hashtag_since(
        &self,
        window_start: DateTime<Utc>,
        limit: u64,
        min_count: u64,
    ) -> AppResult<Vec<TagUsage>> {
        let distinct_meeps = Func::count_distinct(Expr::col((meep::Entity, meep::Column::Id)));

        MeepHashtag::find()
            .select_only()
            .column_as(hashtag::Column::Name, "name")
            .column_as(Expr::expr(distinct_meeps.clone()), "meep_count")
            .join(JoinType::InnerJoin, meep_hashtag::Relation::Meep.def())
            .join(JoinType::InnerJoin, meep_hashtag::Relation::Hashtag.def())
            .filter(meep::Column::CreatedAt.gte(window_start))
            .group_by(hashtag::Column::Name)
            .having(Expr::expr(distinct_meeps).gte(min_count as i64))
            .order_by_desc(Expr::col(Alias::new("meep_count")))
            .order_by_asc(hashtag::Column::Name)
            .limit(limit)
            .into_model::<TagUsage>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    #[tokio::test]
    async fn test_find_by_meep() {
        let link = meep_hashtag::Model {
            id: "l1".to_string(),
            meep_id: "m1".to_string(),
            hashtag_id: "h1".to_string(),
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[link]])
                .into_connection(),
        );

        let repo = MeepHashtagRepository::new(db);
        let result = repo.find_by_meep("m1").await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].hashtag_id, "h1");
    }

    #[tokio::test]
    async fn test_count_by_hashtag_since_maps_rows() {
        let rows = vec![
            btreemap! {
                "name" => Value::from("go"),
                "meep_count" => Value::from(3i64),
            },
            btreemap! {
                "name" => Value::from("rust"),
                "meep_count" => Value::from(3i64),
            },
            btreemap! {
                "name" => Value::from("cats"),
                "meep_count" => Value::from(2i64),
            },
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([rows])
                .into_connection(),
        );

        let repo = MeepHashtagRepository::new(db);
        let usage = repo
            .count_by_hashtag_since(Utc::now(), 10, 1)
            .await
            .unwrap();

        assert_eq!(usage.len(), 3);
        assert_eq!(usage[0].name, "go");
        assert_eq!(usage[0].meep_count, 3);
        assert_eq!(usage[2].name, "cats");
    }

    #[tokio::test]
    async fn test_count_by_hashtag_since_empty_window() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<std::collections::BTreeMap<&str, Value>>::new()])
                .into_connection(),
        );

        let repo = MeepHashtagRepository::new(db);
        let usage = repo
            .count_by_hashtag_since(Utc::now(), 10, 1)
            .await
            .unwrap();

        assert!(usage.is_empty());
    }
}
