//! Hashtag service.
//!
//! Extracts `#hashtags` from meep bodies and keeps the tag index in sync
//! with the current body text.

use regex::Regex;
use squeaker_common::{AppError, AppResult};
use squeaker_db::{
    entities::hashtag,
    repositories::{HashtagRepository, MeepHashtagRepository},
};

// Regex pattern - a valid static pattern that cannot fail
#[allow(clippy::unwrap_used)]
static HASHTAG_RE: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"#(\w+)").unwrap());

/// Extract hashtag names from text.
///
/// Names are lowercased and deduplicated while keeping the order of first
/// occurrence. The leading `#` is stripped.
#[must_use]
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let mut tags = Vec::new();
    for capture in HASHTAG_RE.captures_iter(text) {
        let name = capture[1].to_lowercase();
        if !tags.contains(&name) {
            tags.push(name);
        }
    }
    tags
}

/// Hashtag service for business logic.
#[derive(Clone)]
pub struct HashtagService {
    hashtag_repo: HashtagRepository,
    meep_hashtag_repo: MeepHashtagRepository,
}

impl HashtagService {
    /// Create a new hashtag service.
    #[must_use]
    pub const fn new(
        hashtag_repo: HashtagRepository,
        meep_hashtag_repo: MeepHashtagRepository,
    ) -> Self {
        Self {
            hashtag_repo,
            meep_hashtag_repo,
        }
    }

    /// Get a hashtag by name.
    pub async fn get(&self, name: &str) -> AppResult<hashtag::Model> {
        self.hashtag_repo
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Hashtag not found: {name}")))
    }

    /// Search hashtags by prefix.
    pub async fn search(&self, query: &str, limit: u64) -> AppResult<Vec<hashtag::Model>> {
        self.hashtag_repo.search(query, limit).await
    }

    /// Get the most recently created hashtags.
    pub async fn recent(&self, limit: u64) -> AppResult<Vec<hashtag::Model>> {
        self.hashtag_repo.find_recent(limit).await
    }

    /// Rebuild the tag links for a meep from its current body.
    ///
    /// Each extracted name is resolved with get-or-create, then the meep's
    /// existing links are replaced with links to the resolved tags in a
    /// single transaction. A body with no hashtags clears the links.
    pub async fn index_meep(&self, meep_id: &str, body: &str) -> AppResult<Vec<hashtag::Model>> {
        let names = extract_hashtags(body);

        let mut tags = Vec::with_capacity(names.len());
        for name in &names {
            tags.push(self.hashtag_repo.get_or_create(name).await?);
        }

        let tag_ids: Vec<String> = tags.iter().map(|t| t.id.clone()).collect();
        self.meep_hashtag_repo
            .replace_for_meep(meep_id, &tag_ids)
            .await?;

        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_hashtag(id: &str, name: &str) -> hashtag::Model {
        hashtag::Model {
            id: id.to_string(),
            name: name.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_extract_basic() {
        assert_eq!(
            extract_hashtags("learning #rust and #async today"),
            vec!["rust", "async"]
        );
    }

    #[test]
    fn test_extract_lowercases() {
        assert_eq!(extract_hashtags("#Rust #RUST #rust"), vec!["rust"]);
    }

    #[test]
    fn test_extract_mixed_case_dedupe() {
        assert_eq!(extract_hashtags("Hi #Cat #cat #DOG"), vec!["cat", "dog"]);
    }

    #[test]
    fn test_extract_keeps_first_occurrence_order() {
        assert_eq!(
            extract_hashtags("#zebra then #apple then #Zebra again"),
            vec!["zebra", "apple"]
        );
    }

    #[test]
    fn test_extract_word_characters_only() {
        // Punctuation terminates a tag; underscores and digits do not
        assert_eq!(
            extract_hashtags("#rust-lang #web_dev #v2!"),
            vec!["rust", "lang", "web_dev", "v2"]
        );
    }

    #[test]
    fn test_extract_ignores_bare_hash() {
        assert_eq!(extract_hashtags("# not a tag, nor #"), Vec::<String>::new());
    }

    #[test]
    fn test_extract_empty_text() {
        assert_eq!(extract_hashtags(""), Vec::<String>::new());
    }

    #[test]
    fn test_extract_adjacent_to_punctuation() {
        assert_eq!(
            extract_hashtags("shipping(#release)! see #release."),
            vec!["release"]
        );
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<hashtag::Model>::new()])
                .into_connection(),
        );

        let service = HashtagService::new(
            HashtagRepository::new(db.clone()),
            MeepHashtagRepository::new(db),
        );

        let result = service.get("missing").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_index_meep_without_tags_clears_links() {
        // No extraction hits, so the only statements are the transactional
        // delete of existing links
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );

        let service = HashtagService::new(
            HashtagRepository::new(db.clone()),
            MeepHashtagRepository::new(db),
        );

        let tags = service.index_meep("m1", "no tags here").await.unwrap();
        assert!(tags.is_empty());
    }

    #[tokio::test]
    async fn test_index_meep_resolves_existing_tags() {
        let rust = create_test_hashtag("h1", "rust");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // get_or_create finds the existing row
                .append_query_results([[rust]])
                // replace_for_meep: delete then insert_many
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let service = HashtagService::new(
            HashtagRepository::new(db.clone()),
            MeepHashtagRepository::new(db),
        );

        let tags = service.index_meep("m1", "hello #Rust").await.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "rust");
    }
}
