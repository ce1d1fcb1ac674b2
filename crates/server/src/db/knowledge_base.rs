//! Knowledge base repository: categories, articles, versions and feedback.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use helpdesk_core::{KbArticleId, KbCategoryId, UserId};

use super::RepositoryError;
use crate::models::{ArticleStatus, KbArticle, KbCategory, NewArticle};

/// Articles shown on the knowledge base page.
pub const ARTICLE_LIMIT: i64 = 10;

const ARTICLE_SELECT: &str = r"
    SELECT a.id, a.title, a.content, a.excerpt, a.category_id, c.name AS category_name,
           a.status, a.is_public, a.tags, a.view_count, a.helpful_count,
           a.not_helpful_count, a.published_at, a.updated_at
    FROM kb_articles a
    LEFT JOIN kb_categories c ON c.id = a.category_id
";

#[derive(Debug, sqlx::FromRow)]
struct ArticleRow {
    id: Uuid,
    title: String,
    content: String,
    excerpt: Option<String>,
    category_id: Option<Uuid>,
    category_name: Option<String>,
    status: String,
    is_public: bool,
    tags: Vec<String>,
    view_count: i32,
    helpful_count: i32,
    not_helpful_count: i32,
    published_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ArticleRow> for KbArticle {
    type Error = RepositoryError;

    fn try_from(row: ArticleRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<ArticleStatus>()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        Ok(Self {
            id: KbArticleId::new(row.id),
            title: row.title,
            content: row.content,
            excerpt: row.excerpt,
            category_id: row.category_id.map(KbCategoryId::new),
            category_name: row.category_name,
            status,
            is_public: row.is_public,
            tags: row.tags,
            view_count: row.view_count,
            helpful_count: row.helpful_count,
            not_helpful_count: row.not_helpful_count,
            published_at: row.published_at,
            updated_at: row.updated_at,
        })
    }
}

/// Article selection for the knowledge base page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleQuery {
    /// Every published article.
    All,
    /// Published articles matching a full-text search.
    Search(String),
}

impl ArticleQuery {
    /// Build from the raw search box value. Blank input selects everything.
    #[must_use]
    pub fn from_input(q: Option<&str>) -> Self {
        match q.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => Self::Search(q.to_string()),
            None => Self::All,
        }
    }

    /// SQL for this selection. A search binds its terms as `$1`; the limit
    /// is always the last parameter.
    #[must_use]
    pub fn sql(&self) -> String {
        match self {
            Self::All => format!(
                "{ARTICLE_SELECT} WHERE a.status = 'published' ORDER BY a.view_count DESC LIMIT $1"
            ),
            Self::Search(_) => format!(
                "{ARTICLE_SELECT} WHERE a.status = 'published' \
                 AND a.search_vector @@ websearch_to_tsquery('english', $1) \
                 ORDER BY a.view_count DESC LIMIT $2"
            ),
        }
    }
}

/// Repository for knowledge base operations.
pub struct KnowledgeBaseRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> KnowledgeBaseRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Active categories by display order, with published article counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn categories(&self) -> Result<Vec<KbCategory>, RepositoryError> {
        let categories = sqlx::query_as::<_, KbCategory>(
            r"
            SELECT c.id, c.name, c.description, c.icon, c.display_order,
                   count(a.id) FILTER (WHERE a.status = 'published') AS article_count
            FROM kb_categories c
            LEFT JOIN kb_articles a ON a.category_id = c.id
            WHERE c.is_active
            GROUP BY c.id
            ORDER BY c.display_order
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(categories)
    }

    /// Published articles by view count, at most [`ARTICLE_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn articles(&self, query: &ArticleQuery) -> Result<Vec<KbArticle>, RepositoryError> {
        let sql = query.sql();
        let mut q = sqlx::query_as::<_, ArticleRow>(&sql);
        if let ArticleQuery::Search(terms) = query {
            q = q.bind(terms.as_str());
        }
        let rows = q.bind(ARTICLE_LIMIT).fetch_all(self.pool).await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: KbArticleId) -> Result<Option<KbArticle>, RepositoryError> {
        let sql = format!("{ARTICLE_SELECT} WHERE a.id = $1");
        let row = sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn increment_view(&self, id: KbArticleId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE kb_articles SET view_count = view_count + 1 WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Create an article together with its first version.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, article: &NewArticle) -> Result<KbArticleId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r"
            INSERT INTO kb_articles (title, content, excerpt, category_id, author_id, status,
                                     is_public, tags, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8,
                    CASE WHEN $6 = 'published' THEN now() END)
            RETURNING id
            ",
        )
        .bind(&article.title)
        .bind(&article.content)
        .bind(article.excerpt.as_deref())
        .bind(article.category_id.map(|id| id.as_uuid()))
        .bind(article.author_id.map(|id| id.as_uuid()))
        .bind(article.status.as_str())
        .bind(article.status == ArticleStatus::Published)
        .bind(&article.tags)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO kb_article_versions (article_id, version_number, title, content, created_by)
            VALUES ($1, 1, $2, $3, $4)
            ",
        )
        .bind(id)
        .bind(&article.title)
        .bind(&article.content)
        .bind(article.author_id.map(|id| id.as_uuid()))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(KbArticleId::new(id))
    }

    /// Record a helpful / not helpful vote and bump the matching counter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the article does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn feedback(
        &self,
        id: KbArticleId,
        is_helpful: bool,
        user_id: Option<UserId>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r"
            UPDATE kb_articles
            SET helpful_count = helpful_count + CASE WHEN $2 THEN 1 ELSE 0 END,
                not_helpful_count = not_helpful_count + CASE WHEN $2 THEN 0 ELSE 1 END
            WHERE id = $1
            ",
        )
        .bind(id.as_uuid())
        .bind(is_helpful)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(
            "INSERT INTO kb_article_feedback (article_id, is_helpful, user_id) VALUES ($1, $2, $3)",
        )
        .bind(id.as_uuid())
        .bind(is_helpful)
        .bind(user_id.map(|id| id.as_uuid()))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_input_selects_all() {
        assert_eq!(ArticleQuery::from_input(None), ArticleQuery::All);
        assert_eq!(ArticleQuery::from_input(Some("   ")), ArticleQuery::All);
    }

    #[test]
    fn test_input_is_trimmed() {
        assert_eq!(
            ArticleQuery::from_input(Some("  password reset ")),
            ArticleQuery::Search("password reset".to_string())
        );
    }

    #[test]
    fn test_unfiltered_sql_orders_by_views() {
        let sql = ArticleQuery::All.sql();
        assert!(!sql.contains("search_vector"));
        assert!(sql.contains("a.status = 'published'"));
        assert!(sql.contains("ORDER BY a.view_count DESC LIMIT $1"));
    }

    #[test]
    fn test_search_sql_filters_full_text() {
        let sql = ArticleQuery::Search("refund".to_string()).sql();
        assert!(sql.contains("a.search_vector @@ websearch_to_tsquery('english', $1)"));
        assert!(sql.contains("ORDER BY a.view_count DESC LIMIT $2"));
    }
}
