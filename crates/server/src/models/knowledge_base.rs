//! Knowledge base categories and articles.

use core::fmt;

use chrono::{DateTime, Utc};

use helpdesk_core::{KbArticleId, KbCategoryId, UnknownVariant, UserId};

/// Active category with the number of articles filed under it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct KbCategory {
    pub id: KbCategoryId,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub display_order: i32,
    pub article_count: i64,
}

/// Publication state of an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArticleStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl ArticleStatus {
    pub const ALL: [Self; 3] = [Self::Draft, Self::Published, Self::Archived];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ArticleStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "article status",
                value: s.to_owned(),
            })
    }
}

#[derive(Debug, Clone)]
pub struct KbArticle {
    pub id: KbArticleId,
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub category_id: Option<KbCategoryId>,
    pub category_name: Option<String>,
    pub status: ArticleStatus,
    pub is_public: bool,
    pub tags: Vec<String>,
    pub view_count: i32,
    pub helpful_count: i32,
    pub not_helpful_count: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl KbArticle {
    /// Excerpt if set, otherwise the first 160 characters of the content.
    #[must_use]
    pub fn summary(&self) -> String {
        if let Some(excerpt) = self.excerpt.as_deref().filter(|e| !e.trim().is_empty()) {
            return excerpt.to_string();
        }
        let mut summary: String = self.content.chars().take(160).collect();
        if self.content.chars().count() > 160 {
            summary.push('…');
        }
        summary
    }
}

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub category_id: Option<KbCategoryId>,
    pub status: ArticleStatus,
    pub tags: Vec<String>,
    pub author_id: Option<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(content: &str, excerpt: Option<&str>) -> KbArticle {
        KbArticle {
            id: KbArticleId::new(uuid::Uuid::new_v4()),
            title: "Resetting your password".to_string(),
            content: content.to_string(),
            excerpt: excerpt.map(ToString::to_string),
            category_id: None,
            category_name: None,
            status: ArticleStatus::Published,
            is_public: true,
            tags: vec![],
            view_count: 0,
            helpful_count: 0,
            not_helpful_count: 0,
            published_at: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_prefers_excerpt() {
        assert_eq!(article("body", Some("Short intro")).summary(), "Short intro");
        assert_eq!(article("body", Some("  ")).summary(), "body");
    }

    #[test]
    fn test_summary_truncates_long_content() {
        let long = "a".repeat(200);
        let summary = article(&long, None).summary();
        assert_eq!(summary.chars().count(), 161);
        assert!(summary.ends_with('…'));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("published".parse::<ArticleStatus>().ok(), Some(ArticleStatus::Published));
        assert!("live".parse::<ArticleStatus>().is_err());
    }
}
