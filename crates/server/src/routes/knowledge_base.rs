//! Knowledge base: categories, article search, article view and feedback.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use helpdesk_core::KbArticleId;

use crate::db::knowledge_base::ArticleQuery;
use crate::db::{KnowledgeBaseRepository, RepositoryError};
use crate::middleware::{RequireAuth, RequireRole, RoleRequirement, Staff};
use crate::models::{KbArticle, KbCategory};
use crate::services::audit;
use crate::services::flash::{self, Flash};
use crate::services::forms::ArticleForm;
use crate::state::AppState;

use super::layout::{Chrome, format_date};
use super::not_found;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackForm {
    pub helpful: String,
}

impl FeedbackForm {
    #[must_use]
    pub fn is_helpful(&self) -> bool {
        matches!(self.helpful.as_str(), "yes" | "true" | "1")
    }
}

#[derive(Debug, Clone)]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub article_count: i64,
}

impl From<&KbCategory> for CategoryView {
    fn from(category: &KbCategory) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            description: category.description.clone().unwrap_or_default(),
            icon: category.icon.clone().unwrap_or_default(),
            article_count: category.article_count,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArticleView {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub category: String,
    pub tags: Vec<String>,
    pub view_count: i32,
    pub helpful_count: i32,
    pub not_helpful_count: i32,
    pub updated_at: String,
}

impl From<&KbArticle> for ArticleView {
    fn from(article: &KbArticle) -> Self {
        Self {
            id: article.id.to_string(),
            title: article.title.clone(),
            summary: article.summary(),
            category: article.category_name.clone().unwrap_or_default(),
            tags: article.tags.clone(),
            view_count: article.view_count,
            helpful_count: article.helpful_count,
            not_helpful_count: article.not_helpful_count,
            updated_at: format_date(article.updated_at),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "knowledge_base/index.html")]
pub struct KnowledgeBaseTemplate {
    pub chrome: Chrome,
    pub categories: Vec<CategoryView>,
    pub articles: Vec<ArticleView>,
    pub search_query: String,
    pub can_create: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "knowledge_base/article.html")]
pub struct ArticleTemplate {
    pub chrome: Chrome,
    pub article: ArticleView,
    pub paragraphs: Vec<String>,
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn index(
    auth: RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let mut chrome = Chrome::new(&auth, "/knowledge-base").await;
    let repo = KnowledgeBaseRepository::new(state.pool());
    let article_query = ArticleQuery::from_input(query.q.as_deref());

    let categories = match repo.categories().await {
        Ok(categories) => categories.iter().map(CategoryView::from).collect(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load categories");
            chrome.flash(Flash::error("Error loading categories"));
            Vec::new()
        }
    };

    let articles = match repo.articles(&article_query).await {
        Ok(articles) => articles.iter().map(ArticleView::from).collect(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load articles");
            chrome.flash(Flash::error("Error loading articles"));
            Vec::new()
        }
    };

    let search_query = match article_query {
        ArticleQuery::Search(q) => q,
        ArticleQuery::All => String::new(),
    };

    KnowledgeBaseTemplate {
        chrome,
        categories,
        articles,
        search_query,
        can_create: auth.auth.has_any_role(Staff::ROLES),
    }
}

/// Show an article and count the view.
#[instrument(skip_all, fields(user_id = %auth.user.id, article_id = %id))]
pub async fn article(
    auth: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let Ok(id) = id.parse::<KbArticleId>() else {
        return not_found().into_response();
    };
    let repo = KnowledgeBaseRepository::new(state.pool());

    let article = match repo.get(id).await {
        Ok(Some(article)) => article,
        Ok(None) => return not_found().into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load article");
            flash::push(&auth.session, Flash::error("Error loading article")).await;
            return Redirect::to("/knowledge-base").into_response();
        }
    };

    if let Err(e) = repo.increment_view(id).await {
        tracing::warn!(error = %e, "Failed to count article view");
    }

    let chrome = Chrome::new(&auth, "/knowledge-base").await;
    let paragraphs = article
        .content
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(ToOwned::to_owned)
        .collect();

    ArticleTemplate {
        chrome,
        article: ArticleView::from(&article),
        paragraphs,
    }
    .into_response()
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn create(
    auth: RequireRole<Staff>,
    State(state): State<AppState>,
    Form(form): Form<ArticleForm>,
) -> Redirect {
    let article = match form.validate(auth.user.id) {
        Ok(article) => article,
        Err(e) => {
            flash::push(
                &auth.session,
                Flash::error("Error creating article").with_description(e.to_string()),
            )
            .await;
            return Redirect::to("/knowledge-base");
        }
    };

    match KnowledgeBaseRepository::new(state.pool()).create(&article).await {
        Ok(id) => {
            audit::record(
                state.pool(),
                Some(auth.user.id),
                "create",
                "kb_article",
                Some(id.to_string()),
                &serde_json::json!({
                    "title": article.title,
                    "status": article.status.as_str(),
                }),
            )
            .await;
            flash::push(&auth.session, Flash::success("Article created")).await;
            Redirect::to(&format!("/knowledge-base/articles/{id}"))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create article");
            flash::push(&auth.session, Flash::error("Error creating article")).await;
            Redirect::to("/knowledge-base")
        }
    }
}

#[instrument(skip_all, fields(user_id = %auth.user.id, article_id = %id))]
pub async fn feedback(
    auth: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<FeedbackForm>,
) -> Response {
    let Ok(id) = id.parse::<KbArticleId>() else {
        return not_found().into_response();
    };

    match KnowledgeBaseRepository::new(state.pool())
        .feedback(id, form.is_helpful(), Some(auth.user.id))
        .await
    {
        Ok(()) => {
            flash::push(&auth.session, Flash::success("Thanks for your feedback")).await;
        }
        Err(RepositoryError::NotFound) => return not_found().into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to record feedback");
            flash::push(&auth.session, Flash::error("Error recording feedback")).await;
        }
    }

    Redirect::to(&format!("/knowledge-base/articles/{id}")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_values() {
        let form = |v: &str| FeedbackForm {
            helpful: v.to_string(),
        };
        assert!(form("yes").is_helpful());
        assert!(!form("no").is_helpful());
    }
}
