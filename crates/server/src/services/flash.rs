//! One-shot notifications carried across a redirect.
//!
//! Write handlers push a flash and redirect; the next page render takes
//! every pending flash out of the session and shows it once.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::models::session_keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

impl FlashKind {
    /// CSS modifier for the notification.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "flash-success",
            Self::Error => "flash-error",
            Self::Info => "flash-info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub title: String,
    pub description: Option<String>,
}

impl Flash {
    #[must_use]
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            title: title.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn error(title: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            title: title.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn info(title: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Info,
            title: title.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Queue a flash for the next render.
///
/// A session write failure drops the notification and is logged.
pub async fn push(session: &Session, flash: Flash) {
    let mut pending: Vec<Flash> = match session.get(session_keys::FLASH).await {
        Ok(pending) => pending.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read pending flashes");
            Vec::new()
        }
    };
    pending.push(flash);
    if let Err(e) = session.insert(session_keys::FLASH, pending).await {
        tracing::warn!(error = %e, "Failed to store flash");
    }
}

/// Take every pending flash out of the session.
pub async fn take(session: &Session) -> Vec<Flash> {
    match session.remove::<Vec<Flash>>(session_keys::FLASH).await {
        Ok(pending) => pending.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read pending flashes");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_flashes_are_shown_once() {
        let session = session();
        push(&session, Flash::success("Department created")).await;
        push(
            &session,
            Flash::error("Error creating department").with_description("Name is required"),
        )
        .await;

        let shown = take(&session).await;
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[0].kind, FlashKind::Success);
        assert_eq!(shown[1].description.as_deref(), Some("Name is required"));

        assert!(take(&session).await.is_empty());
    }

    #[test]
    fn test_css_classes() {
        assert_eq!(FlashKind::Error.css_class(), "flash-error");
    }
}
