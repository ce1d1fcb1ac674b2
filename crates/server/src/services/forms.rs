//! Submitted forms and their validation.
//!
//! Every write handler validates its form here before touching the
//! database. A form that fails validation issues no write.

use serde::Deserialize;
use thiserror::Error;

use helpdesk_core::{
    DepartmentId, Email, EmailError, KbCategoryId, TicketPriority, UserId,
};

use crate::db::non_empty;
use crate::models::{ArticleStatus, DepartmentInput, NewArticle, NewCall, NewCustomer, NewTicket};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{0}")]
    InvalidEmail(#[from] EmailError),

    #[error("{field} is invalid")]
    Invalid { field: &'static str },
}

fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    non_empty(Some(value)).ok_or(ValidationError::Missing(field))
}

fn required_email(value: &str) -> Result<Email, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Missing("Email"));
    }
    Ok(Email::parse(value)?)
}

/// Optional UUID select: blank means none.
fn optional_id<T: std::str::FromStr>(
    value: Option<&str>,
    field: &'static str,
) -> Result<Option<T>, ValidationError> {
    non_empty(value)
        .map(|v| v.parse::<T>().map_err(|_| ValidationError::Invalid { field }))
        .transpose()
}

/// Whether a destructive action was explicitly confirmed.
#[must_use]
pub fn confirmed(confirm: Option<&str>) -> bool {
    confirm.is_some_and(|c| c.trim().eq_ignore_ascii_case("yes"))
}

// =============================================================================
// Departments
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepartmentForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub description: Option<String>,
}

impl DepartmentForm {
    /// # Errors
    ///
    /// Returns `ValidationError` if `name` is blank or `email` is not a valid address.
    pub fn validate(&self) -> Result<DepartmentInput, ValidationError> {
        Ok(DepartmentInput {
            name: required(&self.name, "Name")?,
            email: required_email(&self.email)?,
            description: non_empty(self.description.as_deref()),
        })
    }
}

/// Body of the delete confirmation form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfirmForm {
    pub confirm: Option<String>,
}

impl ConfirmForm {
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        confirmed(self.confirm.as_deref())
    }
}

// =============================================================================
// Customers
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
}

impl CustomerForm {
    /// # Errors
    ///
    /// Returns `ValidationError` if `name` is blank or `email` is not a valid address.
    pub fn validate(&self) -> Result<NewCustomer, ValidationError> {
        Ok(NewCustomer {
            name: required(&self.name, "Name")?,
            email: required_email(&self.email)?,
            phone: non_empty(self.phone.as_deref()),
            company: non_empty(self.company.as_deref()),
        })
    }
}

// =============================================================================
// Tickets
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketForm {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub department_id: Option<String>,
}

impl TicketForm {
    /// # Errors
    ///
    /// Returns `ValidationError` if a required field is blank, the email is
    /// invalid or the priority or department is not recognized.
    pub fn validate(&self, created_by: Option<UserId>) -> Result<NewTicket, ValidationError> {
        let title = required(&self.title, "Title")?;
        let customer_email = required_email(&self.customer_email)?;
        let customer_name = non_empty(Some(&self.customer_name))
            .unwrap_or_else(|| customer_email.as_str().to_string());
        let priority = match non_empty(self.priority.as_deref()) {
            Some(p) => p
                .parse::<TicketPriority>()
                .map_err(|_| ValidationError::Invalid { field: "Priority" })?,
            None => TicketPriority::default(),
        };

        Ok(NewTicket {
            title,
            description: non_empty(self.description.as_deref()),
            priority,
            customer_name,
            customer_email,
            customer_phone: non_empty(self.customer_phone.as_deref()),
            department_id: optional_id::<DepartmentId>(self.department_id.as_deref(), "Department")?,
            created_by,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteForm {
    #[serde(default)]
    pub content: String,
    /// Checkbox: present when ticked.
    pub is_internal: Option<String>,
}

impl NoteForm {
    /// Returns the trimmed content and whether the note is internal.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Missing` if the content is blank.
    pub fn validate(&self) -> Result<(String, bool), ValidationError> {
        Ok((required(&self.content, "Note")?, self.is_internal.is_some()))
    }
}

// =============================================================================
// Calls
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallForm {
    #[serde(default)]
    pub phone_number: String,
}

impl CallForm {
    /// # Errors
    ///
    /// Returns `ValidationError::Missing` if the phone number is blank.
    pub fn validate(&self, agent_id: UserId) -> Result<NewCall, ValidationError> {
        Ok(NewCall {
            phone_number: required(&self.phone_number, "Phone number")?,
            agent_id: Some(agent_id),
        })
    }
}

// =============================================================================
// Knowledge base
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub excerpt: Option<String>,
    pub category_id: Option<String>,
    /// Comma-separated.
    pub tags: Option<String>,
    /// Checkbox: publish immediately.
    pub publish: Option<String>,
}

impl ArticleForm {
    /// # Errors
    ///
    /// Returns `ValidationError` if the title or content is blank or the
    /// category is not a valid ID.
    pub fn validate(&self, author_id: UserId) -> Result<NewArticle, ValidationError> {
        let tags = self
            .tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(|t| non_empty(Some(t)))
            .collect();

        Ok(NewArticle {
            title: required(&self.title, "Title")?,
            content: required(&self.content, "Content")?,
            excerpt: non_empty(self.excerpt.as_deref()),
            category_id: optional_id::<KbCategoryId>(self.category_id.as_deref(), "Category")?,
            status: if self.publish.is_some() {
                ArticleStatus::Published
            } else {
                ArticleStatus::Draft
            },
            tags,
            author_id: Some(author_id),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn department(name: &str, email: &str) -> DepartmentForm {
        DepartmentForm {
            name: name.to_string(),
            email: email.to_string(),
            description: Some("  ".to_string()),
        }
    }

    #[test]
    fn test_department_requires_name_and_email() {
        assert_eq!(
            department("", "billing@example.com").validate(),
            Err(ValidationError::Missing("Name"))
        );
        assert_eq!(
            department("Billing", "  ").validate(),
            Err(ValidationError::Missing("Email"))
        );
        assert!(matches!(
            department("Billing", "not-an-email").validate(),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_department_valid() {
        let input = department(" Billing ", "Billing@Example.com").validate().unwrap();
        assert_eq!(input.name, "Billing");
        assert_eq!(input.email.as_str(), "billing@example.com");
        assert_eq!(input.description, None);
    }

    #[test]
    fn test_confirmation() {
        assert!(confirmed(Some("yes")));
        assert!(confirmed(Some(" YES ")));
        assert!(!confirmed(Some("no")));
        assert!(!confirmed(Some("")));
        assert!(!confirmed(None));
        assert!(!ConfirmForm::default().is_confirmed());
    }

    #[test]
    fn test_call_requires_phone() {
        let agent = UserId::new(uuid::Uuid::new_v4());
        let form = CallForm {
            phone_number: "   ".to_string(),
        };
        assert_eq!(form.validate(agent).unwrap_err(), ValidationError::Missing("Phone number"));

        let form = CallForm {
            phone_number: "+1 555 0100".to_string(),
        };
        assert_eq!(form.validate(agent).unwrap().phone_number, "+1 555 0100");
    }

    #[test]
    fn test_ticket_defaults() {
        let form = TicketForm {
            title: "Cannot log in".to_string(),
            customer_email: "jo@example.com".to_string(),
            ..TicketForm::default()
        };
        let ticket = form.validate(None).unwrap();
        assert_eq!(ticket.priority, TicketPriority::Medium);
        assert_eq!(ticket.customer_name, "jo@example.com");
        assert_eq!(ticket.department_id, None);
    }

    #[test]
    fn test_ticket_rejects_unknown_priority() {
        let form = TicketForm {
            title: "Cannot log in".to_string(),
            customer_email: "jo@example.com".to_string(),
            priority: Some("critical".to_string()),
            ..TicketForm::default()
        };
        assert_eq!(
            form.validate(None).unwrap_err(),
            ValidationError::Invalid { field: "Priority" }
        );
    }

    #[test]
    fn test_article_tags_and_status() {
        let form = ArticleForm {
            title: "Refunds".to_string(),
            content: "How refunds work".to_string(),
            tags: Some("billing, ,refunds".to_string()),
            publish: Some("on".to_string()),
            ..ArticleForm::default()
        };
        let article = form.validate(UserId::new(uuid::Uuid::new_v4())).unwrap();
        assert_eq!(article.tags, vec!["billing".to_string(), "refunds".to_string()]);
        assert_eq!(article.status, ArticleStatus::Published);
    }

    #[test]
    fn test_article_requires_content() {
        let form = ArticleForm {
            title: "Refunds".to_string(),
            ..ArticleForm::default()
        };
        assert_eq!(
            form.validate(UserId::new(uuid::Uuid::new_v4())).unwrap_err(),
            ValidationError::Missing("Content")
        );
    }
}
