//! Domain models for the help desk.
//!
//! Repositories in [`crate::db`] return these; handlers turn them into
//! template views.

pub mod agent;
pub mod automation;
pub mod call;
pub mod customer;
pub mod department;
pub mod knowledge_base;
pub mod report;
pub mod settings;
pub mod ticket;
pub mod user;

pub use agent::{AgentSummary, Profile};
pub use automation::AutomationRule;
pub use call::{CallRecord, NewCall};
pub use customer::{Customer, CustomerWithTickets, NewCustomer};
pub use department::{Department, DepartmentInput};
pub use knowledge_base::{ArticleStatus, KbArticle, KbCategory, NewArticle};
pub use report::AgentPerformance;
pub use settings::{EmailTemplate, SlaPolicy};
pub use ticket::{NewTicket, StatusCounts, Ticket, TicketActivity, TicketFilter, TicketNote};
pub use user::User;

/// Session keys.
pub mod session_keys {
    /// The signed-in [`helpdesk_core::SessionUser`].
    pub const CURRENT_USER: &str = "current_user";

    /// Pending flash notifications.
    pub const FLASH: &str = "flash";
}
