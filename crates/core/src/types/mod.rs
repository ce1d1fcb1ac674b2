//! Core types for the help desk.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod role;
pub mod ticket;

pub use email::{Email, EmailError};
pub use id::*;
pub use role::{AppRole, RoleSet, UnknownVariant};
pub use ticket::{TicketPriority, TicketStatus};
