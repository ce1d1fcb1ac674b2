//! Help Desk Core - Shared domain types.
//!
//! This crate provides the types shared by the help desk components:
//! - `server` - The web application (tickets, customers, knowledge base, reports)
//! - `cli` - Command-line tools for migrations, users and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. Everything the authorization gate decides is decided
//! here so it can be tested without a server.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, roles, ticket status and priority
//! - [`session`] - The session state machine
//! - [`auth`] - Authorization context and gate decisions
//! - [`routes`] - The static route table and navigation
//! - [`metrics`] - Aggregations for the calls, reports and analytics pages

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod metrics;
pub mod routes;
pub mod session;
pub mod types;

pub use auth::{AuthContext, GateDecision, RoleResolution};
pub use metrics::{CallStats, DailyMetric, ReportRange, ReportTotals};
pub use routes::{Access, NavItem, ROUTES, RouteMatch, RouteSpec};
pub use session::{SessionState, SessionStore, SessionUser, TransitionError};
pub use types::*;
