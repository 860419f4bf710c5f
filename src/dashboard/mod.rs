//! Per-role dashboards.
//!
//! Each dashboard fetches its whole record set, keeps it locally, and
//! filters it on the client. There is no pagination or incremental sync:
//! a refresh replaces everything.

pub mod admin;
pub mod agent;
pub mod customer;
pub mod filter;
pub mod location;

pub use admin::{AdminApplications, BankEditor, BankRegistry};
pub use agent::{Activity, AgentDashboard, EditSession, Proposal, ProposalRequest};
pub use customer::{
    CustomerDashboard, MIN_POLL_INTERVAL, PaymentCountdown, PaymentTarget, PollingHandle,
};
pub use filter::{ApplicationStats, StatusFilter};
pub use location::LocationPicker;
