//! Franchise Portal - headless client for the franchise application backend
//!
//! This crate holds every piece of page state and every backend interaction
//! of the franchise portal, so a UI shell only has to render. It covers the
//! application form, sign-in for customers, agents and admins, the three
//! dashboards, and the agent/admin actions on applications.
//!
//! # Architecture
//!
//! - **Backend**: reached through the [`services::FranchiseBackend`] trait; [`services::HttpBackend`] is the reqwest implementation
//! - **Session**: one [`session::SessionStore`] boundary, guarded by [`session::SessionGate`]
//! - **Actions**: optimistic updates with rollback in [`dispatch`]
//! - **Errors**: one [`error::ClientError`] type, convertible to a user-facing [`notice::Notice`]
//!
//! # Startup Flow
//!
//! 1. Initialize logging with [`telemetry::init_tracing`]
//! 2. Load [`config::Config`] from the environment
//! 3. Build an [`services::HttpBackend`] and a [`session::FileSessionStore`]
//! 4. Hand both to the page controllers

pub mod config;
pub mod dashboard;
pub mod dispatch;
pub mod error;
pub mod form;
pub mod models;
pub mod notice;
pub mod services;
pub mod session;
pub mod telemetry;

#[cfg(test)]
mod test_utils;

pub use config::Config;
pub use error::{ClientError, Result};
