//! Agent dashboard.
//!
//! The agent sees the applications assigned to them, can search them,
//! approve or reject them, send agreements, assign a bank account, edit or
//! delete a proposal, and create new proposals for prospective franchisees.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use url::Url;
use uuid::Uuid;

use crate::config::Config;
use crate::dispatch::{ActionDispatcher, ApplicationBoard};
use crate::error::{ClientError, Result};
use crate::models::pincode::is_valid_pincode;
use crate::models::{ApplicationRecord, ApplicationUpdate, BankAccount, Session};
use crate::services::{FranchiseBackend, PincodeLookup};

use super::filter::{ApplicationStats, matches_search};
use super::location::LocationPicker;

/// How many applications the "recent" panel shows.
pub const RECENT_LIMIT: usize = 5;

/// One line of the recent-activity feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub id: usize,
    pub action: &'static str,
    pub applicant: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Details an agent enters for a new proposal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProposalRequest {
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub pincode: String,
}

/// A generated proposal: the invitation link and the email to send with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub link: Url,
    pub email_body: String,
}

/// An application being edited.
#[derive(Debug, Clone)]
pub struct EditSession {
    pub id: String,
    pub update: ApplicationUpdate,
    pub locations: LocationPicker,
}

impl EditSession {
    /// The update to send, with the picked location.
    pub fn finish(mut self) -> (String, ApplicationUpdate) {
        self.update.location = self.locations.resolved();
        (self.id, self.update)
    }
}

pub struct AgentDashboard<B: ?Sized, L: ?Sized> {
    backend: Arc<B>,
    lookup: Arc<L>,
    agent_id: String,
    proposal_base: Url,
    board: Arc<ApplicationBoard>,
    dispatcher: ActionDispatcher<B>,
    banks: Vec<BankAccount>,
    search: String,
}

impl<B, L> AgentDashboard<B, L>
where
    B: FranchiseBackend + ?Sized,
    L: PincodeLookup + ?Sized,
{
    /// Dashboard for the agent signed in with `session`.
    ///
    /// # Errors
    ///
    /// - `SessionMissing` when the session is not an agent session with an agent id
    /// - `Url` when `PROPOSAL_BASE_URL` is not a URL
    pub fn new(backend: Arc<B>, lookup: Arc<L>, session: &Session, config: &Config) -> Result<Self> {
        let agent_id = session
            .agent_id()
            .ok_or(ClientError::SessionMissing)?
            .to_string();
        let board = Arc::new(ApplicationBoard::new());
        Ok(Self {
            dispatcher: ActionDispatcher::new(Arc::clone(&backend), Arc::clone(&board)),
            backend,
            lookup,
            agent_id,
            proposal_base: Url::parse(&config.proposal_base_url)?,
            board,
            banks: Vec::new(),
            search: String::new(),
        })
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// Approve, reject, agreement and bank assignment.
    pub fn actions(&self) -> &ActionDispatcher<B> {
        &self.dispatcher
    }

    /// Fetch this agent's applications, replacing the local set.
    pub async fn load_applications(&self) -> Result<usize> {
        let records = self
            .backend
            .list_agent_applications(&self.agent_id)
            .await
            .inspect_err(|e| tracing::error!(agent_id = %self.agent_id, "failed to load applications: {}", e))?;
        let count = records.len();
        self.board.replace(records);
        tracing::info!(agent_id = %self.agent_id, count, "applications loaded");
        Ok(count)
    }

    /// Fetch the accounts an applicant can be told to pay into.
    pub async fn load_banks(&mut self) -> Result<&[BankAccount]> {
        self.banks = self.backend.list_banks().await?;
        Ok(&self.banks)
    }

    pub fn banks(&self) -> &[BankAccount] {
        &self.banks
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Applications matching the current search, in fetch order.
    pub fn filtered(&self) -> Vec<ApplicationRecord> {
        self.board
            .snapshot()
            .into_iter()
            .filter(|record| matches_search(record, &self.search))
            .collect()
    }

    pub fn stats(&self) -> ApplicationStats {
        ApplicationStats::from_records(&self.filtered())
    }

    /// The newest filtered applications, newest first.
    ///
    /// Records without a creation time sort last.
    pub fn recent(&self) -> Vec<ApplicationRecord> {
        let mut records = self.filtered();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(RECENT_LIMIT);
        records
    }

    /// Activity feed derived from the recent applications' status.
    pub fn activities(&self) -> Vec<Activity> {
        self.recent()
            .into_iter()
            .enumerate()
            .map(|(index, record)| Activity {
                id: index + 1,
                action: if record.status.is_approved() {
                    "Approved application"
                } else if record.status.is_rejected() {
                    "Rejected application"
                } else {
                    "Created new proposal"
                },
                applicant: record.name().to_string(),
                timestamp: record.created_at,
            })
            .collect()
    }

    /// Post offices for a PIN, as a picker.
    pub async fn locations_for(&self, pin: &str) -> Result<LocationPicker> {
        let offices = self.lookup.lookup(pin).await?;
        Ok(LocationPicker::from_offices(&offices))
    }

    /// Start editing the application with `id`.
    ///
    /// The location options are looked up again from the record's PIN; if
    /// that fails the stored location string is offered instead.
    pub async fn begin_edit(&self, id: &str) -> Result<EditSession> {
        let record = self
            .board
            .get_by_id(id)
            .ok_or_else(|| ClientError::NotFound(id.to_string()))?;
        let update = ApplicationUpdate::from_record(&record);

        let locations = match update.pincode.as_str() {
            pin if is_valid_pincode(pin) => match self.locations_for(pin).await {
                Ok(picker) => picker,
                Err(e) => {
                    tracing::warn!("location lookup failed: {}", e);
                    LocationPicker::from_joined(&update.location)
                }
            },
            _ => LocationPicker::from_joined(&update.location),
        };

        Ok(EditSession {
            id: record.id,
            update,
            locations,
        })
    }

    /// Save an edit and merge it into the local copy.
    pub async fn save_edit(&self, edit: EditSession) -> Result<()> {
        let (id, update) = edit.finish();
        self.backend.update_application(&id, &update).await?;
        self.board.update_by_id(&id, |record| update.apply_to(record));
        tracing::info!(application_id = %id, "application updated");
        Ok(())
    }

    /// Delete an application and drop it locally.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.backend.delete_application(id).await?;
        self.board.remove_by_id(id);
        tracing::info!(application_id = %id, "application deleted");
        Ok(())
    }

    /// Build an invitation link and email for a prospective franchisee.
    ///
    /// Nothing is sent to the backend; the agent copies the link and email.
    pub fn create_proposal(&self, request: &ProposalRequest) -> Result<Proposal> {
        if [&request.name, &request.phone_number, &request.email, &request.pincode]
            .iter()
            .any(|value| value.trim().is_empty())
        {
            return Err(ClientError::InvalidInput(
                "Please fill in all required fields".to_string(),
            ));
        }

        let mut link = self.proposal_base.clone();
        link.query_pairs_mut()
            .append_pair("token", &Uuid::new_v4().to_string());

        let email_body = format!(
            "Dear {name},\n\n\
             Thank you for your interest in becoming a VALMO franchise partner!\n\n\
             We are pleased to inform you that your proposal has been successfully registered with us. Please find the details below:\n\n\
             Name: {name}\n\
             Phone Number: {phone}\n\
             Email: {email}\n\
             Pincode: {pincode}\n\n\
             To proceed with the next steps, please click on the following link:\n\
             {link}\n\n\
             If you have any questions or need further assistance, feel free to reach out to us.\n\n\
             Best regards,\n\
             VALMO Team",
            name = request.name,
            phone = request.phone_number,
            email = request.email,
            pincode = request.pincode,
        );

        tracing::info!(agent_id = %self.agent_id, "proposal created");
        Ok(Proposal { link, email_body })
    }
}
