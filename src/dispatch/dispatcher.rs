//! Status-changing actions on applications.

use std::sync::Arc;

use crate::error::{ClientError, Result};
use crate::models::{ActionAck, BankAccount, BankAssignment, BankOption, RecordKey};
use crate::notice::Notice;
use crate::services::FranchiseBackend;

use super::board::ApplicationBoard;
use super::optimistic::{RecordPatch, perform_optimistic_action};

/// The four actions an agent or admin can take on an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Approve,
    Reject,
    SendAgreement,
    AssignBank,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Action::Approve => "Approve",
            Action::Reject => "Reject",
            Action::SendAgreement => "Agreement",
            Action::AssignBank => "Bank assignment",
        }
    }

    /// Notice for the outcome of this action on the applicant `name`.
    pub fn notice(self, name: &str, outcome: &Result<ActionAck>) -> Notice {
        match outcome {
            Ok(ack) => Notice::success(match self {
                Action::Approve => "Approval mail sent".to_string(),
                Action::Reject => ack
                    .message
                    .clone()
                    .unwrap_or_else(|| "Rejected and mail sent".to_string()),
                Action::SendAgreement => ack
                    .message
                    .clone()
                    .unwrap_or_else(|| "Agreement mail sent".to_string()),
                Action::AssignBank => format!(
                    "Bank details assigned successfully to {name}! The customer will now see these details in their dashboard."
                ),
            }),
            Err(ClientError::Network(_)) => {
                Notice::error(format!("{} failed: Network error. Please try again.", self.label()))
            }
            Err(e) => Notice::error(format!("{} failed: {}", self.label(), e)),
        }
    }
}

/// Runs actions against the backend with optimistic local updates.
///
/// Only one action per record can be in flight; a second one (a double
/// click) fails with `ActionInFlight` and never reaches the backend.
pub struct ActionDispatcher<B: ?Sized> {
    backend: Arc<B>,
    board: Arc<ApplicationBoard>,
}

impl<B: FranchiseBackend + ?Sized> ActionDispatcher<B> {
    pub fn new(backend: Arc<B>, board: Arc<ApplicationBoard>) -> Self {
        Self { backend, board }
    }

    pub fn board(&self) -> &Arc<ApplicationBoard> {
        &self.board
    }

    /// Whether an action for `key` is waiting on the backend.
    pub fn is_busy(&self, key: &RecordKey) -> bool {
        self.board.in_flight().contains(key)
    }

    /// Approve a pending application.
    ///
    /// A customer id returned by the backend is stored on the record.
    pub async fn approve(&self, key: &RecordKey) -> Result<ActionAck> {
        tracing::info!(record = %key, "approving application");
        let ack = perform_optimistic_action(&self.board, key, RecordPatch::Approve, || {
            self.backend.approve(key)
        })
        .await
        .inspect_err(|e| tracing::warn!(record = %key, "approve failed: {}", e))?;

        if let Some(customer_id) = &ack.customer_id {
            self.board.update(key, |record| {
                record.customer_id = Some(customer_id.clone());
            });
        }
        Ok(ack)
    }

    /// Reject a pending application.
    pub async fn reject(&self, key: &RecordKey) -> Result<ActionAck> {
        tracing::info!(record = %key, "rejecting application");
        perform_optimistic_action(&self.board, key, RecordPatch::Reject, || {
            self.backend.reject(key)
        })
        .await
        .inspect_err(|e| tracing::warn!(record = %key, "reject failed: {}", e))
    }

    /// Mail the agreement for an approved application.
    pub async fn send_agreement(&self, key: &RecordKey) -> Result<ActionAck> {
        tracing::info!(record = %key, "sending agreement");
        perform_optimistic_action(&self.board, key, RecordPatch::MarkAgreementSent, || {
            self.backend.send_agreement(key)
        })
        .await
        .inspect_err(|e| tracing::warn!(record = %key, "agreement failed: {}", e))
    }

    /// Tell the applicant which account (or the QR code) to pay into.
    ///
    /// # Errors
    ///
    /// `NotFound` if the option names an account missing from `banks`.
    pub async fn assign_bank(
        &self,
        key: &RecordKey,
        option: &BankOption,
        banks: &[BankAccount],
    ) -> Result<ActionAck> {
        let assignment = BankAssignment::new(&key.email, option, banks)
            .ok_or_else(|| ClientError::NotFound(format!("bank account {}", option.wire_value())))?;

        tracing::info!(record = %key, bank = option.wire_value(), "assigning bank");
        perform_optimistic_action(
            &self.board,
            key,
            RecordPatch::SetAssignedBank(Some(option.assigned_id())),
            || self.backend.assign_bank(&assignment),
        )
        .await
        .inspect_err(|e| tracing::warn!(record = %key, "bank assignment failed: {}", e))
    }
}
