//! Optimistic updates with a rollback log.
//!
//! A [`RecordPatch`] changes one aspect of a record and, when applied,
//! returns the patch that undoes it. [`perform_optimistic_action`] applies
//! the patch before the remote call and applies the inverse if the call
//! fails or is abandoned.

use std::future::Future;

use crate::error::{ClientError, Result};
use crate::models::{ApplicationRecord, ApplicationStatus, RecordKey};

use super::board::ApplicationBoard;

/// A local change to one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordPatch {
    /// Pending → Approved
    Approve,
    /// Pending → Rejected
    Reject,
    /// Approved → Approved with the agreement sent
    MarkAgreementSent,
    /// Put back a previous status
    SetStatus(ApplicationStatus),
    /// Point the application at a bank account (or clear it)
    SetAssignedBank(Option<String>),
}

impl RecordPatch {
    /// Apply to `record` and return the inverse.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` if the record's status does not allow the
    /// change; the record is left untouched.
    pub fn apply(&self, record: &mut ApplicationRecord) -> Result<RecordPatch> {
        let previous = record.status;
        let next = match self {
            RecordPatch::Approve => match previous {
                ApplicationStatus::Pending => ApplicationStatus::APPROVED,
                other => return Err(refuse("approve", other)),
            },
            RecordPatch::Reject => match previous {
                ApplicationStatus::Pending => ApplicationStatus::Rejected,
                other => return Err(refuse("reject", other)),
            },
            RecordPatch::MarkAgreementSent => match previous {
                ApplicationStatus::Approved {
                    agreement_sent: false,
                    fee_paid,
                } => ApplicationStatus::Approved {
                    agreement_sent: true,
                    fee_paid,
                },
                other => return Err(refuse("send the agreement for", other)),
            },
            RecordPatch::SetStatus(status) => *status,
            RecordPatch::SetAssignedBank(bank) => {
                let previous = std::mem::replace(&mut record.assigned_bank, bank.clone());
                return Ok(RecordPatch::SetAssignedBank(previous));
            }
        };
        record.status = next;
        Ok(RecordPatch::SetStatus(previous))
    }
}

fn refuse(action: &'static str, status: ApplicationStatus) -> ClientError {
    let status = match status {
        ApplicationStatus::Approved {
            agreement_sent: true,
            ..
        } => "already under agreement",
        other => other.label(),
    };
    ClientError::InvalidTransition { action, status }
}

/// Pending inverse patch, applied on drop unless disarmed.
struct Rollback<'a> {
    board: &'a ApplicationBoard,
    key: &'a RecordKey,
    inverse: Option<RecordPatch>,
}

impl Rollback<'_> {
    fn disarm(mut self) {
        self.inverse = None;
    }
}

impl Drop for Rollback<'_> {
    fn drop(&mut self) {
        let Some(inverse) = self.inverse.take() else {
            return;
        };
        match self.board.apply(self.key, &inverse) {
            Ok(_) => tracing::info!(record = %self.key, "optimistic update reverted"),
            Err(e) => tracing::warn!(record = %self.key, "could not revert optimistic update: {}", e),
        }
    }
}

/// Apply `patch` locally, run `remote`, and undo the patch if it fails.
///
/// # Process
///
/// 1. Claim the record in the board's in-flight set
/// 2. Apply the patch and keep its inverse
/// 3. Await the remote call
/// 4. On error (or if this future is dropped before finishing) apply the inverse
/// 5. Release the in-flight claim on every exit path
///
/// # Errors
///
/// - `ActionInFlight` if another action for the record is still running;
///   nothing is changed and `remote` is not called
/// - `NotFound` / `InvalidTransition` if the patch cannot be applied;
///   `remote` is not called
/// - whatever `remote` returns
pub async fn perform_optimistic_action<T, F, Fut>(
    board: &ApplicationBoard,
    key: &RecordKey,
    patch: RecordPatch,
    remote: F,
) -> Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let _claim = board.in_flight().begin(key)?;

    let inverse = board.apply(key, &patch)?;
    tracing::debug!(record = %key, ?patch, "optimistic update applied");
    let rollback = Rollback {
        board,
        key,
        inverse: Some(inverse),
    };

    let value = remote().await?;
    rollback.disarm();
    Ok(value)
}
