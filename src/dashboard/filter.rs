//! Client-side search, status filtering and summary counts.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::models::{ApplicationRecord, ApplicationStatus};

/// Case-insensitive substring match over name, email, phone and location.
///
/// An empty term matches everything.
pub fn matches_search(record: &ApplicationRecord, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    [
        Some(record.name()),
        Some(record.email.as_str()),
        record.phone(),
        record.location.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|value| value.to_lowercase().contains(&term))
}

/// Case-insensitive substring match on the applicant name only.
pub fn matches_name(record: &ApplicationRecord, term: &str) -> bool {
    record
        .name()
        .to_lowercase()
        .contains(&term.trim().to_lowercase())
}

/// Status tab on the admin applications page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Approved,
    Rejected,
}

impl StatusFilter {
    pub fn matches(self, status: &ApplicationStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => status.is_pending(),
            StatusFilter::Approved => status.is_approved(),
            StatusFilter::Rejected => status.is_rejected(),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(StatusFilter::All),
            "pending" => Ok(StatusFilter::Pending),
            "approved" => Ok(StatusFilter::Approved),
            "rejected" => Ok(StatusFilter::Rejected),
            other => Err(ClientError::InvalidInput(format!("Unknown status filter {other}"))),
        }
    }
}

/// Counts shown on the dashboard summary cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl ApplicationStats {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ApplicationRecord>) -> Self {
        records
            .into_iter()
            .fold(ApplicationStats::default(), |mut stats, record| {
                stats.total += 1;
                match record.status {
                    ApplicationStatus::Pending => stats.pending += 1,
                    ApplicationStatus::Approved { .. } => stats.approved += 1,
                    ApplicationStatus::Rejected => stats.rejected += 1,
                }
                stats
            })
    }
}
