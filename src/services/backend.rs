//! The franchise backend as seen by the client.
//!
//! Every page talks to the backend through this trait, so the pages can be
//! exercised against an in-memory implementation and the HTTP details stay
//! in one place.

use async_trait::async_trait;

use crate::error::Result;
use crate::form::Attachment;
use crate::models::{
    ActionAck, AgentLoginRequest, AgentLoginResponse, ApplicationRecord, ApplicationUpdate,
    BankAccount, BankAccountRequest, BankAssignment, CustomerCredentials, RecordKey,
    SubmissionReceipt,
};

/// A packaged form submission, independent of transport.
///
/// `fields` carries every form field as text; `files` pairs each attachment
/// with its multipart field name (which may repeat).
#[derive(Debug, Clone, Default)]
pub struct ApplicationSubmission {
    pub fields: Vec<(String, String)>,
    pub files: Vec<(String, Attachment)>,
}

impl ApplicationSubmission {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Remote operations the franchise pages perform.
///
/// # Errors
///
/// Implementations return `ClientError::Network` when no response arrived
/// and `ClientError::Backend` for a non-success status or a
/// `success: false` body.
#[async_trait]
pub trait FranchiseBackend: Send + Sync {
    /// `POST /createApplication` (multipart)
    async fn submit_application(&self, submission: ApplicationSubmission) -> Result<SubmissionReceipt>;

    /// `GET /applications`, every application (admin)
    async fn list_applications(&self) -> Result<Vec<ApplicationRecord>>;

    /// `GET /application/agent/{agentId}`
    async fn list_agent_applications(&self, agent_id: &str) -> Result<Vec<ApplicationRecord>>;

    /// `GET /getApplication/email/{email}`
    async fn application_by_email(&self, email: &str) -> Result<ApplicationRecord>;

    /// `PUT /application/{id}`
    async fn update_application(&self, id: &str, update: &ApplicationUpdate) -> Result<()>;

    /// `DELETE /application/{id}`
    async fn delete_application(&self, id: &str) -> Result<()>;

    /// `POST /application/approve`
    async fn approve(&self, key: &RecordKey) -> Result<ActionAck>;

    /// `POST /application/reject`
    async fn reject(&self, key: &RecordKey) -> Result<ActionAck>;

    /// `POST /application/agreement`
    async fn send_agreement(&self, key: &RecordKey) -> Result<ActionAck>;

    /// `POST /assignBankDetails`
    async fn assign_bank(&self, assignment: &BankAssignment) -> Result<ActionAck>;

    /// `GET /bank-details`
    async fn list_banks(&self) -> Result<Vec<BankAccount>>;

    /// `POST /bank-details`
    async fn create_bank(&self, request: &BankAccountRequest) -> Result<()>;

    /// `PUT /bank-details/{id}`
    async fn update_bank(&self, id: &str, request: &BankAccountRequest) -> Result<()>;

    /// `DELETE /bank-details/{id}`
    async fn delete_bank(&self, id: &str) -> Result<()>;

    /// `POST /bank-details/{id}/qr-code` (multipart `qrCode`)
    async fn upload_bank_qr(&self, id: &str, image: Attachment) -> Result<()>;

    /// `POST /Agentlogin`
    async fn agent_login(&self, request: &AgentLoginRequest) -> Result<AgentLoginResponse>;

    /// `GET /customer/credentials?email=`
    async fn customer_credentials(&self, email: &str) -> Result<CustomerCredentials>;
}
