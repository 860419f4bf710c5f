//! Fixtures and an in-memory backend for unit tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{ClientError, Result};
use crate::form::fields::{REQUIRED_CONSENTS, REQUIRED_TEXT_FIELDS};
use crate::form::{Attachment, Field, FormDraft};
use crate::models::{
    ActionAck, AgentLoginRequest, AgentLoginResponse, ApplicationRecord, ApplicationStatus,
    ApplicationUpdate, BankAccount, BankAccountRequest, BankAssignment, CustomerCredentials,
    RecordKey, SubmissionReceipt,
};
use crate::services::{ApplicationSubmission, FranchiseBackend};

/// A draft that passes every validation rule.
pub fn valid_draft() -> FormDraft {
    let mut draft = FormDraft::new();
    for &field in REQUIRED_TEXT_FIELDS {
        let value = match field {
            Field::FullName => "Asha Verma",
            Field::DateOfBirth => "1990-04-12",
            Field::PanNumber => "ABCDE1234F",
            Field::AadharNumber => "123456789012",
            Field::MobileNumber => "9876543210",
            Field::Email => "asha@example.com",
            Field::ResidentialPinCode | Field::OfficePinCode | Field::FranchisePinCode => "560001",
            Field::NumberOfEmployees => "4",
            Field::TotalSpace => "1200",
            Field::StaffCount => "6",
            Field::IfscCode => "HDFC0001234",
            Field::AccountNumber => "001234567890",
            _ => "Sample",
        };
        draft.set(field, value.into()).unwrap();
    }
    for &field in REQUIRED_CONSENTS {
        draft.set(field, true.into()).unwrap();
    }
    draft
}

pub fn pending_record(id: &str, name: &str, email: &str) -> ApplicationRecord {
    ApplicationRecord::new(id, name, email)
}

pub fn bank_account(id: &str, bank_name: &str) -> BankAccount {
    BankAccount {
        id: id.to_string(),
        bank_name: bank_name.to_string(),
        branch_name: "MG Road".to_string(),
        account_holder_name: "Valmo Logistics".to_string(),
        account_number: "001234567890".to_string(),
        ifsc_code: "HDFC0001234".to_string(),
        upi_id: None,
        qr_code: None,
    }
}

#[derive(Default)]
struct MockState {
    calls: HashMap<&'static str, usize>,
    failures: HashMap<&'static str, String>,
    applications: Vec<ApplicationRecord>,
    banks: Vec<BankAccount>,
    customer_passwords: HashMap<String, String>,
    submissions: Vec<ApplicationSubmission>,
    assignments: Vec<BankAssignment>,
    qr_uploads: Vec<(String, Attachment)>,
}

/// In-memory backend that counts calls and can be told to fail.
///
/// Mutations yield once before answering so concurrent callers interleave
/// the way they would against a real server.
#[derive(Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Count a call to `name` and fail it if a failure was queued.
    fn enter(&self, name: &'static str) -> Result<()> {
        let mut state = self.state();
        *state.calls.entry(name).or_default() += 1;
        match state.failures.remove(name) {
            Some(message) => Err(ClientError::Backend { status: 500, message }),
            None => Ok(()),
        }
    }

    pub fn calls(&self, name: &str) -> usize {
        self.state().calls.get(name).copied().unwrap_or(0)
    }

    /// Make the next call to `name` fail with `message`.
    pub fn fail_next(&self, name: &'static str, message: &str) {
        self.state().failures.insert(name, message.to_string());
    }

    pub fn set_applications(&self, applications: Vec<ApplicationRecord>) {
        self.state().applications = applications;
    }

    pub fn applications(&self) -> Vec<ApplicationRecord> {
        self.state().applications.clone()
    }

    pub fn set_banks(&self, banks: Vec<BankAccount>) {
        self.state().banks = banks;
    }

    pub fn banks(&self) -> Vec<BankAccount> {
        self.state().banks.clone()
    }

    pub fn set_customer_password(&self, email: &str, password: &str) {
        self.state()
            .customer_passwords
            .insert(email.to_string(), password.to_string());
    }

    pub fn submissions(&self) -> Vec<ApplicationSubmission> {
        self.state().submissions.clone()
    }

    pub fn assignments(&self) -> Vec<BankAssignment> {
        self.state().assignments.clone()
    }

    pub fn qr_uploads(&self) -> Vec<(String, Attachment)> {
        self.state().qr_uploads.clone()
    }

    fn set_status(&self, key: &RecordKey, status: ApplicationStatus) {
        if let Some(record) = self
            .state()
            .applications
            .iter_mut()
            .find(|r| r.key() == *key)
        {
            record.status = status;
        }
    }
}

fn not_found(message: &str) -> ClientError {
    ClientError::Backend {
        status: 404,
        message: message.to_string(),
    }
}

#[async_trait]
impl FranchiseBackend for MockBackend {
    async fn submit_application(&self, submission: ApplicationSubmission) -> Result<SubmissionReceipt> {
        self.enter("submit")?;
        tokio::task::yield_now().await;
        self.state().submissions.push(submission);
        Ok(SubmissionReceipt {
            message: Some("Application submitted successfully".to_string()),
            application_id: Some(Uuid::new_v4().to_string()),
        })
    }

    async fn list_applications(&self) -> Result<Vec<ApplicationRecord>> {
        self.enter("list_applications")?;
        Ok(self.applications())
    }

    async fn list_agent_applications(&self, _agent_id: &str) -> Result<Vec<ApplicationRecord>> {
        self.enter("list_agent_applications")?;
        Ok(self.applications())
    }

    async fn application_by_email(&self, email: &str) -> Result<ApplicationRecord> {
        self.enter("application_by_email")?;
        self.state()
            .applications
            .iter()
            .find(|r| r.email == email)
            .cloned()
            .ok_or_else(|| not_found("Application not found"))
    }

    async fn update_application(&self, id: &str, update: &ApplicationUpdate) -> Result<()> {
        self.enter("update_application")?;
        tokio::task::yield_now().await;
        let mut state = self.state();
        let record = state
            .applications
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found("Application not found"))?;
        update.apply_to(record);
        Ok(())
    }

    async fn delete_application(&self, id: &str) -> Result<()> {
        self.enter("delete_application")?;
        tokio::task::yield_now().await;
        let mut state = self.state();
        let before = state.applications.len();
        state.applications.retain(|r| r.id != id);
        if state.applications.len() == before {
            return Err(not_found("Application not found"));
        }
        Ok(())
    }

    async fn approve(&self, key: &RecordKey) -> Result<ActionAck> {
        self.enter("approve")?;
        tokio::task::yield_now().await;
        self.set_status(key, ApplicationStatus::APPROVED);
        Ok(ActionAck {
            message: Some("Approval mail sent".to_string()),
            customer_id: Some("CUST-1".to_string()),
        })
    }

    async fn reject(&self, key: &RecordKey) -> Result<ActionAck> {
        self.enter("reject")?;
        tokio::task::yield_now().await;
        self.set_status(key, ApplicationStatus::Rejected);
        Ok(ActionAck::default())
    }

    async fn send_agreement(&self, key: &RecordKey) -> Result<ActionAck> {
        self.enter("send_agreement")?;
        tokio::task::yield_now().await;
        self.set_status(
            key,
            ApplicationStatus::Approved {
                agreement_sent: true,
                fee_paid: false,
            },
        );
        Ok(ActionAck::default())
    }

    async fn assign_bank(&self, assignment: &BankAssignment) -> Result<ActionAck> {
        self.enter("assign_bank")?;
        tokio::task::yield_now().await;
        let mut state = self.state();
        if let Some(record) = state
            .applications
            .iter_mut()
            .find(|r| r.email == assignment.customer_email)
        {
            record.assigned_bank = Some(assignment.bank_option.clone());
        }
        state.assignments.push(assignment.clone());
        Ok(ActionAck::default())
    }

    async fn list_banks(&self) -> Result<Vec<BankAccount>> {
        self.enter("list_banks")?;
        Ok(self.banks())
    }

    async fn create_bank(&self, request: &BankAccountRequest) -> Result<()> {
        self.enter("create_bank")?;
        tokio::task::yield_now().await;
        let mut state = self.state();
        let id = format!("b{}", state.banks.len() + 1);
        state.banks.push(BankAccount {
            id,
            bank_name: request.bank_name.clone(),
            branch_name: request.branch_name.clone(),
            account_holder_name: request.account_holder_name.clone(),
            account_number: request.account_number.clone(),
            ifsc_code: request.ifsc_code.clone(),
            upi_id: Some(request.upi_id.clone()).filter(|u| !u.is_empty()),
            qr_code: None,
        });
        Ok(())
    }

    async fn update_bank(&self, id: &str, request: &BankAccountRequest) -> Result<()> {
        self.enter("update_bank")?;
        tokio::task::yield_now().await;
        let mut state = self.state();
        let bank = state
            .banks
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| not_found("Bank not found"))?;
        bank.bank_name = request.bank_name.clone();
        bank.branch_name = request.branch_name.clone();
        bank.account_holder_name = request.account_holder_name.clone();
        bank.account_number = request.account_number.clone();
        bank.ifsc_code = request.ifsc_code.clone();
        bank.upi_id = Some(request.upi_id.clone()).filter(|u| !u.is_empty());
        Ok(())
    }

    async fn delete_bank(&self, id: &str) -> Result<()> {
        self.enter("delete_bank")?;
        tokio::task::yield_now().await;
        self.state().banks.retain(|b| b.id != id);
        Ok(())
    }

    async fn upload_bank_qr(&self, id: &str, image: Attachment) -> Result<()> {
        self.enter("upload_bank_qr")?;
        tokio::task::yield_now().await;
        let mut state = self.state();
        if let Some(bank) = state.banks.iter_mut().find(|b| b.id == id) {
            bank.qr_code = Some(format!("https://cdn.example.com/{}", image.file_name));
        }
        state.qr_uploads.push((id.to_string(), image));
        Ok(())
    }

    async fn agent_login(&self, _request: &AgentLoginRequest) -> Result<AgentLoginResponse> {
        self.enter("agent_login")?;
        Ok(AgentLoginResponse {
            user_id: Some("u-17".to_string()),
            agent_id: Some("AGT001".to_string()),
        })
    }

    async fn customer_credentials(&self, email: &str) -> Result<CustomerCredentials> {
        self.enter("customer_credentials")?;
        let password = self
            .state()
            .customer_passwords
            .get(email)
            .cloned()
            .ok_or_else(|| not_found("Customer not found"))?;
        Ok(CustomerCredentials {
            customer_id: Some("CUST-1".to_string()),
            password,
        })
    }
}
