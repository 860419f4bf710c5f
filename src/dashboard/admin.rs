//! Admin pages: application overview and the bank account registry.

use std::sync::Arc;

use crate::dispatch::{ActionDispatcher, ApplicationBoard};
use crate::error::{ClientError, Result};
use crate::form::Attachment;
use crate::form::validation::is_valid_ifsc;
use crate::models::{ApplicationRecord, BankAccount, BankAccountRequest};
use crate::notice::Notice;
use crate::services::FranchiseBackend;

use super::filter::{ApplicationStats, StatusFilter, matches_name};

/// Every application, with name search and a status tab.
pub struct AdminApplications<B: ?Sized> {
    backend: Arc<B>,
    board: Arc<ApplicationBoard>,
    dispatcher: ActionDispatcher<B>,
    search: String,
    status: StatusFilter,
}

impl<B: FranchiseBackend + ?Sized> AdminApplications<B> {
    pub fn new(backend: Arc<B>) -> Self {
        let board = Arc::new(ApplicationBoard::new());
        Self {
            dispatcher: ActionDispatcher::new(Arc::clone(&backend), Arc::clone(&board)),
            backend,
            board,
            search: String::new(),
            status: StatusFilter::All,
        }
    }

    /// Fetch all applications, replacing the local set.
    pub async fn fetch(&self) -> Result<usize> {
        let records = self.backend.list_applications().await.inspect_err(|e| {
            tracing::error!("failed to fetch applications: {}", e);
        })?;
        let count = records.len();
        self.board.replace(records);
        Ok(count)
    }

    pub fn actions(&self) -> &ActionDispatcher<B> {
        &self.dispatcher
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn set_status_filter(&mut self, status: StatusFilter) {
        self.status = status;
    }

    pub fn filtered(&self) -> Vec<ApplicationRecord> {
        self.board
            .snapshot()
            .into_iter()
            .filter(|r| matches_name(r, &self.search) && self.status.matches(&r.status))
            .collect()
    }

    /// Counts over everything fetched, ignoring search and tab.
    pub fn stats(&self) -> ApplicationStats {
        ApplicationStats::from_records(&self.board.snapshot())
    }
}

/// Contents of the add/edit bank form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BankEditor {
    /// `None` while adding a new account
    pub editing_id: Option<String>,
    pub request: BankAccountRequest,
}

impl BankEditor {
    pub fn is_new(&self) -> bool {
        self.editing_id.is_none()
    }
}

/// Admin management of the bank accounts applicants pay into.
///
/// Every successful change is followed by a full refetch.
pub struct BankRegistry<B: ?Sized> {
    backend: Arc<B>,
    banks: Vec<BankAccount>,
    editor: Option<BankEditor>,
}

impl<B: FranchiseBackend + ?Sized> BankRegistry<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            banks: Vec::new(),
            editor: None,
        }
    }

    pub fn banks(&self) -> &[BankAccount] {
        &self.banks
    }

    pub async fn refresh(&mut self) -> Result<&[BankAccount]> {
        self.banks = self.backend.list_banks().await.inspect_err(|e| {
            tracing::error!("failed to fetch bank details: {}", e);
        })?;
        Ok(&self.banks)
    }

    pub fn editor(&self) -> Option<&BankEditor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut BankEditor> {
        self.editor.as_mut()
    }

    /// Open an empty editor for a new account.
    pub fn add_bank(&mut self) -> &mut BankEditor {
        self.editor.insert(BankEditor::default())
    }

    /// Open the editor on an existing account.
    pub fn edit_bank(&mut self, id: &str) -> Result<&mut BankEditor> {
        let bank = self
            .banks
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| ClientError::NotFound(id.to_string()))?;
        Ok(self.editor.insert(BankEditor {
            editing_id: Some(bank.id.clone()),
            request: BankAccountRequest::from_account(bank),
        }))
    }

    pub fn cancel_edit(&mut self) {
        self.editor = None;
    }

    /// Create or update the account in the editor.
    ///
    /// # Process
    ///
    /// 1. Check holder, number, IFSC and bank name are present and the IFSC is well formed
    /// 2. `POST` a new account or `PUT` the edited one
    /// 3. Close the editor and refetch
    ///
    /// On failure the editor stays open with its contents.
    pub async fn save(&mut self) -> Result<Notice> {
        let editor = self
            .editor
            .as_ref()
            .ok_or_else(|| ClientError::InvalidInput("No bank is being edited".to_string()))?;
        check_request(&editor.request)?;

        match &editor.editing_id {
            None => self.backend.create_bank(&editor.request).await?,
            Some(id) => self.backend.update_bank(id, &editor.request).await?,
        }
        let message = if editor.is_new() {
            "Bank added successfully"
        } else {
            "Bank updated successfully"
        };
        tracing::info!(bank_id = ?editor.editing_id, "bank saved");

        self.editor = None;
        self.refresh().await?;
        Ok(Notice::success(message))
    }

    pub async fn delete(&mut self, id: &str) -> Result<Notice> {
        self.backend.delete_bank(id).await?;
        tracing::info!(bank_id = %id, "bank deleted");
        self.refresh().await?;
        Ok(Notice::success("Bank deleted successfully"))
    }

    /// Upload the payment QR image for an account.
    pub async fn upload_qr(&mut self, id: &str, image: Attachment) -> Result<Notice> {
        if !image.is_image() {
            return Err(ClientError::Attachment(
                "Please select a QR code image first".to_string(),
            ));
        }
        self.backend.upload_bank_qr(id, image).await?;
        tracing::info!(bank_id = %id, "QR code uploaded");
        self.refresh().await?;
        Ok(Notice::success("QR code uploaded successfully"))
    }
}

fn check_request(request: &BankAccountRequest) -> Result<()> {
    let missing: Vec<&str> = [
        ("accountHolderName", &request.account_holder_name),
        ("accountNumber", &request.account_number),
        ("ifscCode", &request.ifsc_code),
        ("bankName", &request.bank_name),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect();

    if !missing.is_empty() {
        return Err(ClientError::InvalidInput(format!(
            "Please fill all required fields. Missing: {}",
            missing.join(", ")
        )));
    }
    if !is_valid_ifsc(&request.ifsc_code) {
        return Err(ClientError::InvalidInput("Enter valid IFSC code".to_string()));
    }
    Ok(())
}
