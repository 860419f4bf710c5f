//! Bank account data models and API request types.
//!
//! This module defines:
//! - `BankAccount`: a payment account managed by the admin
//! - `BankAccountRequest`: body for creating or updating an account
//! - `BankAssignment`: body for linking an account to an applicant

use serde::{Deserialize, Serialize};

/// Payment account an applicant is told to pay into.
///
/// Applications reference accounts by id (`assignedBank`); they never own them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    #[serde(rename = "_id")]
    pub id: String,

    pub bank_name: String,

    #[serde(default)]
    pub branch_name: String,

    pub account_holder_name: String,

    pub account_number: String,

    pub ifsc_code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upi_id: Option<String>,

    /// URL of the uploaded payment QR image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
}

/// Request body for creating or updating a bank account.
///
/// # JSON Example
///
/// ```json
/// {
///   "accountHolderName": "Valmo Logistics",
///   "accountNumber": "001234567890",
///   "ifscCode": "HDFC0001234",
///   "bankName": "HDFC Bank",
///   "branchName": "MG Road",
///   "upiId": "valmo@hdfc"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccountRequest {
    pub account_holder_name: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub bank_name: String,
    pub branch_name: String,
    pub upi_id: String,
}

impl BankAccountRequest {
    /// Editor contents for an existing account.
    pub fn from_account(account: &BankAccount) -> Self {
        Self {
            account_holder_name: account.account_holder_name.clone(),
            account_number: account.account_number.clone(),
            ifsc_code: account.ifsc_code.clone(),
            bank_name: account.bank_name.clone(),
            branch_name: account.branch_name.clone(),
            upi_id: account.upi_id.clone().unwrap_or_default(),
        }
    }
}

/// How the applicant should pay: a specific account, or the generic QR code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankOption {
    Account(String),
    QrCode,
}

impl BankOption {
    /// Value the backend expects in `bankOption`.
    pub fn wire_value(&self) -> &str {
        match self {
            BankOption::Account(id) => id,
            BankOption::QrCode => "qr_code",
        }
    }

    /// Id recorded in the application's `assignedBank`.
    pub fn assigned_id(&self) -> String {
        self.wire_value().to_string()
    }
}

/// Request body for `POST /assignBankDetails`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAssignment {
    pub customer_email: String,
    pub bank_option: String,
    /// Snapshot of the chosen account; `null` for the QR option
    pub bank_details: Option<BankAccount>,
}

impl BankAssignment {
    /// Build the assignment, snapshotting the chosen account from the known list.
    ///
    /// Returns `None` when an account id is given that is not in `banks`.
    pub fn new(customer_email: &str, option: &BankOption, banks: &[BankAccount]) -> Option<Self> {
        let bank_details = match option {
            BankOption::QrCode => None,
            BankOption::Account(id) => Some(banks.iter().find(|b| &b.id == id)?.clone()),
        };
        Some(Self {
            customer_email: customer_email.to_string(),
            bank_option: option.wire_value().to_string(),
            bank_details,
        })
    }
}
