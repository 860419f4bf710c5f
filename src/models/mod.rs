//! Data models and API request/response types.

pub mod application;
pub mod bank;
pub mod envelope;
pub mod pincode;
pub mod session;

pub use application::{
    ActionAck, ApplicationRecord, ApplicationStatus, ApplicationUpdate, DocumentUrls, RecordKey,
    StatusFlags, SubmissionReceipt,
};
pub use bank::{BankAccount, BankAccountRequest, BankAssignment, BankOption};
pub use pincode::PostOffice;
pub use session::{AgentLoginRequest, AgentLoginResponse, CustomerCredentials, Role, Session};
