//! Form page controller: invitation check, address autofill, submission.

use std::sync::Arc;

use rand::Rng;
use url::form_urlencoded;

use crate::error::{ClientError, Result};
use crate::models::SubmissionReceipt;
use crate::models::pincode::is_valid_pincode;
use crate::notice::Notice;
use crate::services::{FranchiseBackend, PincodeLookup};

use super::draft::FormDraft;
use super::fields::{Field, FieldValue};

/// Prefix of the display-only application number.
pub const APPLICATION_NUMBER_PREFIX: &str = "VL";

/// Which address block an autofill targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    Residential,
    Office,
}

impl AddressKind {
    fn fields(self) -> [Field; 3] {
        match self {
            AddressKind::Residential => [
                Field::ResidentialCity,
                Field::ResidentialDistrict,
                Field::ResidentialState,
            ],
            AddressKind::Office => [Field::OfficeCity, Field::OfficeDistrict, Field::OfficeState],
        }
    }
}

/// Random `VL-NNNNNN` number shown to the applicant.
///
/// Not unique and unrelated to any backend id.
pub fn generate_application_number() -> String {
    let number: u32 = rand::rng().random_range(100_000..=999_999);
    format!("{APPLICATION_NUMBER_PREFIX}-{number}")
}

/// State and actions of the application form page.
pub struct FormController<B: ?Sized> {
    backend: Arc<B>,
    draft: FormDraft,
    application_number: String,
    invite_token: Option<String>,
    notice: Option<Notice>,
}

impl<B: FranchiseBackend + ?Sized> FormController<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            draft: FormDraft::new(),
            application_number: generate_application_number(),
            invite_token: None,
            notice: None,
        }
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut FormDraft {
        &mut self.draft
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<FieldValue>) -> Result<()> {
        self.draft.set(field, value.into())
    }

    pub fn set_field_by_name(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<()> {
        self.draft.set_by_name(name, value.into())
    }

    pub fn application_number(&self) -> &str {
        &self.application_number
    }

    pub fn invite_token(&self) -> Option<&str> {
        self.invite_token.as_deref()
    }

    /// Latest notice for the page, if any.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Read the invitation token from the page's query string.
    ///
    /// The form is only reachable through an agent's invitation link
    /// (`?token=...`).
    pub fn accept_invitation(&mut self, query: &str) -> Result<&str> {
        let token = form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .find(|(key, value)| key == "token" && !value.is_empty())
            .map(|(_, value)| value.into_owned());

        match token {
            Some(token) => {
                tracing::info!("form opened with invitation token");
                Ok(self.invite_token.insert(token))
            }
            None => Err(self.fail(ClientError::InvalidInput(
                "This form requires a valid invitation link. Please contact your agent for a proper invitation."
                    .to_string(),
            ))),
        }
    }

    /// Fill city, district and state from a PIN code.
    ///
    /// # Process
    ///
    /// 1. Reject anything but six digits
    /// 2. Look the PIN up
    /// 3. Copy the first post office's city (block, else name), district and state
    pub async fn autofill_address<L>(&mut self, kind: AddressKind, pin: &str, lookup: &L) -> Result<()>
    where
        L: PincodeLookup + ?Sized,
    {
        if !is_valid_pincode(pin) {
            return Err(self.fail(ClientError::InvalidInput("Invalid PIN code".to_string())));
        }

        let offices = match lookup.lookup(pin).await {
            Ok(offices) => offices,
            Err(e) => {
                tracing::error!("pincode lookup failed: {}", e);
                return Err(self.fail(e));
            }
        };
        let Some(office) = offices.first() else {
            return Err(self.fail(ClientError::NotFound("No details found".to_string())));
        };

        let [city, district, state] = kind.fields();
        self.draft.set(city, office.city().into())?;
        self.draft
            .set(district, office.district.clone().unwrap_or_default().into())?;
        self.draft
            .set(state, office.state.clone().unwrap_or_default().into())?;

        self.notice = Some(Notice::success("Details filled successfully"));
        Ok(())
    }

    /// Validate and send the application.
    ///
    /// # Process
    ///
    /// 1. Validate; any error blocks submission and produces a summary notice
    /// 2. Package fields and files and post them to the backend
    /// 3. On success reset the draft and draw a new application number
    /// 4. On failure keep the draft so the user can resubmit
    ///
    /// A second submission cannot start while one is in flight: the
    /// controller is borrowed mutably for the whole call.
    pub async fn submit(&mut self) -> Result<SubmissionReceipt> {
        let errors = self.draft.validate().clone();
        if !errors.is_empty() {
            tracing::info!(count = errors.len(), fields = %errors.field_list(), "form validation failed");
            return Err(self.fail(ClientError::Validation(errors)));
        }

        let submission = self.draft.to_submission();
        tracing::info!(
            fields = submission.fields.len(),
            files = submission.files.len(),
            "submitting application"
        );

        match self.backend.submit_application(submission).await {
            Ok(receipt) => {
                self.draft.reset();
                self.application_number = generate_application_number();
                self.notice = Some(Notice::success(
                    "Thank you for showing interest in the franchise! Your form has been successfully submitted. Our team will contact you shortly with the next steps.",
                ));
                Ok(receipt)
            }
            Err(e) => {
                tracing::error!("application submission failed: {}", e);
                Err(self.fail(e))
            }
        }
    }

    fn fail(&mut self, error: ClientError) -> ClientError {
        self.notice = Some(error.to_notice());
        error
    }
}
