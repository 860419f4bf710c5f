//! Application data models and API request/response types.
//!
//! This module defines:
//! - `ApplicationRecord`: a franchise application as the backend returns it
//! - `ApplicationStatus`: the review state of an application
//! - `RecordKey`: the identity used by the mutation endpoints
//! - `ApplicationUpdate`: body for agent edits

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Review state of an application.
///
/// The backend stores four independent booleans (`approved`, `rejected`,
/// `agreementSent`, `oneTimeFeePaid`). Here the progress markers only exist
/// on the approved branch, so an application can never be approved and
/// rejected at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Rejected,
    Approved {
        agreement_sent: bool,
        fee_paid: bool,
    },
}

impl ApplicationStatus {
    /// Freshly approved, no progress yet.
    pub const APPROVED: ApplicationStatus = ApplicationStatus::Approved {
        agreement_sent: false,
        fee_paid: false,
    };

    pub fn is_pending(&self) -> bool {
        matches!(self, ApplicationStatus::Pending)
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, ApplicationStatus::Approved { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, ApplicationStatus::Rejected)
    }

    pub fn agreement_sent(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Approved {
                agreement_sent: true,
                ..
            }
        )
    }

    pub fn fee_paid(&self) -> bool {
        matches!(self, ApplicationStatus::Approved { fee_paid: true, .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Approved { .. } => "approved",
        }
    }

    /// Decode the backend's boolean flags.
    ///
    /// # Illegal combinations
    ///
    /// - `approved` and `rejected` both set: rejected wins, since a
    ///   rejection is the later decision in every observed workflow
    /// - progress flags without `approved`: the flags are dropped
    pub fn from_flags(flags: StatusFlags) -> Self {
        if flags.rejected {
            if flags.approved {
                tracing::warn!("application flagged both approved and rejected; treating as rejected");
            }
            return ApplicationStatus::Rejected;
        }
        if flags.approved {
            return ApplicationStatus::Approved {
                agreement_sent: flags.agreement_sent,
                fee_paid: flags.one_time_fee_paid,
            };
        }
        if flags.agreement_sent || flags.one_time_fee_paid {
            tracing::warn!("progress flags set on an unapproved application; ignoring them");
        }
        ApplicationStatus::Pending
    }

    pub fn to_flags(self) -> StatusFlags {
        match self {
            ApplicationStatus::Pending => StatusFlags::default(),
            ApplicationStatus::Rejected => StatusFlags {
                rejected: true,
                ..StatusFlags::default()
            },
            ApplicationStatus::Approved {
                agreement_sent,
                fee_paid,
            } => StatusFlags {
                approved: true,
                rejected: false,
                agreement_sent,
                one_time_fee_paid: fee_paid,
            },
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Wire form of [`ApplicationStatus`].
///
/// Missing or `null` flags read as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusFlags {
    #[serde(default, deserialize_with = "truthy")]
    pub approved: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub rejected: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub agreement_sent: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub one_time_fee_paid: bool,
}

fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// `assignedBank` arrives either as an account id, as the `qr_code`
/// marker, or as an embedded account snapshot; only the id is kept.
fn bank_ref<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BankRef {
        Id(String),
        Snapshot {
            #[serde(rename = "_id")]
            id: String,
        },
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<BankRef>::deserialize(deserializer)? {
        Some(BankRef::Id(id)) | Some(BankRef::Snapshot { id }) if !id.is_empty() => Some(id),
        _ => None,
    })
}

impl Serialize for ApplicationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_flags().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ApplicationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        StatusFlags::deserialize(deserializer).map(ApplicationStatus::from_flags)
    }
}

/// Identity the mutation endpoints use: the applicant's email and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    pub email: String,
    pub name: String,
}

impl RecordKey {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.email, self.name)
    }
}

/// URLs of the documents uploaded with an application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUrls {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan_card: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aadhar_card: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aadhar_back: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gst_certificate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_cheque: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_proof: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub other_documents: Vec<String>,
}

/// A franchise application as returned by the backend.
///
/// Two record shapes reach the client: full form submissions (`fullName`,
/// `mobileNumber`) and agent-created proposals (`name`, `phoneNumber`,
/// `location`, `pincode`). A proposal completed through the form carries
/// both. Each key decodes into its own field; read the applicant through
/// [`ApplicationRecord::name`] and [`ApplicationRecord::phone`], which prefer
/// the form values. Profile fields the client does not read are kept in
/// `extra` so a record survives a decode/encode cycle unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    /// Backend identifier
    #[serde(rename = "_id", default)]
    pub id: String,

    /// Applicant name from the form
    #[serde(default)]
    pub full_name: String,

    /// Applicant name from an agent proposal
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub proposal_name: Option<String>,

    #[serde(default)]
    pub email: String,

    /// Phone number from the form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,

    /// Phone number from an agent proposal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aadhar_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residential_city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residential_state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment_capacity: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ifsc_code: Option<String>,

    #[serde(flatten)]
    pub documents: DocumentUrls,

    /// Review state (encoded as the four backend booleans)
    #[serde(flatten)]
    pub status: ApplicationStatus,

    /// Bank account (by id) the applicant should pay into
    #[serde(default, deserialize_with = "bank_ref", skip_serializing_if = "Option::is_none")]
    pub assigned_bank: Option<String>,

    /// Customer login id, issued on approval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Every other field the backend sent
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ApplicationRecord {
    /// Minimal pending record, mostly useful for building local state.
    pub fn new(id: impl Into<String>, full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            full_name: full_name.into(),
            proposal_name: None,
            email: email.into(),
            mobile_number: None,
            phone_number: None,
            location: None,
            pincode: None,
            pan_number: None,
            aadhar_number: None,
            residential_city: None,
            residential_state: None,
            business_name: None,
            investment_capacity: None,
            bank_name: None,
            account_number: None,
            ifsc_code: None,
            documents: DocumentUrls::default(),
            status: ApplicationStatus::Pending,
            assigned_bank: None,
            customer_id: None,
            created_at: None,
            updated_at: None,
            extra: BTreeMap::new(),
        }
    }

    /// Applicant name: the form's `fullName`, else the proposal's `name`.
    pub fn name(&self) -> &str {
        match self.proposal_name.as_deref() {
            Some(name) if self.full_name.is_empty() => name,
            _ => &self.full_name,
        }
    }

    /// Phone number: the form's `mobileNumber`, else the proposal's `phoneNumber`.
    pub fn phone(&self) -> Option<&str> {
        non_empty(self.mobile_number.as_deref()).or(non_empty(self.phone_number.as_deref()))
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::new(&self.email, self.name())
    }
}

/// Fields an agent may edit on an application.
///
/// # JSON Example
///
/// ```json
/// {
///   "name": "Asha Verma",
///   "phoneNumber": "9876543210",
///   "email": "asha@example.com",
///   "pincode": "560001",
///   "location": "MG Road | Shivajinagar"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationUpdate {
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub pincode: String,
    pub location: String,
}

impl ApplicationUpdate {
    /// Editor contents for an existing record.
    pub fn from_record(record: &ApplicationRecord) -> Self {
        Self {
            name: record.name().to_string(),
            phone_number: record.phone().unwrap_or_default().to_string(),
            email: record.email.clone(),
            pincode: record.pincode.clone().unwrap_or_default(),
            location: record.location.clone().unwrap_or_default(),
        }
    }

    /// Merge a successful edit into the local copy.
    pub fn apply_to(&self, record: &mut ApplicationRecord) {
        record.full_name = self.name.clone();
        record.mobile_number = Some(self.phone_number.clone());
        if record.proposal_name.is_some() {
            record.proposal_name = Some(self.name.clone());
        }
        if record.phone_number.is_some() {
            record.phone_number = Some(self.phone_number.clone());
        }
        record.email = self.email.clone();
        record.pincode = Some(self.pincode.clone());
        record.location = Some(self.location.clone());
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// What the backend returns after a status mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionAck {
    pub message: Option<String>,
    pub customer_id: Option<String>,
}

/// Backend confirmation of a form submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionReceipt {
    pub message: Option<String>,
    pub application_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_form_record_with_flags() {
        let record: ApplicationRecord = serde_json::from_value(json!({
            "_id": "66a1",
            "fullName": "Asha Verma",
            "email": "asha@example.com",
            "mobileNumber": "9876543210",
            "approved": true,
            "agreementSent": true,
            "oneTimeFeePaid": null,
            "panCard": "https://cdn.example.com/pan.png",
            "gstNumber": "29ABCDE1234F1Z5",
            "createdAt": "2025-01-10T08:30:00Z"
        }))
        .unwrap();

        assert_eq!(record.id, "66a1");
        assert_eq!(
            record.status,
            ApplicationStatus::Approved {
                agreement_sent: true,
                fee_paid: false
            }
        );
        assert_eq!(record.documents.pan_card.as_deref(), Some("https://cdn.example.com/pan.png"));
        assert_eq!(record.extra.get("gstNumber"), Some(&json!("29ABCDE1234F1Z5")));
        assert!(!record.extra.contains_key("approved"));
        assert!(record.created_at.is_some());
    }

    #[test]
    fn decodes_agent_proposal_shape() {
        let record: ApplicationRecord = serde_json::from_value(json!({
            "_id": "p1",
            "name": "Ravi",
            "phoneNumber": "9000000000",
            "email": "ravi@example.com",
            "location": "Indiranagar",
            "pincode": "560038"
        }))
        .unwrap();

        assert_eq!(record.name(), "Ravi");
        assert_eq!(record.phone(), Some("9000000000"));
        assert!(record.status.is_pending());
        assert_eq!(record.key(), RecordKey::new("ravi@example.com", "Ravi"));
    }

    #[test]
    fn completed_proposal_carries_both_shapes() {
        let records: Vec<ApplicationRecord> = serde_json::from_value(json!([
            {
                "_id": "p1",
                "fullName": "Asha Verma",
                "name": "Asha",
                "mobileNumber": "9876543210",
                "phoneNumber": "9000000000",
                "email": "asha@example.com"
            },
            {"_id": "p2", "name": "Ravi", "phoneNumber": "9000000001", "email": "ravi@example.com"}
        ]))
        .unwrap();

        assert_eq!(records[0].name(), "Asha Verma");
        assert_eq!(records[0].phone(), Some("9876543210"));
        assert_eq!(records[0].key(), RecordKey::new("asha@example.com", "Asha Verma"));
        assert_eq!(records[1].name(), "Ravi");

        let value = serde_json::to_value(&records[0]).unwrap();
        assert_eq!(value["name"], json!("Asha"));
        assert_eq!(value["fullName"], json!("Asha Verma"));
    }

    #[test]
    fn edit_updates_both_shapes_of_a_proposal() {
        let mut record: ApplicationRecord = serde_json::from_value(json!({
            "_id": "p1", "name": "Ravi", "phoneNumber": "9000000000", "email": "ravi@example.com"
        }))
        .unwrap();
        let mut update = ApplicationUpdate::from_record(&record);
        assert_eq!(update.name, "Ravi");
        update.name = "Ravi Kumar".to_string();
        update.apply_to(&mut record);
        assert_eq!(record.name(), "Ravi Kumar");
        assert_eq!(record.proposal_name.as_deref(), Some("Ravi Kumar"));
    }

    #[test]
    fn assigned_bank_accepts_id_or_snapshot() {
        let by_id: ApplicationRecord =
            serde_json::from_value(json!({"_id": "a", "assignedBank": "b1"})).unwrap();
        assert_eq!(by_id.assigned_bank.as_deref(), Some("b1"));

        let by_snapshot: ApplicationRecord = serde_json::from_value(json!({
            "_id": "a",
            "assignedBank": {"_id": "b2", "bankName": "HDFC Bank"}
        }))
        .unwrap();
        assert_eq!(by_snapshot.assigned_bank.as_deref(), Some("b2"));

        let unset: ApplicationRecord =
            serde_json::from_value(json!({"_id": "a", "assignedBank": null})).unwrap();
        assert_eq!(unset.assigned_bank, None);
    }

    #[test]
    fn approved_and_rejected_resolves_to_rejected() {
        let status = ApplicationStatus::from_flags(StatusFlags {
            approved: true,
            rejected: true,
            agreement_sent: true,
            one_time_fee_paid: false,
        });
        assert_eq!(status, ApplicationStatus::Rejected);
    }

    #[test]
    fn progress_without_approval_is_pending() {
        let status = ApplicationStatus::from_flags(StatusFlags {
            agreement_sent: true,
            ..StatusFlags::default()
        });
        assert_eq!(status, ApplicationStatus::Pending);
    }

    #[test]
    fn encodes_consistent_flags() {
        let mut record = ApplicationRecord::new("x", "Asha", "asha@example.com");
        record.status = ApplicationStatus::Rejected;
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["rejected"], json!(true));
        assert_eq!(value["approved"], json!(false));
        assert_eq!(value["agreementSent"], json!(false));
    }

    #[test]
    fn update_merges_into_record() {
        let mut record = ApplicationRecord::new("x", "Asha", "asha@example.com");
        let mut update = ApplicationUpdate::from_record(&record);
        update.location = "Koramangala".to_string();
        update.phone_number = "9123456780".to_string();
        update.apply_to(&mut record);
        assert_eq!(record.location.as_deref(), Some("Koramangala"));
        assert_eq!(record.mobile_number.as_deref(), Some("9123456780"));
    }
}
