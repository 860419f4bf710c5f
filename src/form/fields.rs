//! The application form's field table.
//!
//! Every field has a wire name (the multipart key the backend expects), a
//! kind (free text or yes/no flag) and the form section it belongs to.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a field holds text or a yes/no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Flag,
}

/// Form sections, in page order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    Personal,
    Contact,
    ResidentialAddress,
    Business,
    FranchiseLocation,
    Investment,
    Logistics,
    Qualification,
    References,
    BankDetails,
    Terms,
}

macro_rules! form_fields {
    ($( $variant:ident => $wire:literal, $kind:ident, $section:ident; )+) => {
        /// A field of the franchise application form.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Field {
            $( $variant, )+
        }

        impl Field {
            /// All fields, in page order.
            pub const ALL: &'static [Field] = &[ $( Field::$variant, )+ ];

            /// Multipart key sent to the backend.
            pub fn wire_name(self) -> &'static str {
                match self {
                    $( Field::$variant => $wire, )+
                }
            }

            pub fn kind(self) -> FieldKind {
                match self {
                    $( Field::$variant => FieldKind::$kind, )+
                }
            }

            pub fn section(self) -> Section {
                match self {
                    $( Field::$variant => Section::$section, )+
                }
            }

            /// Look a field up by its wire name.
            pub fn from_wire_name(name: &str) -> Option<Field> {
                match name {
                    $( $wire => Some(Field::$variant), )+
                    _ => None,
                }
            }
        }
    };
}

form_fields! {
    FullName => "fullName", Text, Personal;
    FatherHusbandName => "fatherHusbandName", Text, Personal;
    DateOfBirth => "dateOfBirth", Text, Personal;
    Gender => "gender", Text, Personal;
    Nationality => "nationality", Text, Personal;
    MaritalStatus => "maritalStatus", Text, Personal;
    PanNumber => "panNumber", Text, Personal;
    AadharNumber => "aadharNumber", Text, Personal;
    PassportNumber => "passportNumber", Text, Personal;

    MobileNumber => "mobileNumber", Text, Contact;
    AlternateMobileNumber => "alternateMobileNumber", Text, Contact;
    Email => "email", Text, Contact;
    PreferredCommunication => "preferredCommunication", Text, Contact;

    ResidentialStreet => "residentialStreet", Text, ResidentialAddress;
    ResidentialCity => "residentialCity", Text, ResidentialAddress;
    ResidentialDistrict => "residentialDistrict", Text, ResidentialAddress;
    ResidentialState => "residentialState", Text, ResidentialAddress;
    ResidentialPinCode => "residentialPinCode", Text, ResidentialAddress;

    BusinessName => "businessName", Text, Business;
    BusinessType => "businessType", Text, Business;
    GstNumber => "gstNumber", Text, Business;
    OfficeAddress => "officeAddress", Text, Business;
    OfficeCity => "officeCity", Text, Business;
    OfficeDistrict => "officeDistrict", Text, Business;
    OfficeState => "officeState", Text, Business;
    OfficePinCode => "officePinCode", Text, Business;
    NumberOfEmployees => "numberOfEmployees", Text, Business;

    FranchisePinCode => "franchisePinCode", Text, FranchiseLocation;
    PremisesOwnership => "premisesOwnership", Text, FranchiseLocation;
    TotalSpace => "totalSpace", Text, FranchiseLocation;
    WarehouseSpace => "warehouseSpace", Text, FranchiseLocation;
    ParkingFacility => "parkingFacility", Text, FranchiseLocation;
    OfficeSetup => "officeSetup", Text, FranchiseLocation;

    InvestmentCapacity => "investmentCapacity", Text, Investment;
    InvestmentSource => "investmentSource", Text, Investment;
    HasLoans => "hasLoans", Flag, Investment;
    LoanDetails => "loanDetails", Text, Investment;
    ExpectedRevenue => "expectedRevenue", Text, Investment;

    HasCommercialVehicles => "hasCommercialVehicles", Flag, Logistics;
    VehicleDetails => "vehicleDetails", Text, Logistics;
    IsFamiliarWithLogistics => "isFamiliarWithLogistics", Flag, Logistics;
    HasLogisticsExperience => "hasLogisticsExperience", Flag, Logistics;
    ExperienceDetails => "experienceDetails", Text, Logistics;
    StaffCount => "staffCount", Text, Logistics;

    Education => "education", Text, Qualification;
    ProfessionalBackground => "professionalBackground", Text, Qualification;
    Certifications => "certifications", Text, Qualification;

    HasOtherFranchise => "hasOtherFranchise", Flag, References;
    FranchiseDetails => "franchiseDetails", Text, References;
    HasLegalIssues => "hasLegalIssues", Flag, References;
    LegalDetails => "legalDetails", Text, References;
    Reference1Name => "reference1Name", Text, References;
    Reference1Contact => "reference1Contact", Text, References;
    Reference1Relationship => "reference1Relationship", Text, References;
    Reference2Name => "reference2Name", Text, References;
    Reference2Contact => "reference2Contact", Text, References;
    Reference2Relationship => "reference2Relationship", Text, References;

    BankName => "bankName", Text, BankDetails;
    BankBranch => "bankBranch", Text, BankDetails;
    AccountHolderName => "accountHolderName", Text, BankDetails;
    AccountNumber => "accountNumber", Text, BankDetails;
    IfscCode => "ifscCode", Text, BankDetails;
    UpiId => "upiId", Text, BankDetails;

    AgreeTerms => "agreeTerms", Flag, Terms;
    AgreeDisclaimer => "agreeDisclaimer", Flag, Terms;
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl Serialize for Field {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_name())
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Field::from_wire_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown form field `{name}`")))
    }
}

/// Value of a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Flag(_) => FieldKind::Flag,
        }
    }

    /// Empty value for a field of the given kind.
    pub fn empty(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Text => FieldValue::Text(String::new()),
            FieldKind::Flag => FieldValue::Flag(false),
        }
    }

    /// Text sent in the multipart body (`"true"` / `"false"` for flags).
    pub fn to_wire(&self) -> String {
        match self {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Flag(flag) => flag.to_string(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

/// A detail field that is shown, and required, only while its flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionalRule {
    pub flag: Field,
    pub detail: Field,
    pub message: &'static str,
}

pub const CONDITIONAL_RULES: &[ConditionalRule] = &[
    ConditionalRule {
        flag: Field::HasLoans,
        detail: Field::LoanDetails,
        message: "This field is required when you have loans",
    },
    ConditionalRule {
        flag: Field::HasCommercialVehicles,
        detail: Field::VehicleDetails,
        message: "This field is required when you have commercial vehicles",
    },
    ConditionalRule {
        flag: Field::HasLogisticsExperience,
        detail: Field::ExperienceDetails,
        message: "This field is required when you have logistics experience",
    },
    ConditionalRule {
        flag: Field::HasOtherFranchise,
        detail: Field::FranchiseDetails,
        message: "This field is required when you have other franchises",
    },
    ConditionalRule {
        flag: Field::HasLegalIssues,
        detail: Field::LegalDetails,
        message: "This field is required when you have legal issues",
    },
];

/// The rule that governs `detail`, if it is a conditional field.
pub fn conditional_rule_for(detail: Field) -> Option<&'static ConditionalRule> {
    CONDITIONAL_RULES.iter().find(|rule| rule.detail == detail)
}

/// Text fields that must be filled in.
pub const REQUIRED_TEXT_FIELDS: &[Field] = &[
    Field::FullName,
    Field::FatherHusbandName,
    Field::DateOfBirth,
    Field::Gender,
    Field::MaritalStatus,
    Field::PanNumber,
    Field::AadharNumber,
    Field::MobileNumber,
    Field::Email,
    Field::ResidentialStreet,
    Field::ResidentialCity,
    Field::ResidentialDistrict,
    Field::ResidentialState,
    Field::ResidentialPinCode,
    Field::OfficeAddress,
    Field::OfficeCity,
    Field::OfficeDistrict,
    Field::OfficeState,
    Field::OfficePinCode,
    Field::NumberOfEmployees,
    Field::FranchisePinCode,
    Field::PremisesOwnership,
    Field::TotalSpace,
    Field::WarehouseSpace,
    Field::ParkingFacility,
    Field::OfficeSetup,
    Field::InvestmentCapacity,
    Field::InvestmentSource,
    Field::ExpectedRevenue,
    Field::StaffCount,
    Field::Education,
    Field::BankName,
    Field::BankBranch,
    Field::AccountHolderName,
    Field::AccountNumber,
    Field::IfscCode,
];

/// Consent checkboxes that must be ticked.
pub const REQUIRED_CONSENTS: &[Field] = &[Field::AgreeTerms, Field::AgreeDisclaimer];
