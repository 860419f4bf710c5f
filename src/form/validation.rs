//! Field validation for the application form.
//!
//! `validate` is a pure function of the current values: it never looks at
//! previous errors and always returns the complete set.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::fields::{CONDITIONAL_RULES, Field, FieldValue, REQUIRED_CONSENTS, REQUIRED_TEXT_FIELDS};

pub const REQUIRED: &str = "This field is required";
pub const CONSENT_REQUIRED: &str = "You must accept to continue";

static PAN: LazyLock<Regex> = LazyLock::new(|| pattern(r"^[A-Z]{5}[0-9]{4}[A-Z]$"));
static AADHAR: LazyLock<Regex> = LazyLock::new(|| pattern(r"^[0-9]{12}$"));
static MOBILE: LazyLock<Regex> = LazyLock::new(|| pattern(r"^[0-9]{10}$"));
static EMAIL: LazyLock<Regex> = LazyLock::new(|| pattern(r"^[^\s@]+@[^\s@]+\.[^\s@]+$"));
static PIN: LazyLock<Regex> = LazyLock::new(|| pattern(r"^[0-9]{6}$"));
static IFSC: LazyLock<Regex> = LazyLock::new(|| pattern(r"^[A-Z]{4}0[A-Z0-9]{6}$"));

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("validation patterns are valid regexes")
}

/// Field → message map produced by validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn remove(&mut self, field: Field) -> Option<String> {
        self.0.remove(&field)
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    /// Comma-separated wire names, in page order.
    pub fn field_list(&self) -> String {
        self.0
            .keys()
            .map(|f| f.wire_name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Read access to form values, so rules can be checked against any store.
pub trait FieldSource {
    fn value(&self, field: Field) -> Option<&FieldValue>;

    fn text(&self, field: Field) -> &str {
        match self.value(field) {
            Some(FieldValue::Text(text)) => text,
            _ => "",
        }
    }

    fn flag(&self, field: Field) -> bool {
        matches!(self.value(field), Some(FieldValue::Flag(true)))
    }
}

/// Run every rule against `values`.
///
/// # Rules
///
/// 1. Required text fields must be non-empty
/// 2. Consent checkboxes must be ticked
/// 3. Format checks on filled fields (PAN, Aadhar, phones, email, PINs, IFSC)
/// 4. Numeric checks (total space, employee count ≥ 0, staff count ≥ 1)
/// 5. Each conditional detail is required while its flag is set
///
/// A format error replaces a "required" error for the same field; the two
/// cannot both apply since format checks only run on non-empty values.
pub fn validate(values: &impl FieldSource) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    for &field in REQUIRED_TEXT_FIELDS {
        if values.text(field).is_empty() {
            errors.insert(field, REQUIRED);
        }
    }

    for &field in REQUIRED_CONSENTS {
        if !values.flag(field) {
            errors.insert(field, CONSENT_REQUIRED);
        }
    }

    check_format(values, &mut errors, Field::PanNumber, "Enter valid PAN (e.g., ABCDE1234F)", is_valid_pan);
    check_format(values, &mut errors, Field::AadharNumber, "Enter 12-digit Aadhar number", is_valid_aadhar);
    for field in [Field::MobileNumber, Field::AlternateMobileNumber] {
        check_format(values, &mut errors, field, "Enter 10-digit mobile number", is_valid_mobile);
    }
    check_format(values, &mut errors, Field::Email, "Enter a valid email address", is_valid_email);
    for field in [
        Field::ResidentialPinCode,
        Field::OfficePinCode,
        Field::FranchisePinCode,
    ] {
        check_format(values, &mut errors, field, "Enter 6-digit PIN code", |v| PIN.is_match(v));
    }
    check_format(values, &mut errors, Field::TotalSpace, "Enter a valid number", |v| {
        parse_number(v).is_some()
    });
    check_format(values, &mut errors, Field::NumberOfEmployees, "Enter a valid number", |v| {
        parse_count(v).is_some()
    });
    check_format(values, &mut errors, Field::StaffCount, "Enter a valid number (minimum 1)", |v| {
        parse_count(v).is_some_and(|n| n >= 1)
    });
    check_format(values, &mut errors, Field::IfscCode, "Enter valid IFSC code", is_valid_ifsc);

    for rule in CONDITIONAL_RULES {
        if values.flag(rule.flag) && values.text(rule.detail).is_empty() {
            errors.insert(rule.detail, rule.message);
        }
    }

    errors
}

fn check_format(
    values: &impl FieldSource,
    errors: &mut ValidationErrors,
    field: Field,
    message: &str,
    is_valid: impl Fn(&str) -> bool,
) {
    let value = values.text(field);
    if !value.is_empty() && !is_valid(value) {
        errors.insert(field, message);
    }
}

/// PAN: five letters, four digits, one letter. Case-insensitive.
pub fn is_valid_pan(value: &str) -> bool {
    PAN.is_match(&value.to_uppercase())
}

pub fn is_valid_aadhar(value: &str) -> bool {
    AADHAR.is_match(value)
}

pub fn is_valid_mobile(value: &str) -> bool {
    MOBILE.is_match(value)
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// IFSC: four letters, a zero, six letters or digits. Case-insensitive.
pub fn is_valid_ifsc(value: &str) -> bool {
    IFSC.is_match(&value.to_uppercase())
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_count(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}
