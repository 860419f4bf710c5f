//! In-memory state of the application form.

use std::collections::BTreeMap;

use crate::error::{ClientError, Result};
use crate::services::ApplicationSubmission;

use super::attachments::Attachments;
use super::fields::{
    CONDITIONAL_RULES, Field, FieldValue, REQUIRED_CONSENTS, REQUIRED_TEXT_FIELDS,
    conditional_rule_for,
};
use super::validation::{FieldSource, ValidationErrors, validate};

/// Everything the user has entered on the form page so far.
///
/// A draft only lives as long as the page visit. Every field always has a
/// value: text fields start empty and flags start unset (`false`).
#[derive(Debug, Clone)]
pub struct FormDraft {
    values: BTreeMap<Field, FieldValue>,
    errors: ValidationErrors,
    attachments: Attachments,
}

impl Default for FormDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl FormDraft {
    pub fn new() -> Self {
        let values = Field::ALL
            .iter()
            .map(|&field| (field, FieldValue::empty(field.kind())))
            .collect();
        Self {
            values,
            errors: ValidationErrors::default(),
            attachments: Attachments::default(),
        }
    }

    /// Update one field and clear its error.
    ///
    /// Turning a flag off hides its detail field but keeps whatever was
    /// typed there.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the value's kind does not match the field's.
    pub fn set(&mut self, field: Field, value: FieldValue) -> Result<()> {
        if value.kind() != field.kind() {
            return Err(ClientError::InvalidInput(format!(
                "{field} expects a {:?} value",
                field.kind()
            )));
        }
        self.values.insert(field, value);
        self.errors.remove(field);
        Ok(())
    }

    /// [`FormDraft::set`] addressed by wire name.
    pub fn set_by_name(&mut self, name: &str, value: FieldValue) -> Result<()> {
        let field = Field::from_wire_name(name)
            .ok_or_else(|| ClientError::InvalidInput(format!("Unknown field {name}")))?;
        self.set(field, value)
    }

    pub fn get(&self, field: Field) -> &FieldValue {
        // Every field is populated in `new`
        &self.values[&field]
    }

    /// Whether the field is currently shown. Only conditional details can
    /// be hidden.
    pub fn is_visible(&self, field: Field) -> bool {
        conditional_rule_for(field).is_none_or(|rule| self.flag(rule.flag))
    }

    /// Whether the field must be filled before submitting.
    pub fn is_required(&self, field: Field) -> bool {
        REQUIRED_TEXT_FIELDS.contains(&field)
            || REQUIRED_CONSENTS.contains(&field)
            || CONDITIONAL_RULES
                .iter()
                .any(|rule| rule.detail == field && self.flag(rule.flag))
    }

    /// Validate every field and remember the result.
    pub fn validate(&mut self) -> &ValidationErrors {
        self.errors = validate(self);
        &self.errors
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(field)
    }

    pub fn attachments(&self) -> &Attachments {
        &self.attachments
    }

    pub fn attachments_mut(&mut self) -> &mut Attachments {
        &mut self.attachments
    }

    /// Package the draft for the backend.
    ///
    /// Every field is sent, hidden details included; flags go as
    /// `"true"`/`"false"`.
    pub fn to_submission(&self) -> ApplicationSubmission {
        ApplicationSubmission {
            fields: self
                .values
                .iter()
                .map(|(field, value)| (field.wire_name().to_string(), value.to_wire()))
                .collect(),
            files: self
                .attachments
                .to_parts()
                .into_iter()
                .map(|(name, file)| (name.to_string(), file))
                .collect(),
        }
    }

    /// Back to a blank form.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl FieldSource for FormDraft {
    fn value(&self, field: Field) -> Option<&FieldValue> {
        self.values.get(&field)
    }
}
