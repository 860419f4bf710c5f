//! The franchise application form.
//!
//! A [`FormController`] owns one [`FormDraft`] for the length of a page
//! visit. Fields are typed ([`Field`]), validation is a pure function over
//! the draft, and attachments are tracked per document slot.

pub mod attachments;
pub mod controller;
pub mod draft;
pub mod fields;
pub mod validation;

pub use attachments::{Attachment, Attachments, DocumentSlot, MAX_ATTACHMENT_BYTES};
pub use controller::{AddressKind, FormController, generate_application_number};
pub use draft::FormDraft;
pub use fields::{ConditionalRule, Field, FieldKind, FieldValue, Section};
pub use validation::{FieldSource, ValidationErrors, validate};
