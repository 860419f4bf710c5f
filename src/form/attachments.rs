//! Document uploads attached to the application form.

use std::collections::BTreeMap;

use crate::error::{ClientError, Result};

/// Largest file accepted in any slot.
pub const MAX_ATTACHMENT_BYTES: usize = 5 * 1024 * 1024;

/// Upload slots on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DocumentSlot {
    PassportPhoto,
    PanCard,
    AadharCard,
    AadharBack,
    BusinessProof,
    CancelledCheque,
    AddressProof,
}

impl DocumentSlot {
    pub const ALL: [DocumentSlot; 7] = [
        DocumentSlot::PassportPhoto,
        DocumentSlot::PanCard,
        DocumentSlot::AadharCard,
        DocumentSlot::AadharBack,
        DocumentSlot::BusinessProof,
        DocumentSlot::CancelledCheque,
        DocumentSlot::AddressProof,
    ];

    /// Multipart field name the backend stores the file under.
    pub fn wire_name(self) -> &'static str {
        match self {
            DocumentSlot::PassportPhoto => "photo",
            DocumentSlot::PanCard => "panCard",
            DocumentSlot::AadharCard => "aadharCard",
            DocumentSlot::AadharBack => "aadharBack",
            DocumentSlot::BusinessProof => "gstCertificate",
            DocumentSlot::CancelledCheque => "cancelCheque",
            DocumentSlot::AddressProof => "addressProof",
        }
    }

    fn requires_image(self) -> bool {
        matches!(self, DocumentSlot::PassportPhoto)
    }
}

/// Multipart field name for the free-form extra documents.
pub const OTHER_DOCUMENTS_FIELD: &str = "otherDocuments";

/// A file picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// Files attached to the current draft.
#[derive(Debug, Clone, Default)]
pub struct Attachments {
    slots: BTreeMap<DocumentSlot, Attachment>,
    others: Vec<Attachment>,
}

impl Attachments {
    /// Put a file in a slot, replacing what was there.
    ///
    /// # Errors
    ///
    /// - file larger than 5 MiB
    /// - a non-image file in the photo slot
    pub fn attach(&mut self, slot: DocumentSlot, file: Attachment) -> Result<()> {
        check_size(&file)?;
        if slot.requires_image() && !file.is_image() {
            return Err(ClientError::Attachment(
                "Please select a valid image file".to_string(),
            ));
        }
        self.slots.insert(slot, file);
        Ok(())
    }

    pub fn attach_other(&mut self, file: Attachment) -> Result<()> {
        check_size(&file)?;
        self.others.push(file);
        Ok(())
    }

    pub fn remove(&mut self, slot: DocumentSlot) -> Option<Attachment> {
        self.slots.remove(&slot)
    }

    pub fn get(&self, slot: DocumentSlot) -> Option<&Attachment> {
        self.slots.get(&slot)
    }

    pub fn others(&self) -> &[Attachment] {
        &self.others
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.others.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.others.is_empty()
    }

    /// Every file paired with its multipart field name.
    pub fn to_parts(&self) -> Vec<(&'static str, Attachment)> {
        self.slots
            .iter()
            .map(|(slot, file)| (slot.wire_name(), file.clone()))
            .chain(self.others.iter().map(|file| (OTHER_DOCUMENTS_FIELD, file.clone())))
            .collect()
    }
}

fn check_size(file: &Attachment) -> Result<()> {
    if file.size() > MAX_ATTACHMENT_BYTES {
        return Err(ClientError::Attachment(
            "File size must be under 5MB.".to_string(),
        ));
    }
    Ok(())
}
