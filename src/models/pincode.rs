//! PIN-code lookup response types.
//!
//! The postal lookup service answers `GET /pincode/{pin}` with a one-element
//! array:
//!
//! ```json
//! [{ "Status": "Success", "PostOffice": [{ "Name": "...", "Block": "...", "District": "...", "State": "..." }] }]
//! ```

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct PincodeResponse {
    #[serde(rename = "Status")]
    pub status: String,

    /// `null` when the PIN is unknown
    #[serde(rename = "PostOffice", default)]
    pub post_offices: Option<Vec<PostOffice>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PostOffice {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub block: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl PostOffice {
    /// City shown in address forms: the block, else the post-office name.
    pub fn city(&self) -> &str {
        match self.block.as_deref() {
            Some(block) if !block.is_empty() && block != "NA" => block,
            _ => &self.name,
        }
    }
}

/// True for a string of exactly six ASCII digits.
pub fn is_valid_pincode(pin: &str) -> bool {
    pin.len() == 6 && pin.bytes().all(|b| b.is_ascii_digit())
}
