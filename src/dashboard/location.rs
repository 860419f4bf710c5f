//! Post-office picker used when agents enter a proposal's location.

use crate::models::PostOffice;

/// Separator between post-office names in a location string.
pub const LOCATION_SEPARATOR: &str = " | ";

/// Options for one PIN code and the subset the agent ticked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationPicker {
    options: Vec<String>,
    selected: Vec<String>,
}

impl LocationPicker {
    /// Every post office of a PIN, in lookup order.
    pub fn from_offices(offices: &[PostOffice]) -> Self {
        Self {
            options: offices.iter().map(|o| o.name.clone()).collect(),
            selected: Vec::new(),
        }
    }

    /// Rebuild the options from a stored `A | B | C` string.
    pub fn from_joined(location: &str) -> Self {
        Self {
            options: location
                .split(LOCATION_SEPARATOR)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            selected: Vec::new(),
        }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.iter().any(|s| s == name)
    }

    /// Tick or untick one option. Unknown names are ignored.
    pub fn toggle(&mut self, name: &str) {
        if let Some(index) = self.selected.iter().position(|s| s == name) {
            self.selected.remove(index);
        } else if self.options.iter().any(|o| o == name) {
            self.selected.push(name.to_string());
        }
    }

    pub fn select_all(&mut self) {
        self.selected = self.options.clone();
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    /// All options joined.
    pub fn joined(&self) -> String {
        self.options.join(LOCATION_SEPARATOR)
    }

    /// Location to save: the ticked options in tick order, or every option
    /// when nothing is ticked.
    pub fn resolved(&self) -> String {
        if self.selected.is_empty() {
            self.joined()
        } else {
            self.selected.join(LOCATION_SEPARATOR)
        }
    }
}
