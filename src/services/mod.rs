//! Remote collaborators: the franchise backend and the PIN-code service.

/// Backend contract shared by every page
pub mod backend;

/// reqwest implementation of the backend contract
pub mod http_backend;

/// Postal PIN-code lookup
pub mod pincode;

pub use backend::{ApplicationSubmission, FranchiseBackend};
pub use http_backend::HttpBackend;
pub use pincode::{PincodeLookup, PostalPincodeService, StaticPincodeLookup};
