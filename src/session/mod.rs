//! Who is signed in, and where unauthenticated users are sent.

pub mod gate;
pub mod store;

pub use gate::{Route, SessionGate};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
