//! Session tracking for discovery -> download flows.

mod artifact;
mod memory;
mod store;
mod types;

pub use artifact::{reclaim_artifact, ArtifactReclaim};
pub use memory::InMemorySessionStore;
pub use store::{SessionError, SessionStore};
pub use types::{is_expired, Session};
