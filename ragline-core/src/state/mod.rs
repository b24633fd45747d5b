//! Client-side state: the persisted credential store and the per-session
//! state container.

pub mod credentials;
pub mod session;

pub use credentials::{CredentialError, CredentialStore, StoredCredentials};
pub use session::{PendingMessage, SessionState};
