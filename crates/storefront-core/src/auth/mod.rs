//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `CredentialStore`: The single session record (token, user id, expiry) with lazy expiry
//! - `SessionBackend`: Where the record is persisted (JSON file, OS keychain, or memory)
//! - `Authenticator`: Pre-request hook that attaches the bearer token
//! - `Clock`: Time source, swappable in tests
//!
//! Sessions expire a fixed time after login (3 hours by default). Expiry is
//! detected when the token is read; there is no background timer.

pub mod authenticator;
pub mod backend;
pub mod clock;
pub mod store;

pub use authenticator::{Authenticator, RequestHook};
pub use backend::{FileBackend, KeyringBackend, MemoryBackend, SessionBackend};
pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{CredentialStore, SessionData, DEFAULT_VALIDITY_MINUTES};
