//! Storefront Core - shared library for storefront clients.
//!
//! This crate contains everything needed to talk to the storefront backend
//! that does not depend on a particular front-end:
//!
//! - `auth`: Credential store with lazy session expiry and the request authenticator
//! - `api`: REST API client for the auth, user, product, category and cart endpoints,
//!   plus the external currency-rate service
//! - `models`: Request/response data types
//! - `config`: Application configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, CurrencyClient};
pub use auth::{
    Authenticator, Clock, CredentialStore, FileBackend, KeyringBackend, ManualClock,
    MemoryBackend, RequestHook, SessionBackend, SessionData, SystemClock,
};
pub use config::{Config, SessionBackendKind};
