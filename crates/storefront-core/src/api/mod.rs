//! REST API client module for the storefront backend.
//!
//! This module provides the `ApiClient` for the shop's own backend and the
//! `CurrencyClient` for the external exchange-rate service.
//!
//! The backend uses bearer token authentication. The token is issued by
//! `Auth/login` and attached to each request by the `Authenticator`.

pub mod client;
pub mod currency;
pub mod error;

pub use client::{ApiClient, DEFAULT_API_BASE_URL};
pub use currency::{CurrencyClient, DEFAULT_CURRENCY_BASE_URL};
pub use error::ApiError;
