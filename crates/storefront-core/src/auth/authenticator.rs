use std::sync::Arc;

use reqwest::header::{self, HeaderValue};
use reqwest::Request;
use tracing::{trace, warn};

use super::store::CredentialStore;

/// Hook run on every outbound request just before it is sent.
pub trait RequestHook: Send + Sync {
    fn on_request(&self, request: Request) -> Request;
}

/// Attaches the current bearer token to outbound requests.
///
/// Requests go out unauthenticated when there is no usable token; it is
/// up to the server to reject them.
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<CredentialStore>,
}

impl Authenticator {
    pub fn new(store: Arc<CredentialStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    /// Add `Authorization: Bearer <token>` if the store holds a valid token.
    pub fn authorize(&self, mut request: Request) -> Request {
        let Some(token) = self.store.token().filter(|t| !t.is_empty()) else {
            trace!(url = %request.url(), "No session, sending unauthenticated");
            return request;
        };

        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers_mut().insert(header::AUTHORIZATION, value);
            }
            Err(_) => {
                warn!("Stored token is not a valid header value, sending unauthenticated");
            }
        }
        request
    }
}

impl RequestHook for Authenticator {
    fn on_request(&self, request: Request) -> Request {
        self.authorize(request)
    }
}
