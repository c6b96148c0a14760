use std::sync::Arc;

use pinhole_core::Shortener;

use crate::auth::IdentityProvider;

#[derive(Clone)]
pub struct AppState {
    shortener: Arc<dyn Shortener>,
    identity: Arc<dyn IdentityProvider>,
    base_url: String,
}

impl AppState {
    pub fn new(
        shortener: Arc<dyn Shortener>,
        identity: Arc<dyn IdentityProvider>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            shortener,
            identity,
            base_url: public_base_url.into(),
        }
    }

    pub fn shortener(&self) -> &dyn Shortener {
        self.shortener.as_ref()
    }

    pub fn identity(&self) -> &dyn IdentityProvider {
        self.identity.as_ref()
    }

    /// Public base URL short codes are appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
