//! Configuration for the remote voice API client.

use std::time::Duration;

use vocalis_core::settings::DEFAULT_MODEL_ID;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io/v1";

/// Configuration for [`RemoteClient`](super::RemoteClient).
///
/// # Example
///
/// ```
/// use vocalis_voice::remote::RemoteApiConfig;
/// use std::time::Duration;
///
/// let config = RemoteApiConfig::new("sk-123")
///     .with_timeout(Duration::from_secs(60))
///     .with_model_id("eleven_turbo_v2");
/// ```
#[derive(Clone)]
pub struct RemoteApiConfig {
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) model_id: String,
    pub(crate) user_agent: String,
    pub(crate) timeout: Duration,
}

impl RemoteApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            user_agent: concat!("vocalis/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Defaults to `https://api.elevenlabs.io/v1`.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout. Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

impl std::fmt::Debug for RemoteApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteApiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model_id", &self.model_id)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish()
    }
}
