//! Service endpoint configuration
//!
//! The service address is injected by the host page at app construction
//! time rather than baked into call sites.

/// Remote analysis service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    base_url: String,
    /// Upper bound applied to every remote call, in milliseconds.
    pub timeout_ms: u32,
}

impl ServiceConfig {
    /// Default bound on every remote call.
    pub const DEFAULT_TIMEOUT_MS: u32 = 20_000;

    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join the base address with an endpoint path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
