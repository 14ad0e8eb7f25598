//! Client configuration

/// Client configuration for connecting to the hosted board backend.
///
/// The backend exposes two endpoints: the REST API (`base_url`) and the
/// blob storage host (`storage_url`). They are usually different origins.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST API base URL (e.g., "https://api.example.com")
    pub base_url: String,

    /// Blob storage base URL (e.g., "https://storage.example.com")
    pub storage_url: String,

    /// Bearer token for authentication
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>, storage_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            storage_url: storage_url.into(),
            token: None,
            timeout: 30,
        }
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> super::HttpClient {
        super::HttpClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080", "http://localhost:8080/storage")
    }
}
