//! Endpoints and credentials for talking to GitHub.

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default host serving release downloads.
pub const DEFAULT_SERVER_URL: &str = "https://github.com";

/// Organisation publishing the tools.
pub const DEFAULT_OWNER: &str = "purpleclay";

/// Configuration shared by the release source and the artifact downloader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubConfig {
    /// REST API base URL, without trailing slash
    pub api_url: String,
    /// Download host, without trailing slash
    pub server_url: String,
    /// Repository owner
    pub owner: String,
    /// Access token; empty tokens are never sent
    pub token: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            server_url: DEFAULT_SERVER_URL.to_string(),
            owner: DEFAULT_OWNER.to_string(),
            token: None,
        }
    }
}

impl GitHubConfig {
    /// Sets the access token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.is_empty()).then_some(token);
        self
    }

    /// Sets the REST API base URL.
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = trim_url(url.into());
        self
    }

    /// Sets the download host.
    #[must_use]
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = trim_url(url.into());
        self
    }

    /// Sets the repository owner.
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Build the HTTP client shared by every GitHub request.
///
/// # Errors
///
/// Returns an error if the TLS backend fails to initialise.
pub fn http_client() -> nsv_action_core::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("nsv-action/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| nsv_action_core::Error::configuration(format!("failed to create HTTP client: {e}")))
}
