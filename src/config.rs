//! Where the portal client finds its backend, and how often it talks to it.
//!
//! Every setting has a default, so an empty environment yields a working
//! client pointed at the hosted backend.

use std::time::Duration;

use serde::Deserialize;

/// Client configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `API_BASE_URL` (optional): franchise backend root, defaults to the hosted backend
/// - `PINCODE_API_URL` (optional): PIN-code lookup service root
/// - `REQUEST_TIMEOUT_SECS` (optional): per-request timeout, defaults to 15
/// - `POLL_INTERVAL_SECS` (optional): customer dashboard refresh period, defaults to 10
/// - `SESSION_FILE` (optional): where the session is persisted
/// - `ADMIN_EMAIL` / `ADMIN_PASSWORD` (optional): admin login is refused when unset
/// - `PROPOSAL_BASE_URL` (optional): base of agent proposal links
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_pincode_api_url")]
    pub pincode_api_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_session_file")]
    pub session_file: String,

    #[serde(default)]
    pub admin_email: Option<String>,

    #[serde(default)]
    pub admin_password: Option<String>,

    #[serde(default = "default_proposal_base_url")]
    pub proposal_base_url: String,
}

fn default_api_base_url() -> String {
    "https://valmobackend.onrender.com".to_string()
}

fn default_pincode_api_url() -> String {
    "https://api.postalpincode.in".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

/// The customer dashboard has always refreshed every 10 seconds.
fn default_poll_interval_secs() -> u64 {
    10
}

fn default_session_file() -> String {
    ".franchise-session.json".to_string()
}

fn default_proposal_base_url() -> String {
    "https://valmo.in/proposal-form".to_string()
}

impl Config {
    /// Read the client settings from the process environment, after
    /// merging in a `.env` file when one is present.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable value cannot be parsed
    /// into the expected type (e.g. a non-numeric `POLL_INTERVAL_SECS`).
    pub fn from_env() -> Result<Self, envy::Error> {
        // A missing .env file is fine
        dotenvy::dotenv().ok();
        envy::from_env::<Config>()
    }

    /// Build a config from an explicit list of variables instead of the
    /// process environment.
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Customer dashboard refresh period, never shorter than one second.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            pincode_api_url: default_pincode_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            session_file: default_session_file(),
            admin_email: None,
            admin_password: None,
            proposal_base_url: default_proposal_base_url(),
        }
    }
}
