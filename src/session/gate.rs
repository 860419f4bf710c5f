//! Sign-in, sign-out and page protection.

use std::fmt;
use std::sync::{Arc, LazyLock};

use chrono::Utc;
use url::Url;

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::models::{AgentLoginRequest, Role, Session};
use crate::services::FranchiseBackend;

use super::store::SessionStore;

/// Placeholder origin used only to percent-encode route segments.
static ROUTE_ORIGIN: LazyLock<Url> =
    LazyLock::new(|| Url::parse("http://portal.local/").expect("route origin is a valid URL"));

/// Where the shell should navigate next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    MultiLogin,
    CustomerLogin,
    AdminHome,
    AgentDashboard,
    CustomerDashboard { email: String },
}

impl Route {
    /// Login page for users of `role`.
    pub fn login_for(role: Role) -> Self {
        match role {
            Role::Admin | Role::Agent => Route::MultiLogin,
            Role::Customer => Route::CustomerLogin,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::MultiLogin => "/multi-login".to_string(),
            Route::CustomerLogin => "/customer-login".to_string(),
            Route::AdminHome => "/admin/admin-home".to_string(),
            Route::AgentDashboard => "/agent/agent-dashboard".to_string(),
            Route::CustomerDashboard { email } => segment_path(&["customer-dashboard", email]),
        }
    }
}

/// `/a/b` with each segment percent-encoded.
fn segment_path(segments: &[&str]) -> String {
    let mut url = ROUTE_ORIGIN.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url.path().to_string()
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// The single owner of "who is signed in".
///
/// Protected pages call [`SessionGate::require`] when they mount; login
/// pages call one of the `login_*` methods and navigate to the returned
/// route.
pub struct SessionGate<B: ?Sized, S: ?Sized> {
    backend: Arc<B>,
    store: Arc<S>,
    admin_credentials: Option<(String, String)>,
}

impl<B, S> SessionGate<B, S>
where
    B: FranchiseBackend + ?Sized,
    S: SessionStore + ?Sized,
{
    pub fn new(backend: Arc<B>, store: Arc<S>, config: &Config) -> Self {
        let admin_credentials = config
            .admin_email
            .clone()
            .zip(config.admin_password.clone());
        Self {
            backend,
            store,
            admin_credentials,
        }
    }

    /// The stored session, if one is readable.
    pub fn current(&self) -> Option<Session> {
        self.store.load().ok().flatten()
    }

    /// Admit a page for `role`, or say where to send the user instead.
    ///
    /// A missing session, a session of another role and an unreadable
    /// session all redirect to the role's login page. An unreadable
    /// session is also cleared.
    pub fn require(&self, role: Role) -> std::result::Result<Session, Route> {
        match self.store.load() {
            Ok(Some(session)) if session.role() == role => Ok(session),
            Ok(Some(session)) => {
                tracing::info!(
                    expected = role.as_str(),
                    found = session.role().as_str(),
                    "session role mismatch, redirecting"
                );
                Err(Route::login_for(role))
            }
            Ok(None) => Err(Route::login_for(role)),
            Err(ClientError::SessionCorrupt(e)) => {
                tracing::warn!("discarding unreadable session: {}", e);
                if let Err(e) = self.store.clear() {
                    tracing::error!("failed to clear session: {}", e);
                }
                Err(Route::login_for(role))
            }
            Err(e) => {
                tracing::error!("failed to read session: {}", e);
                Err(Route::login_for(role))
            }
        }
    }

    /// Sign in with the configured admin credentials.
    ///
    /// No network call is made. Refused when no admin is configured.
    pub fn login_admin(&self, email: &str, password: &str) -> Result<Route> {
        require_both(email, password)?;

        let matches = self
            .admin_credentials
            .as_ref()
            .is_some_and(|(e, p)| e == email && p == password);
        if !matches {
            tracing::warn!("admin login refused");
            return Err(ClientError::InvalidCredentials);
        }

        self.store.save(&Session::Admin {
            user_id: email.to_string(),
        })?;
        tracing::info!("admin signed in");
        Ok(Route::AdminHome)
    }

    /// Sign in an agent through `POST /Agentlogin`.
    ///
    /// # Process
    ///
    /// 1. Refuse empty credentials
    /// 2. Send email, password and user type
    /// 3. Store the returned user id (email when absent) and agent id
    pub async fn login_agent(&self, email: &str, password: &str) -> Result<Route> {
        require_both(email, password)?;

        let request = AgentLoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            user_type: Role::Agent,
        };
        let response = self.backend.agent_login(&request).await.inspect_err(|e| {
            tracing::warn!("agent login failed: {}", e);
        })?;

        let session = Session::Agent {
            user_id: response.user_id.unwrap_or_else(|| email.to_string()),
            agent_id: response.agent_id,
        };
        if session.agent_id().is_none() {
            tracing::warn!("agent login returned no agent id");
        }
        self.store.save(&session)?;
        tracing::info!(agent_id = ?session.agent_id(), "agent signed in");
        Ok(Route::AgentDashboard)
    }

    /// Sign in a customer.
    ///
    /// # Process
    ///
    /// 1. Refuse empty credentials
    /// 2. Fetch the stored credentials for the email
    /// 3. Compare the password locally
    /// 4. Store customer id, email and login time
    pub async fn login_customer(&self, email: &str, password: &str) -> Result<Route> {
        require_both(email, password)?;

        let credentials = self.backend.customer_credentials(email).await?;
        if credentials.password != password {
            tracing::info!("customer password mismatch");
            return Err(ClientError::InvalidCredentials);
        }

        self.store.save(&Session::Customer {
            customer_id: credentials.customer_id,
            email: email.to_string(),
            login_time: Utc::now(),
        })?;
        tracing::info!("customer signed in");
        Ok(Route::CustomerDashboard {
            email: email.to_string(),
        })
    }

    /// Forget the session and go home. Always lands on [`Route::Home`].
    pub fn logout(&self) -> Route {
        if let Err(e) = self.store.clear() {
            tracing::error!("failed to clear session on logout: {}", e);
        }
        Route::Home
    }
}

fn require_both(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ClientError::InvalidInput(
            "Please fill in all fields".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{FileSessionStore, MemorySessionStore};
    use crate::test_utils::MockBackend;

    fn config() -> Config {
        Config {
            admin_email: Some("admin@example.com".to_string()),
            admin_password: Some("s3cret".to_string()),
            ..Config::default()
        }
    }

    fn gate(backend: &Arc<MockBackend>) -> SessionGate<MockBackend, MemorySessionStore> {
        SessionGate::new(backend.clone(), Arc::new(MemorySessionStore::new()), &config())
    }

    #[test]
    fn missing_session_redirects_to_role_login() {
        let backend = Arc::new(MockBackend::default());
        let gate = gate(&backend);
        assert_eq!(gate.require(Role::Agent), Err(Route::MultiLogin));
        assert_eq!(gate.require(Role::Admin), Err(Route::MultiLogin));
        assert_eq!(gate.require(Role::Customer), Err(Route::CustomerLogin));
    }

    #[test]
    fn corrupt_session_is_cleared_and_redirects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "garbage").unwrap();

        let store = Arc::new(FileSessionStore::new(&path));
        let gate = SessionGate::new(Arc::new(MockBackend::default()), store, &config());
        assert_eq!(gate.require(Role::Customer), Err(Route::CustomerLogin));
        assert!(!path.exists());
    }

    #[test]
    fn admin_login_uses_configured_credentials() {
        let backend = Arc::new(MockBackend::default());
        let gate = gate(&backend);

        assert!(matches!(
            gate.login_admin("admin@example.com", "wrong"),
            Err(ClientError::InvalidCredentials)
        ));
        assert_eq!(gate.login_admin("admin@example.com", "s3cret").unwrap(), Route::AdminHome);
        assert_eq!(gate.require(Role::Admin).unwrap().role(), Role::Admin);
        // An admin session does not open agent pages
        assert_eq!(gate.require(Role::Agent), Err(Route::MultiLogin));
    }

    #[test]
    fn admin_login_refused_when_unconfigured() {
        let gate = SessionGate::new(
            Arc::new(MockBackend::default()),
            Arc::new(MemorySessionStore::new()),
            &Config::default(),
        );
        assert!(gate.login_admin("admin@example.com", "s3cret").is_err());
    }

    #[tokio::test]
    async fn empty_credentials_never_reach_the_backend() {
        let backend = Arc::new(MockBackend::default());
        let gate = gate(&backend);

        assert!(matches!(
            gate.login_agent("", "pw").await,
            Err(ClientError::InvalidInput(_))
        ));
        assert!(gate.login_customer("asha@example.com", "").await.is_err());
        assert_eq!(backend.calls("agent_login"), 0);
        assert_eq!(backend.calls("customer_credentials"), 0);
    }

    #[tokio::test]
    async fn agent_login_stores_agent_id() {
        let backend = Arc::new(MockBackend::default());
        let gate = gate(&backend);

        let route = gate.login_agent("ravi@example.com", "pw").await.unwrap();
        assert_eq!(route, Route::AgentDashboard);
        let session = gate.require(Role::Agent).unwrap();
        assert_eq!(session.agent_id(), Some("AGT001"));
    }

    #[tokio::test]
    async fn customer_login_compares_password_locally() {
        let backend = Arc::new(MockBackend::default());
        backend.set_customer_password("asha@example.com", "pw123");
        let gate = gate(&backend);

        assert!(matches!(
            gate.login_customer("asha@example.com", "nope").await,
            Err(ClientError::InvalidCredentials)
        ));
        assert_eq!(gate.require(Role::Customer), Err(Route::CustomerLogin));

        let route = gate.login_customer("asha@example.com", "pw123").await.unwrap();
        assert_eq!(route.path(), "/customer-dashboard/asha@example.com");
        let session = gate.require(Role::Customer).unwrap();
        assert_eq!(session.customer_email(), Some("asha@example.com"));
    }

    #[test]
    fn customer_dashboard_path_encodes_email() {
        let route = Route::CustomerDashboard {
            email: "asha verma/ops@example.com".to_string(),
        };
        assert_eq!(route.path(), "/customer-dashboard/asha%20verma%2Fops@example.com");
        assert_eq!(route.to_string(), route.path());
    }

    #[tokio::test]
    async fn logout_clears_and_goes_home() {
        let backend = Arc::new(MockBackend::default());
        let gate = gate(&backend);
        gate.login_agent("ravi@example.com", "pw").await.unwrap();

        assert_eq!(gate.logout(), Route::Home);
        assert!(gate.current().is_none());
        assert_eq!(gate.require(Role::Agent), Err(Route::MultiLogin));
    }
}
