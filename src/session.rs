use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::api::{ApiRequest, ApiResponse};
use crate::models::{Record, Role};

/// The signed-in identity as returned by the `login` action.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub role: Role,
    pub id: String,
    pub name: String,
    pub fields: Record,
}

impl UserProfile {
    fn from_login(role: Role, login_id: &str, user: Option<Value>) -> Self {
        let fields = match user {
            Some(Value::Object(map)) => Record(map),
            _ => Record::default(),
        };
        let id = [role.id_field(), "id"]
            .iter()
            .map(|f| fields.text(f))
            .find(|v| !v.is_empty())
            .unwrap_or_else(|| login_id.to_string());
        let name = Some(fields.text("name"))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| id.clone());
        Self { role, id, name, fields }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticating {
        role: Role,
        login_id: String,
        attempt: u64,
    },
    Authenticated(UserProfile),
}

/// Page-lifetime identity. Nothing here is persisted, so every start of the
/// application begins anonymous.
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    attempts: u64,
}

impl Session {
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user(&self) -> Option<&UserProfile> {
        match &self.state {
            SessionState::Authenticated(profile) => Some(profile),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|u| u.role)
    }

    pub fn is_authenticating(&self) -> bool {
        matches!(self.state, SessionState::Authenticating { .. })
    }

    pub fn login_request(role: Role, id: &str, password: &str) -> ApiRequest {
        ApiRequest::new(
            "login",
            json!({ "role": role.as_str(), "id": id, "password": password }),
        )
    }

    /// Starts a new attempt and returns its number with the request to send.
    /// The reply must be handed back to [`Session::complete_login`] with the
    /// same number.
    pub fn begin_login(&mut self, role: Role, id: &str, password: &str) -> (u64, ApiRequest) {
        self.attempts += 1;
        self.state = SessionState::Authenticating {
            role,
            login_id: id.to_string(),
            attempt: self.attempts,
        };
        (self.attempts, Self::login_request(role, id, password))
    }

    /// Settles the pending attempt. Returns `None` when `attempt` is not the
    /// one in flight, which leaves the session untouched.
    pub fn complete_login(&mut self, attempt: u64, response: ApiResponse) -> Option<Result<UserProfile, String>> {
        let (role, login_id) = match &self.state {
            SessionState::Authenticating {
                role,
                login_id,
                attempt: pending,
            } if *pending == attempt => (*role, login_id.clone()),
            _ => {
                debug!(attempt, "dropping reply for a login attempt that is no longer pending");
                return None;
            }
        };

        if !response.success {
            self.state = SessionState::Anonymous;
            let message = match response.message.as_deref() {
                Some(m) if !response.transport_failure && !m.trim().is_empty() => m.to_string(),
                _ => {
                    if response.transport_failure {
                        warn!(error = %response.error_message(), "login could not reach the backend");
                    }
                    "Invalid credentials".to_string()
                }
            };
            return Some(Err(message));
        }

        let profile = UserProfile::from_login(role, &login_id, response.user);
        info!(role = role.as_str(), id = %profile.id, "logged in");
        self.state = SessionState::Authenticated(profile.clone());
        Some(Ok(profile))
    }

    pub fn logout(&mut self) {
        if let SessionState::Authenticated(profile) = &self.state {
            info!(id = %profile.id, "logged out");
        }
        self.state = SessionState::Anonymous;
    }
}
