// Authentication context handed to whatever issues authenticated requests

use parking_lot::RwLock;
use tracing::info;

use crate::models::{GuestLogin, StaffLogin, StaffRole};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Staff { email: String, role: StaffRole },
    Guest { email: String },
}

impl Principal {
    pub fn email(&self) -> &str {
        match self {
            Principal::Staff { email, .. } | Principal::Guest { email } => email,
        }
    }
}

#[derive(Debug, Clone)]
struct Credentials {
    token: String,
    principal: Principal,
}

/// Holds the bearer token and signed-in principal between `login_*` and
/// `logout`.
#[derive(Debug, Default)]
pub struct Session {
    credentials: RwLock<Option<Credentials>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login_staff(&self, login: StaffLogin) {
        info!(email = %login.email, role = ?login.role, "staff session started");
        *self.credentials.write() = Some(Credentials {
            token: login.token,
            principal: Principal::Staff {
                email: login.email,
                role: login.role,
            },
        });
    }

    pub fn login_guest(&self, login: GuestLogin) {
        info!(email = %login.email, "guest session started");
        *self.credentials.write() = Some(Credentials {
            token: login.token,
            principal: Principal::Guest { email: login.email },
        });
    }

    /// Ends the session; returns whether one was active.
    pub fn logout(&self) -> bool {
        let ended = self.credentials.write().take();
        if let Some(credentials) = &ended {
            info!(email = %credentials.principal.email(), "session ended");
        }
        ended.is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.credentials.read().as_ref().map(|c| c.token.clone())
    }

    pub fn principal(&self) -> Option<Principal> {
        self.credentials.read().as_ref().map(|c| c.principal.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.read().is_some()
    }

    pub fn is_guest(&self) -> bool {
        matches!(
            self.credentials.read().as_ref().map(|c| &c.principal),
            Some(Principal::Guest { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guest_login(token: &str) -> GuestLogin {
        GuestLogin {
            token: token.to_string(),
            token_type: "Bearer".to_string(),
            email: "guest@example.com".to_string(),
            user_type: Some("GUEST".to_string()),
        }
    }

    #[test]
    fn test_guest_lifecycle() {
        let session = Session::new();
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);

        session.login_guest(guest_login("guest-token"));
        assert!(session.is_authenticated());
        assert!(session.is_guest());
        assert_eq!(session.token().as_deref(), Some("guest-token"));
        assert_eq!(session.principal().unwrap().email(), "guest@example.com");

        assert!(session.logout());
        assert!(!session.is_authenticated());
        assert!(!session.logout());
    }

    #[test]
    fn test_staff_login_replaces_guest() {
        let session = Session::new();
        session.login_guest(guest_login("guest-token"));
        session.login_staff(StaffLogin {
            token: "staff-token".to_string(),
            token_type: "Bearer".to_string(),
            email: "admin@hotel.com".to_string(),
            role: StaffRole::Receptionist,
        });

        assert!(!session.is_guest());
        assert_eq!(
            session.principal(),
            Some(Principal::Staff {
                email: "admin@hotel.com".to_string(),
                role: StaffRole::Receptionist
            })
        );
        assert_eq!(session.token().as_deref(), Some("staff-token"));
    }
}
