use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "sessionid";

pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: String, password: String) -> Self {
        Self { username, password }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Passwords are never stored; only this hash is.
    pub fn pwhash(&self) -> String {
        sha256::digest(format!("{}:{}", self.username, self.password))
    }
}

/// Opaque server-side session token, delivered via the sessionid cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl FromStr for SessionId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self).map_err(|_| ())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}", self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pwhash_depends_on_user_and_password() {
        let a = Credentials::new("alice".into(), "x".into());
        let b = Credentials::new("alice".into(), "y".into());
        let c = Credentials::new("bob".into(), "x".into());

        assert_eq!(a.pwhash(), Credentials::new("alice".into(), "x".into()).pwhash());
        assert_ne!(a.pwhash(), b.pwhash());
        assert_ne!(a.pwhash(), c.pwhash());
    }

    #[test]
    fn session_id_roundtrips_through_display() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn session_id_rejects_junk() {
        assert!("not-a-uuid".parse::<SessionId>().is_err());
    }
}
