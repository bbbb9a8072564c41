// ── Authenticated session ──
//
// The signed-in identity plus its bearer token. Every data-access call
// takes a `&Session`; nothing in the crate holds one globally.

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::SecretString;
use senda_api::{AuthUser, TokenResponse};
use serde::Serialize;

/// Who is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserIdentity {
    pub id: String,
    pub email: Option<String>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

impl From<AuthUser> for UserIdentity {
    fn from(user: AuthUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            last_sign_in_at: user.last_sign_in_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserIdentity,
    access_token: SecretString,
    refresh_token: Option<SecretString>,
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(user: UserIdentity, access_token: SecretString) -> Self {
        Self {
            user,
            access_token,
            refresh_token: None,
            expires_at: None,
        }
    }

    /// Build from a token grant, resolving the expiry against `issued_at`.
    pub fn from_tokens(tokens: TokenResponse, issued_at: DateTime<Utc>) -> Self {
        let expires_at = tokens
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .or_else(|| issued_at.checked_add_signed(TimeDelta::seconds(tokens.expires_in)));
        Self {
            user: tokens.user.into(),
            access_token: tokens.access_token.into(),
            refresh_token: Some(tokens.refresh_token.into()),
            expires_at,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn email(&self) -> Option<&str> {
        self.user.email.as_deref()
    }

    pub fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    pub fn refresh_token(&self) -> Option<&SecretString> {
        self.refresh_token.as_ref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Whether the access token is past (or within `leeway` of) its expiry.
    pub fn is_expired(&self, now: DateTime<Utc>, leeway: TimeDelta) -> bool {
        self.expires_at.is_some_and(|at| now + leeway >= at)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeDelta, TimeZone, Utc};
    use secrecy::ExposeSecret;
    use senda_api::{AuthUser, TokenResponse};

    use super::Session;

    fn tokens(expires_at: Option<i64>) -> TokenResponse {
        TokenResponse {
            access_token: "jwt".into(),
            token_type: "bearer".into(),
            expires_in: 3600,
            expires_at,
            refresh_token: "refresh".into(),
            user: AuthUser {
                id: "u1".into(),
                email: Some("ana@example.com".into()),
                last_sign_in_at: None,
            },
        }
    }

    #[test]
    fn expiry_falls_back_to_expires_in() {
        let issued = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let session = Session::from_tokens(tokens(None), issued);

        assert_eq!(session.expires_at(), Some(issued + TimeDelta::hours(1)));
        assert_eq!(session.user_id(), "u1");
        assert_eq!(session.access_token().expose_secret(), "jwt");
        assert!(!session.is_expired(issued, TimeDelta::minutes(1)));
        assert!(session.is_expired(issued + TimeDelta::minutes(59), TimeDelta::minutes(1)));
    }

    #[test]
    fn absolute_expiry_wins() {
        let issued = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let at = issued.timestamp() + 60;
        let session = Session::from_tokens(tokens(Some(at)), issued);
        assert_eq!(session.expires_at().unwrap().timestamp(), at);
    }
}
