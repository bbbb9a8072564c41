// ── Backend facade ──
//
// One HTTP client shared by the auth and REST surfaces. Signing in yields
// an explicit `Session`; data calls go through `DataAccess`.

use std::sync::Arc;

use chrono::Utc;
use senda_api::{AuthClient, RestClient};
use tracing::{debug, info};

use crate::access::DataAccess;
use crate::config::{BackendConfig, Credentials};
use crate::error::CoreError;
use crate::session::{Session, UserIdentity};

struct Inner {
    config: BackendConfig,
    auth: AuthClient,
    data: DataAccess,
}

/// Entry point to the hosted backend. Cheap to clone.
#[derive(Clone)]
pub struct Backend {
    inner: Arc<Inner>,
}

impl Backend {
    pub fn new(config: BackendConfig) -> Result<Self, CoreError> {
        let transport = config.transport();
        let http = transport.build_client_with_api_key(&config.anon_key)?;
        let auth = AuthClient::with_client(http.clone(), config.url.as_str())?;
        let rest = RestClient::with_client(http, config.url.as_str())?;
        debug!(url = %config.url, "backend clients ready");

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                auth,
                data: DataAccess::new(rest),
            }),
        })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.inner.config
    }

    pub fn data(&self) -> &DataAccess {
        &self.inner.data
    }

    // ── Session lifecycle ────────────────────────────────────────────

    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Session, CoreError> {
        let tokens = self
            .inner
            .auth
            .sign_in_with_password(&credentials.email, &credentials.password)
            .await
            .map_err(|e| self.timeout_aware(e))?;
        let session = Session::from_tokens(tokens, Utc::now());
        info!(user = session.user_id(), "signed in");
        Ok(session)
    }

    /// Exchange the session's refresh token for a fresh session.
    pub async fn refresh(&self, session: &Session) -> Result<Session, CoreError> {
        let refresh_token = session.refresh_token().ok_or(CoreError::SessionExpired)?;
        let tokens = self
            .inner
            .auth
            .refresh(refresh_token)
            .await
            .map_err(|e| self.timeout_aware(e))?;
        Ok(Session::from_tokens(tokens, Utc::now()))
    }

    /// The identity the backend associates with the session's token.
    pub async fn whoami(&self, session: &Session) -> Result<UserIdentity, CoreError> {
        let user = self
            .inner
            .auth
            .user(session.access_token())
            .await
            .map_err(|e| self.timeout_aware(e))?;
        Ok(user.into())
    }

    /// Revoke the session's tokens.
    pub async fn sign_out(&self, session: &Session) -> Result<(), CoreError> {
        self.inner
            .auth
            .sign_out(session.access_token())
            .await
            .map_err(|e| self.timeout_aware(e))?;
        info!(user = session.user_id(), "signed out");
        Ok(())
    }

    /// Fill in the configured timeout, which the transport error lacks.
    pub fn timeout_aware(&self, err: senda_api::Error) -> CoreError {
        match CoreError::from(err) {
            CoreError::Timeout { .. } => CoreError::Timeout {
                timeout_secs: self.inner.config.timeout.as_secs(),
            },
            other => other,
        }
    }
}
