use std::rc::Rc;

use anyhow::{anyhow, Context};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use futures_signals::signal::{Mutable, Signal};
use serde::Deserialize;

use crate::common::{Session, UserId};
use crate::storage::{TokenStorage, TOKEN_KEY};

const FALLBACK_NICKNAME: &str = "Пользователь";

/// Claims read from the access token payload. The signature is not verified
/// here, the backend does that on every request.
#[derive(Debug, Default, Deserialize)]
pub struct Claims {
    pub nick: Option<String>,
    pub sub: Option<String>,
    pub id: Option<UserId>,
    pub email: Option<String>,
    pub role: Option<i64>,
}

impl Claims {
    pub fn decode(token: &str) -> Result<Self, anyhow::Error> {
        let payload = token
            .split('.')
            .nth(1)
            .ok_or_else(|| anyhow!("invalid token: missing payload segment"))?;

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .context("invalid token: payload is not base64url")?;

        serde_json::from_slice(&bytes).context("invalid token: payload is not a json object")
    }

    fn into_session(self) -> Session {
        Session {
            nickname: self.nick.unwrap_or_else(|| FALLBACK_NICKNAME.to_string()),
            email: self.email.or_else(|| self.sub.clone()).unwrap_or_default(),
            user_id: self.id.or_else(|| self.sub.map(UserId::Text)),
            role: self.role,
            is_logged_in: true,
        }
    }
}

pub struct AuthStore {
    session: Mutable<Session>,
    storage: Rc<dyn TokenStorage>,
}

impl AuthStore {
    pub fn new(storage: Rc<dyn TokenStorage>) -> Rc<Self> {
        Rc::new(Self {
            session: Mutable::new(Session::default()),
            storage,
        })
    }

    pub fn init_auth_state(&self) {
        let token = match self.storage.get(TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                error!("error read token: {}", e);
                None
            }
        };

        let Some(token) = token else {
            self.reset_auth_state();
            return;
        };

        match Claims::decode(&token) {
            Ok(claims) => self.session.set(claims.into_session()),
            Err(e) => {
                error!("error decode token: {:#}", e);
                self.reset_auth_state();
            }
        }
    }

    /// Persists `token` only once it decodes; a malformed token leaves the
    /// store logged out.
    pub fn login(&self, token: &str) -> Result<(), anyhow::Error> {
        let claims = match Claims::decode(token) {
            Ok(claims) => claims,
            Err(e) => {
                error!("error decode token: {:#}", e);
                self.reset_auth_state();
                return Err(e);
            }
        };

        self.storage.set(TOKEN_KEY, token)?;
        self.session.set(claims.into_session());

        Ok(())
    }

    pub fn logout(&self) {
        if let Err(e) = self.storage.remove(TOKEN_KEY) {
            error!("error remove token: {}", e);
        }
        self.reset_auth_state();
    }

    pub fn reset_auth_state(&self) {
        self.session.set(Session::default());
    }

    pub fn session(&self) -> Session {
        self.session.get_cloned()
    }

    pub fn role(&self) -> Option<i64> {
        self.session.lock_ref().role
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.lock_ref().is_logged_in
    }

    pub fn session_signal(&self) -> impl Signal<Item = Session> + use<> {
        self.session.signal_cloned()
    }
}
