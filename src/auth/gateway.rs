use crate::{
    auth::{Identity, Principal, provider::IdentityProvider},
    error::RosterResult,
};
use jiff::Timestamp;
use rand::{Rng, distr::Alphanumeric, rng};
use secrecy::SecretString;
use serde::Deserialize;
use tokio::sync::watch;
use url::Url;

/// What the identity provider sends back to `/auth/callback`.
#[derive(Deserialize, Debug)]
pub struct SignInCallback {
    pub state: String,
    pub principal: String,
    pub delegation: SecretString,
    /// unix seconds
    pub expiration: i64,
}

/// Sign-in/sign-out against the identity provider.
///
/// Every identity change is published on the caller slot, which is how the
/// directory client gets rebound.
pub struct SessionGateway {
    provider: Box<dyn IdentityProvider>,
    pending_nonce: Option<String>,
    caller: watch::Sender<Option<Identity>>,
}

impl SessionGateway {
    pub fn new(provider: Box<dyn IdentityProvider>) -> Self {
        let (caller, _rx) = watch::channel(None);
        Self {
            provider,
            pending_nonce: None,
            caller,
        }
    }

    /// A handle on the current caller, for the directory client.
    pub fn caller_slot(&self) -> watch::Receiver<Option<Identity>> {
        self.caller.subscribe()
    }

    /// False once the delegation has expired, even before anyone signs out.
    pub fn is_authenticated(&self) -> bool {
        self.provider.is_authenticated()
    }

    pub fn principal(&self) -> Option<Principal> {
        self.provider
            .identity()
            .map(|identity| identity.principal.clone())
    }

    /// Startup check for an existing session. Any provider failure counts as
    /// "no session".
    pub async fn restore_session(&mut self) -> Option<Principal> {
        match self.provider.restore().await {
            Ok(Some(identity)) => {
                info!(principal = %identity.principal, "Restored existing session");
                Some(self.bind(identity))
            }
            Ok(None) => {
                debug!("No existing session to restore");
                None
            }
            Err(e) => {
                warn!(?e, "Unable to restore session, staying signed out");
                None
            }
        }
    }

    /// First half of the interactive sign in: remember a fresh nonce and
    /// return where the browser needs to go.
    pub fn begin_sign_in(&mut self, callback: &Url) -> Url {
        let nonce: String = rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let url = self.provider.login_url(callback, &nonce);
        self.pending_nonce = Some(nonce);
        url
    }

    /// Second half: the provider came back. Returns `None` (and changes
    /// nothing) unless the callback answers our pending attempt with a live
    /// delegation.
    pub async fn complete_sign_in(&mut self, callback: SignInCallback) -> Option<Principal> {
        if self.pending_nonce.as_deref() != Some(callback.state.as_str()) {
            warn!("Sign in callback did not match a pending attempt, ignoring");
            return None;
        }

        let expires_at = match Timestamp::from_second(callback.expiration) {
            Ok(ts) => ts,
            Err(e) => {
                warn!(?e, "Sign in callback had an unusable expiration");
                return None;
            }
        };
        let identity = Identity {
            principal: Principal::new(callback.principal),
            delegation: callback.delegation,
            expires_at,
        };
        if identity.is_expired() {
            warn!(principal = %identity.principal, "Provider handed back an expired delegation");
            return None;
        }

        self.pending_nonce = None;
        if let Err(e) = self.provider.store(&identity).await {
            warn!(?e, "Unable to persist session, it will not survive a restart");
        }

        info!(principal = %identity.principal, "Signed in");
        Some(self.bind(identity))
    }

    pub async fn sign_out(&mut self) -> RosterResult<()> {
        self.pending_nonce = None;
        self.caller.send_replace(None);
        info!("Signed out");
        self.provider.logout().await
    }

    fn bind(&self, identity: Identity) -> Principal {
        let principal = identity.principal.clone();
        self.caller.send_replace(Some(identity));
        principal
    }
}
