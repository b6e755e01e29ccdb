use crate::{
    auth::{Identity, Principal},
    config::identity::IdentityConfig,
    error::{
        ReadSessionFileSnafu, RmpSerdeDecodeSnafu, RmpSerdeEncodeSnafu, RosterResult,
        WriteSessionFileSnafu,
    },
};
use async_trait::async_trait;
use jiff::Timestamp;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use std::{io::ErrorKind, path::PathBuf};
use url::Url;

/// The external identity provider, as seen from this app.
///
/// Interactive login happens in the browser: we hand out [`IdentityProvider::login_url`]
/// and the provider redirects back with a delegation, which is then [`IdentityProvider::store`]d.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn login_url(&self, callback: &Url, nonce: &str) -> Url;

    /// Looks for an existing session, returning it only if it is still valid.
    async fn restore(&mut self) -> RosterResult<Option<Identity>>;

    async fn store(&mut self, identity: &Identity) -> RosterResult<()>;

    async fn logout(&mut self) -> RosterResult<()>;

    fn identity(&self) -> Option<&Identity>;

    fn is_authenticated(&self) -> bool {
        self.identity().is_some_and(|identity| !identity.is_expired())
    }
}

/// On-disk shape of a delegation. `SecretString` can't be serialised, so the
/// token is only exposed for the duration of the write.
#[derive(Serialize, Deserialize)]
struct StoredDelegation {
    principal: String,
    delegation: String,
    expires_at: Timestamp,
}

impl From<StoredDelegation> for Identity {
    fn from(stored: StoredDelegation) -> Self {
        Self {
            principal: Principal::new(stored.principal),
            delegation: SecretString::from(stored.delegation),
            expires_at: stored.expires_at,
        }
    }
}

/// Internet Identity style provider: browser redirect for login, delegation
/// kept in a local session file between runs.
pub struct InternetIdentityProvider {
    endpoint: Url,
    session_file: PathBuf,
    current: Option<Identity>,
}

impl InternetIdentityProvider {
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            endpoint: config.endpoint().clone(),
            session_file: config.session_file().to_path_buf(),
            current: None,
        }
    }
}

#[async_trait]
impl IdentityProvider for InternetIdentityProvider {
    fn login_url(&self, callback: &Url, nonce: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("callback", callback.as_str())
            .append_pair("state", nonce);
        url
    }

    async fn restore(&mut self) -> RosterResult<Option<Identity>> {
        let bytes = match tokio::fs::read(&self.session_file).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(source).context(ReadSessionFileSnafu {
                    path: self.session_file.clone(),
                });
            }
        };

        let identity: Identity = rmp_serde::from_slice::<StoredDelegation>(&bytes)
            .context(RmpSerdeDecodeSnafu)?
            .into();

        if identity.is_expired() {
            info!(principal = %identity.principal, expired_at = %identity.expires_at, "Stored delegation has expired");
            self.current = None;
            return Ok(None);
        }

        self.current = Some(identity.clone());
        Ok(Some(identity))
    }

    async fn store(&mut self, identity: &Identity) -> RosterResult<()> {
        self.current = Some(identity.clone());

        let stored = StoredDelegation {
            principal: identity.principal.to_string(),
            delegation: identity.delegation.expose_secret().to_string(),
            expires_at: identity.expires_at,
        };
        let serialised = rmp_serde::to_vec(&stored).context(RmpSerdeEncodeSnafu)?;

        tokio::fs::write(&self.session_file, serialised)
            .await
            .context(WriteSessionFileSnafu {
                path: self.session_file.clone(),
            })
    }

    async fn logout(&mut self) -> RosterResult<()> {
        self.current = None;

        match tokio::fs::remove_file(&self.session_file).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e).context(WriteSessionFileSnafu {
                path: self.session_file.clone(),
            }),
            _ => Ok(()),
        }
    }

    fn identity(&self) -> Option<&Identity> {
        self.current.as_ref()
    }
}
