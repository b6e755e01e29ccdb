use crate::error::{BadEnvVarSnafu, ParseUrlSnafu, RosterResult};
use dotenvy::var;
use snafu::ResultExt;
use std::path::{Path, PathBuf};
use url::Url;

const PRODUCTION_PROVIDER: &str = "https://identity.ic0.app/#authorize";
const LOCAL_REPLICA: &str = "http://localhost:4943/";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeploymentEnvironment {
    Production,
    Local,
}

impl DeploymentEnvironment {
    /// `ic` is what dfx calls mainnet; anything unrecognised is treated as a local replica.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
            Some("ic" | "production" | "prod") => Self::Production,
            _ => Self::Local,
        }
    }
}

#[derive(Debug)]
pub struct IdentityConfig {
    environment: DeploymentEnvironment,
    endpoint: Url,
    session_file: PathBuf,
}

impl IdentityConfig {
    pub fn new() -> RosterResult<Self> {
        let environment = DeploymentEnvironment::from_env_value(
            var("ROSTER_ENVIRONMENT")
                .or_else(|_| var("DFX_NETWORK"))
                .ok()
                .as_deref(),
        );
        let override_url = var("IDENTITY_PROVIDER_URL").ok();
        let canister_id = if environment == DeploymentEnvironment::Local && override_url.is_none() {
            Some(
                var("INTERNET_IDENTITY_CANISTER_ID").context(BadEnvVarSnafu {
                    name: "INTERNET_IDENTITY_CANISTER_ID",
                })?,
            )
        } else {
            None
        };
        let session_file = var("ROSTER_SESSION_FILE")
            .map_or_else(|_| PathBuf::from("roster_session.bin"), PathBuf::from);

        Self::for_environment(
            environment,
            override_url.as_deref(),
            canister_id.as_deref(),
            session_file,
        )
    }

    /// Picks the provider endpoint: an explicit override wins, otherwise production
    /// uses the public provider and local uses the replica with the given canister.
    pub fn for_environment(
        environment: DeploymentEnvironment,
        override_url: Option<&str>,
        canister_id: Option<&str>,
        session_file: PathBuf,
    ) -> RosterResult<Self> {
        let endpoint = match (override_url, environment) {
            (Some(url), _) => Url::parse(url).context(ParseUrlSnafu { original: url })?,
            (None, DeploymentEnvironment::Production) => {
                Url::parse(PRODUCTION_PROVIDER).context(ParseUrlSnafu {
                    original: PRODUCTION_PROVIDER,
                })?
            }
            (None, DeploymentEnvironment::Local) => {
                let mut url = Url::parse(LOCAL_REPLICA).context(ParseUrlSnafu {
                    original: LOCAL_REPLICA,
                })?;
                if let Some(canister_id) = canister_id {
                    url.query_pairs_mut().append_pair("canisterId", canister_id);
                }
                url
            }
        };

        Ok(Self {
            environment,
            endpoint,
            session_file,
        })
    }

    pub const fn environment(&self) -> DeploymentEnvironment {
        self.environment
    }

    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn session_file(&self) -> &Path {
        &self.session_file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_names() {
        assert_eq!(
            DeploymentEnvironment::from_env_value(Some("ic")),
            DeploymentEnvironment::Production
        );
        assert_eq!(
            DeploymentEnvironment::from_env_value(Some(" Production ")),
            DeploymentEnvironment::Production
        );
        assert_eq!(
            DeploymentEnvironment::from_env_value(Some("local")),
            DeploymentEnvironment::Local
        );
        assert_eq!(
            DeploymentEnvironment::from_env_value(None),
            DeploymentEnvironment::Local
        );
    }

    #[test]
    fn production_uses_public_provider() {
        let config = IdentityConfig::for_environment(
            DeploymentEnvironment::Production,
            None,
            Some("ignored"),
            "s.bin".into(),
        )
        .unwrap();
        assert_eq!(config.endpoint().host_str(), Some("identity.ic0.app"));
        assert!(config.endpoint().query().is_none());
    }

    #[test]
    fn local_points_at_replica_canister() {
        let config = IdentityConfig::for_environment(
            DeploymentEnvironment::Local,
            None,
            Some("be2us-64aaa-aaaaa-qaabq-cai"),
            "s.bin".into(),
        )
        .unwrap();
        assert_eq!(
            config.endpoint().as_str(),
            "http://localhost:4943/?canisterId=be2us-64aaa-aaaaa-qaabq-cai"
        );
    }

    #[test]
    fn override_wins_and_must_parse() {
        let config = IdentityConfig::for_environment(
            DeploymentEnvironment::Local,
            Some("https://login.example.org/authorize"),
            None,
            "s.bin".into(),
        )
        .unwrap();
        assert_eq!(config.endpoint().host_str(), Some("login.example.org"));

        assert!(
            IdentityConfig::for_environment(
                DeploymentEnvironment::Production,
                Some("not a url"),
                None,
                "s.bin".into(),
            )
            .is_err()
        );
    }
}
