use crate::{
    config::identity::IdentityConfig,
    error::{ParseAddressSnafu, ParseFlagSnafu, ParseUrlSnafu, RosterResult},
};
use dotenvy::var;
use snafu::ResultExt;
use std::{net::SocketAddr, sync::Arc};
use url::Url;

pub mod identity;

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    server_address: SocketAddr,
    public_url: Url,
    identity_config: Arc<IdentityConfig>,
    directory_url: Option<Url>,
    clear_on_sign_out: bool,
}

impl RuntimeConfiguration {
    pub fn new() -> RosterResult<Self> {
        let server_ip = var("ROSTER_SERVER_IP").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let server_address = server_ip
            .parse()
            .context(ParseAddressSnafu { original: &server_ip })?;

        let public_url =
            var("ROSTER_PUBLIC_URL").unwrap_or_else(|_| format!("http://{server_address}/"));
        let public_url = Url::parse(&public_url).context(ParseUrlSnafu {
            original: &public_url,
        })?;

        let directory_url = match var("ROSTER_DIRECTORY_URL") {
            Ok(url) => Some(Url::parse(&url).context(ParseUrlSnafu { original: &url })?),
            Err(_) => None,
        };

        let clear_on_sign_out = match var("CLEAR_ON_SIGN_OUT") {
            Ok(flag) => parse_flag("CLEAR_ON_SIGN_OUT", &flag)?,
            Err(_) => false,
        };

        Ok(Self {
            server_address,
            public_url,
            identity_config: Arc::new(IdentityConfig::new()?),
            directory_url,
            clear_on_sign_out,
        })
    }

    /// Local setup pointing the identity provider at `provider`, with students in memory.
    #[cfg(test)]
    pub fn for_tests(server_address: SocketAddr, provider: &str) -> RosterResult<Self> {
        use crate::config::identity::DeploymentEnvironment;

        Ok(Self {
            server_address,
            public_url: Url::parse(&format!("http://{server_address}/")).context(
                ParseUrlSnafu {
                    original: server_address.to_string(),
                },
            )?,
            identity_config: Arc::new(IdentityConfig::for_environment(
                DeploymentEnvironment::Local,
                Some(provider),
                None,
                "roster_session.bin".into(),
            )?),
            directory_url: None,
            clear_on_sign_out: false,
        })
    }

    pub const fn server_address(&self) -> SocketAddr {
        self.server_address
    }

    /// Where the identity provider should send the browser back to.
    pub fn callback_url(&self) -> RosterResult<Url> {
        self.public_url
            .join("auth/callback")
            .context(ParseUrlSnafu {
                original: self.public_url.as_str(),
            })
    }

    pub fn identity_config(&self) -> Arc<IdentityConfig> {
        self.identity_config.clone()
    }

    pub const fn directory_url(&self) -> Option<&Url> {
        self.directory_url.as_ref()
    }

    pub const fn clear_on_sign_out(&self) -> bool {
        self.clear_on_sign_out
    }
}

fn parse_flag(name: &'static str, value: &str) -> RosterResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => ParseFlagSnafu {
            name,
            original: value,
        }
        .fail(),
    }
}
