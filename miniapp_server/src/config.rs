use std::env;

use log::*;
use mas_common::Secret;
use rand::{distributions::Alphanumeric, Rng};

use crate::errors::ServerError;

const DEFAULT_MAS_HOST: &str = "127.0.0.1";
const DEFAULT_MAS_PORT: u16 = 8480;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    pub init_data: InitDataPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MAS_HOST.to_string(),
            port: DEFAULT_MAS_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            init_data: InitDataPolicy::fail_closed(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("MAS_HOST").ok().unwrap_or_else(|| DEFAULT_MAS_HOST.into());
        let port = env::var("MAS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for MAS_PORT. {e} Using the default, {DEFAULT_MAS_PORT}, instead."
                    );
                    DEFAULT_MAS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_MAS_PORT);
        let database_url = env::var("MAS_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ MAS_DATABASE_URL is not set. Please set it to the URL for the server database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the token signing configuration from environment variables. {e}. Reverting to \
                 the default configuration."
            );
            AuthConfig::default()
        });
        let init_data = InitDataPolicy::from_env_or_default();
        Self { host, port, database_url, auth, init_data }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------

/// Token signing configuration. The secret is symmetric (HS256), so the same value both signs
/// and verifies access tokens.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ MAS_JWT_SECRET has not been set. I'm using a random value for this session. Every token dies \
             with the process. DO NOT operate on production like this. 🚨️🚨️🚨️"
        );
        Self { jwt_secret: Secret::new(random_secret()) }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret = env::var("MAS_JWT_SECRET")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [MAS_JWT_SECRET]")))?;
        if secret.len() < 32 {
            warn!("🪛️ MAS_JWT_SECRET is shorter than 32 characters. Use a longer secret.");
        }
        Ok(Self { jwt_secret: Secret::new(secret) })
    }
}

//-----------------------------------------------  InitDataPolicy  -----------------------------------------------------

/// How the server treats the signature on incoming launch data.
///
/// This is an explicit two-state policy rather than an "is the bot token empty?" check, so that a
/// deployment can never end up with verification silently disabled by a missing variable.
#[derive(Clone, Debug)]
pub enum InitDataPolicy {
    /// Verify every payload against the bot token. The only production mode.
    Enforced(Secret<String>),
    /// Skip signature checks entirely and accept unsigned payloads. Only reachable by setting
    /// `MAS_DISABLE_INITDATA_CHECKS=1` while `MAS_BOT_TOKEN` is unset.
    DisabledForTesting,
}

impl InitDataPolicy {
    pub fn from_env_or_default() -> Self {
        let bot_token = env::var("MAS_BOT_TOKEN").ok().filter(|s| !s.is_empty());
        let disable = env::var("MAS_DISABLE_INITDATA_CHECKS")
            .map(|s| &s == "1" || &s == "true")
            .unwrap_or(false);
        match (bot_token, disable) {
            (Some(token), disable) => {
                if disable {
                    error!(
                        "🪛️ MAS_DISABLE_INITDATA_CHECKS is set, but MAS_BOT_TOKEN is configured. Ignoring the \
                         flag; launch data checks remain enforced."
                    );
                }
                Self::Enforced(Secret::new(token))
            },
            (None, true) => {
                warn!(
                    "🚨️ Launch data signature checks are DISABLED. Anyone can authenticate as anyone. Never run \
                     production like this."
                );
                Self::DisabledForTesting
            },
            (None, false) => {
                error!(
                    "🪛️ MAS_BOT_TOKEN is not set. Every authentication attempt will be rejected. Set \
                     MAS_BOT_TOKEN, or MAS_DISABLE_INITDATA_CHECKS=1 for local testing."
                );
                Self::fail_closed()
            },
        }
    }

    /// An enforcing policy with an unguessable token: verification stays on, nothing can pass it.
    fn fail_closed() -> Self {
        Self::Enforced(Secret::new(random_secret()))
    }

    pub fn is_enforced(&self) -> bool {
        matches!(self, Self::Enforced(_))
    }
}

fn random_secret() -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect()
}
