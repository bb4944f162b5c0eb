use std::{env, net::IpAddr, time::Duration};

use jsonwebtoken::Algorithm;
use log::*;
use payfast_tools::PayfastConfig;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use sf_common::{helpers::parse_env_or, parse_boolean_flag, Secret};

use crate::errors::ServerError;

const DEFAULT_SF_HOST: &str = "127.0.0.1";
const DEFAULT_SF_PORT: u16 = 8000;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/storefront.db";
const DEFAULT_ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 30;
const DEFAULT_CATALOG_CACHE_TTL: u64 = 300;
const DEFAULT_STOCK_SWEEP_INTERVAL: u64 = 60;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
    /// If supplied, payment notifications are only accepted from these addresses.
    pub payfast_whitelist: Option<Vec<IpAddr>>,
    /// How long products stay in the in-memory catalog cache.
    pub catalog_cache_ttl: Duration,
    /// How often the stock worker sweeps for stock deductions that were not applied by the event hook.
    pub stock_sweep_interval: Duration,
    pub payfast: PayfastConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SF_HOST.to_string(),
            port: DEFAULT_SF_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            auth: AuthConfig::default(),
            use_x_forwarded_for: false,
            use_forwarded: false,
            payfast_whitelist: None,
            catalog_cache_ttl: Duration::from_secs(DEFAULT_CATALOG_CACHE_TTL),
            stock_sweep_interval: Duration::from_secs(DEFAULT_STOCK_SWEEP_INTERVAL),
            payfast: PayfastConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SF_HOST").ok().unwrap_or_else(|| DEFAULT_SF_HOST.into());
        let port = env::var("SF_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for SF_PORT. {e} Using the default, {DEFAULT_SF_PORT}, instead.");
                    DEFAULT_SF_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SF_PORT);
        let database_url = env::var("SF_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ SF_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let use_x_forwarded_for = parse_boolean_flag(env::var("SF_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("SF_USE_FORWARDED").ok(), false);
        let payfast_whitelist = configure_whitelist();
        let (ttl, _) = parse_env_or("SF_CATALOG_CACHE_TTL_SECS", DEFAULT_CATALOG_CACHE_TTL);
        let (sweep, _) = parse_env_or("SF_STOCK_SWEEP_INTERVAL_SECS", DEFAULT_STOCK_SWEEP_INTERVAL);
        let payfast = PayfastConfig::new_from_env_or_default();
        Self {
            host,
            port,
            database_url,
            auth,
            use_x_forwarded_for,
            use_forwarded,
            payfast_whitelist,
            catalog_cache_ttl: Duration::from_secs(ttl),
            stock_sweep_interval: Duration::from_secs(sweep.max(1)),
            payfast,
        }
    }
}

fn configure_whitelist() -> Option<Vec<IpAddr>> {
    let whitelist = env::var("SF_PAYFAST_IP_WHITELIST").ok().and_then(|s| {
        if ["none", "false", "0", ""].contains(&s.trim().to_lowercase().as_str()) {
            info!(
                "🪛️ The payment notification IP whitelist is disabled. If this is not what you want, set \
                 SF_PAYFAST_IP_WHITELIST to a comma-separated list of IP addresses to enable it."
            );
            return None;
        }
        let ip_addrs = s
            .split(',')
            .filter_map(|s| {
                s.trim()
                    .parse()
                    .map_err(|e| warn!("🪛️ Ignoring invalid IP address ({s}) in SF_PAYFAST_IP_WHITELIST: {e}"))
                    .ok()
            })
            .collect::<Vec<IpAddr>>();
        Some(ip_addrs)
    });
    match &whitelist {
        Some(whitelist) if whitelist.is_empty() => {
            warn!(
                "🚨️ The payment notification IP whitelist was configured, but is empty. The server will run, but won't \
                 accept any payment notifications."
            );
        },
        None => {
            info!("🪛️ No payment notification IP whitelist is set. Only signatures and gateway validation are checked.");
        },
        Some(v) => {
            let addrs = v.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ");
            info!("🪛️ Payment notification IP whitelist: {addrs}");
        },
    }
    whitelist
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The shared secret used to sign and verify access tokens.
    pub jwt_secret: Secret<String>,
    pub jwt_algorithm: Algorithm,
    pub access_token_expiry: chrono::Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. Tokens issued \
             elsewhere will not be accepted, and tokens do not survive a restart. DO NOT operate in production like \
             this. 🚨️🚨️🚨️"
        );
        let secret: String = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect();
        Self {
            jwt_secret: Secret::new(secret),
            jwt_algorithm: Algorithm::HS256,
            access_token_expiry: chrono::Duration::minutes(DEFAULT_ACCESS_TOKEN_EXPIRY_MINUTES),
        }
    }
}

impl AuthConfig {
    pub fn new<S: Into<String>>(secret: S) -> Self {
        Self {
            jwt_secret: Secret::new(secret.into()),
            jwt_algorithm: Algorithm::HS256,
            access_token_expiry: chrono::Duration::minutes(DEFAULT_ACCESS_TOKEN_EXPIRY_MINUTES),
        }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("SF_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [SF_JWT_SECRET]")))?;
        if secret.trim().is_empty() {
            return Err(ServerError::ConfigurationError("SF_JWT_SECRET is empty".into()));
        }
        let jwt_algorithm = match env::var("SF_JWT_ALGORITHM").map(|s| s.to_uppercase()) {
            Ok(s) if s == "HS256" => Algorithm::HS256,
            Ok(s) if s == "HS384" => Algorithm::HS384,
            Ok(s) if s == "HS512" => Algorithm::HS512,
            Ok(s) => {
                return Err(ServerError::ConfigurationError(format!(
                    "Unsupported JWT algorithm in SF_JWT_ALGORITHM: {s}. Use one of HS256, HS384 or HS512"
                )))
            },
            Err(_) => {
                info!("🪛️ SF_JWT_ALGORITHM is not set. Using HS256");
                Algorithm::HS256
            },
        };
        let (minutes, _) = parse_env_or("SF_ACCESS_TOKEN_EXPIRE_MINUTES", DEFAULT_ACCESS_TOKEN_EXPIRY_MINUTES);
        Ok(Self {
            jwt_secret: Secret::new(secret),
            jwt_algorithm,
            access_token_expiry: chrono::Duration::minutes(minutes),
        })
    }
}

//-------------------------------------------------  ProxyConfig  ------------------------------------------------------
/// A subset of the server configuration that handlers need in order to identify the remote peer. It deliberately
/// excludes secrets.
#[derive(Clone, Debug, Default)]
pub struct ProxyConfig {
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
    pub payfast_whitelist: Option<Vec<IpAddr>>,
}

impl ProxyConfig {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            use_x_forwarded_for: config.use_x_forwarded_for,
            use_forwarded: config.use_forwarded,
            payfast_whitelist: config.payfast_whitelist.clone(),
        }
    }
}
