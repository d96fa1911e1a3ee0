use std::env;
use std::net::SocketAddr;

/// Minimum length of the token signing secret, in bytes.
const MIN_SECRET_LEN: usize = 32;

#[derive(Clone)]
pub struct Config {
    // Session tokens
    pub session_secret: String,
    pub token_issuer: String,
    pub session_ttl_secs: u64,
    pub secure_cookies: bool,

    // Redis
    pub redis_url: String,

    // Server
    pub bind_addr: SocketAddr,

    // Rate limiting
    pub rate_limit_login_per_min: u32,

    // Provisioning
    pub seed_demo_identities: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("session_secret", &"[REDACTED]")
            .field("token_issuer", &self.token_issuer)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("secure_cookies", &self.secure_cookies)
            .field("redis_url", &"[REDACTED]")
            .field("bind_addr", &self.bind_addr)
            .field("rate_limit_login_per_min", &self.rate_limit_login_per_min)
            .field("seed_demo_identities", &self.seed_demo_identities)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("Failed to parse {0}: {1}")]
    ParseError(String, String),
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // .env is optional; production sets variables directly
        let _ = dotenvy::dotenv();

        let session_secret = env::var("SESSION_SECRET")
            .map_err(|_| ConfigError::MissingVar("SESSION_SECRET".to_string()))?;

        if session_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::InvalidValue(
                "SESSION_SECRET".to_string(),
                format!("must be at least {} bytes", MIN_SECRET_LEN),
            ));
        }

        let token_issuer = env::var("TOKEN_ISSUER").unwrap_or_else(|_| "hireboard".to_string());
        if token_issuer.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "TOKEN_ISSUER".to_string(),
                "cannot be empty".to_string(),
            ));
        }

        // 30 days
        let session_ttl_secs = parse_env_or_default("SESSION_TTL_SECS", 2_592_000)?;
        if session_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_TTL_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let secure_cookies = parse_env_or_default("SECURE_COOKIES", true)?;

        // Redis is required; there is no in-process identity store
        let redis_url =
            env::var("REDIS_URL").map_err(|_| ConfigError::MissingVar("REDIS_URL".to_string()))?;

        let bind_addr_str = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_addr = bind_addr_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::ParseError("BIND_ADDR".to_string(), e.to_string()))?;

        let rate_limit_login_per_min = parse_env_or_default("RATE_LIMIT_LOGIN_PER_MIN", 5)?;

        let seed_demo_identities = parse_env_or_default("SEED_DEMO_IDENTITIES", false)?;

        Ok(Config {
            session_secret,
            token_issuer,
            session_ttl_secs,
            secure_cookies,
            redis_url,
            bind_addr,
            rate_limit_login_per_min,
            seed_demo_identities,
        })
    }
}

/// Helper function to parse environment variable with a default value
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| ConfigError::ParseError(key.to_string(), format!("{}: {}", e, val))),
        Err(_) => Ok(default),
    }
}
