use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub auth: AuthConfig,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    /// Maximum decoded image size in bytes
    pub max_upload_size: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding the redb database file
    pub data_dir: String,
    /// Upload root; each asset category gets its own subdirectory
    pub upload_dir: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign bearer tokens
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    /// Administrator account created at startup when missing
    pub seed_admin: Option<SeedAdmin>,
}

#[derive(Debug, Clone)]
pub struct SeedAdmin {
    pub email: String,
    pub password: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            upload_dir: "./public/uploads".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let cors_allowed_origins: Vec<String> = std::env::var("CORS_ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());
        let upload_dir =
            std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./public/uploads".to_string());

        let max_upload_size = std::env::var("MAX_UPLOAD_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10 * 1024 * 1024); // 10MB

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_default();
        let token_ttl_hours = std::env::var("TOKEN_TTL_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(24);

        let seed_admin = match (
            std::env::var("ADMIN_EMAIL").ok(),
            std::env::var("ADMIN_PASSWORD").ok(),
        ) {
            (Some(email), Some(password)) => Some(SeedAdmin { email, password }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::ValidationError(
                    "ADMIN_EMAIL and ADMIN_PASSWORD must be set together".to_string(),
                ))
            }
        };

        let config = Config {
            auth: AuthConfig {
                jwt_secret,
                token_ttl_hours,
                seed_admin,
            },
            server: ServerConfig {
                bind_address,
                cors_allowed_origins,
            },
            storage: StorageConfig {
                data_dir,
                upload_dir,
            },
            max_upload_size,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "JWT_SECRET is required".to_string(),
            ));
        }

        if self.auth.token_ttl_hours <= 0 {
            return Err(ConfigError::ValidationError(
                "TOKEN_TTL_HOURS must be greater than 0".to_string(),
            ));
        }

        if let Some(ref seed) = self.auth.seed_admin {
            if seed.email.trim().is_empty() || seed.password.is_empty() {
                return Err(ConfigError::ValidationError(
                    "ADMIN_EMAIL and ADMIN_PASSWORD must not be empty".to_string(),
                ));
            }
        }

        if self.max_upload_size == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_UPLOAD_SIZE must be greater than 0".to_string(),
            ));
        }

        if self.auth.jwt_secret.len() < 32 {
            tracing::warn!(
                "JWT_SECRET is shorter than 32 bytes. Consider using a longer random secret."
            );
        }

        Ok(())
    }

    /// Largest JSON request body accepted: a base64 image of `max_upload_size`
    /// bytes plus room for the remaining fields.
    pub fn max_body_size(&self) -> usize {
        (self.max_upload_size as usize / 3 + 1) * 4 + 64 * 1024
    }
}
