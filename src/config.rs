// src/config.rs
//
// Typed configuration loaded once at startup. Handlers never read the
// environment directly; everything they need hangs off AppState.
use std::env;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to (HOST, default 127.0.0.1)
    pub host: String,
    /// Port to bind to (PORT, default 3000)
    pub port: u16,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL (DATABASE_URL, required)
    pub url: String,
    /// Pool size (DATABASE_MAX_CONNECTIONS, default 10)
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HS256 signing secret (JWT_SECRET, required)
    pub secret: String,
    /// Token lifetime in hours (JWT_EXPIRATION_HOURS, default 24)
    pub expiration_hours: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env_parsed("PORT", 3000)?;

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL")
                .map_err(|_| AppError::internal("DATABASE_URL must be set"))?,
            max_connections: env_parsed("DATABASE_MAX_CONNECTIONS", 10)?,
        };

        let jwt = JwtConfig {
            secret: env::var("JWT_SECRET")
                .map_err(|_| AppError::internal("JWT_SECRET must be set"))?,
            expiration_hours: env_parsed("JWT_EXPIRATION_HOURS", 24)?,
        };

        Ok(Config {
            host,
            port,
            database,
            jwt,
        })
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::internal(format!("{name} has an invalid value: {raw}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parsed_falls_back_to_default() {
        let port: u16 = env_parsed("NO_SUCH_VARIABLE_SET_ANYWHERE", 3000).unwrap();
        assert_eq!(port, 3000);
    }

    #[test]
    fn env_parsed_rejects_garbage() {
        std::env::set_var("CONFIG_TEST_BAD_PORT", "not-a-number");
        let result: Result<u16, _> = env_parsed("CONFIG_TEST_BAD_PORT", 3000);
        assert!(result.is_err());
        std::env::remove_var("CONFIG_TEST_BAD_PORT");
    }
}
