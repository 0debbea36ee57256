use std::fmt;
use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

/// Which [`Store`](locker_core::store::Store) implementation backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown store backend '{other}'")),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Postgres => "postgres",
            Self::Memory => "memory",
        })
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the JWT
/// secret and, for the Postgres backend, `DATABASE_URL`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Time allowed for background tasks to drain after shutdown begins.
    pub shutdown_timeout_secs: u64,
    pub store_backend: StoreBackend,
    /// Required when `store_backend` is Postgres.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    /// Origin of the public registration page, used for share links.
    pub public_base_url: String,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
    /// | `STORE_BACKEND`         | `postgres`              |
    /// | `DATABASE_URL`          | --                      |
    /// | `DB_MAX_CONNECTIONS`    | `20`                    |
    /// | `PUBLIC_BASE_URL`       | `http://localhost:5173` |
    ///
    /// # Panics
    ///
    /// Panics on unparsable values, and when the Postgres backend is
    /// selected without `DATABASE_URL`.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let store_backend: StoreBackend = std::env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".into())
            .parse()
            .unwrap_or_else(|e| panic!("STORE_BACKEND is invalid: {e}"));

        let database_url = std::env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Postgres {
            assert!(
                database_url.is_some(),
                "DATABASE_URL must be set when STORE_BACKEND=postgres"
            );
        }

        let db_max_connections: u32 = std::env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| locker_db::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse()
            .expect("DB_MAX_CONNECTIONS must be a valid u32");

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .trim_end_matches('/')
            .to_string();

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            store_backend,
            database_url,
            db_max_connections,
            public_base_url,
            jwt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_backend_parses_case_insensitively() {
        assert_eq!("Memory".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert_eq!(
            "postgresql".parse::<StoreBackend>(),
            Ok(StoreBackend::Postgres)
        );
        assert!("sqlite".parse::<StoreBackend>().is_err());
    }
}
