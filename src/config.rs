// src/config.rs
use crate::error::{AppError, AppResult};
use std::net::SocketAddr;

/// Tamanho mínimo aceite pelo `Key` que assina o cookie de sessão.
pub const MIN_SECRET_LEN: usize = 64;

/// Configuração lida das variáveis de ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    pub bind_addr: SocketAddr,
    pub secure_cookie: bool,
    pub session_inactivity_days: i64,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Constrói a configuração a partir de uma função de consulta arbitrária.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| AppError::ConfigError("DATABASE_URL não definida".into()))?;

        let session_secret = lookup("SESSION_SECRET")
            .ok_or_else(|| AppError::ConfigError("SESSION_SECRET não definida".into()))?;
        if session_secret.len() < MIN_SECRET_LEN {
            return Err(AppError::ConfigError(format!(
                "SESSION_SECRET deve ter pelo menos {} bytes",
                MIN_SECRET_LEN
            )));
        }

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::ConfigError(format!("BIND_ADDR inválido: {}", e)))?;

        let secure_cookie = match lookup("SESSION_SECURE_COOKIE").as_deref() {
            None | Some("") => false,
            Some(v) => v
                .parse::<bool>()
                .map_err(|e| AppError::ConfigError(format!("SESSION_SECURE_COOKIE inválido: {}", e)))?,
        };

        let session_inactivity_days = match lookup("SESSION_INACTIVITY_DAYS") {
            None => 1,
            Some(v) => v
                .parse::<i64>()
                .ok()
                .filter(|days| *days > 0)
                .ok_or_else(|| AppError::ConfigError(format!("SESSION_INACTIVITY_DAYS inválido: {}", v)))?,
        };

        Ok(Config {
            database_url,
            session_secret,
            bind_addr,
            secure_cookie,
            session_inactivity_days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn secret() -> String {
        "s".repeat(MIN_SECRET_LEN)
    }

    #[test]
    fn applies_defaults() {
        let secret = secret();
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("SESSION_SECRET", &secret),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse().unwrap());
        assert!(!config.secure_cookie);
        assert_eq!(config.session_inactivity_days, 1);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let secret = secret();
        let result = Config::from_lookup(lookup_from(&[("SESSION_SECRET", &secret)]));
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn short_secret_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("SESSION_SECRET", "curta"),
        ]));
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn parses_overrides() {
        let secret = secret();
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite://academico.db"),
            ("SESSION_SECRET", &secret),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("SESSION_SECURE_COOKIE", "true"),
            ("SESSION_INACTIVITY_DAYS", "7"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert!(config.secure_cookie);
        assert_eq!(config.session_inactivity_days, 7);
    }

    #[test]
    fn rejects_non_positive_inactivity() {
        let secret = secret();
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("SESSION_SECRET", &secret),
            ("SESSION_INACTIVITY_DAYS", "0"),
        ]));
        assert!(result.is_err());
    }
}
