use std::{
    env,
    path::PathBuf,
    str::FromStr,
};
use log::LevelFilter;


const DEFAULT_HOST: &'static str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CREDENTIALS: &'static str = "firebase_key.json";
const DEFAULT_IMAGES_DIR: &'static str = "imagenes_reportes";
const DEFAULT_STATIC_DIR: &'static str = "static";


#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}


/// Which document store backs the report collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Firestore,
    Memory,
}

impl FromStr for StoreKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreKind::Firestore),
            "memory" => Ok(StoreKind::Memory),
            _ => Err(()),
        }
    }
}


/// Server configuration loaded from environment variables.
///
/// | Env Var                | Default              |
/// |------------------------|----------------------|
/// | `HOST`                 | `0.0.0.0`            |
/// | `PORT`                 | `8080`               |
/// | `FIREBASE_CREDENTIALS` | `firebase_key.json`  |
/// | `IMAGES_DIR`           | `imagenes_reportes`  |
/// | `STATIC_DIR`           | `static`             |
/// | `REPORT_STORE`         | `firestore`          |
/// | `LOG_LEVEL`            | `info`               |
/// | `SENTRY_DSN`           | unset                |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub credentials_path: PathBuf,
    pub images_dir: PathBuf,
    pub static_dir: PathBuf,
    pub store: StoreKind,
    pub log_level: LevelFilter,
    pub sentry_dsn: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError> where
        F: Fn(&str) -> Option<String> {

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.into());

        let port = match lookup("PORT") {
            Some(value) => value.trim().parse::<u16>()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let store = match lookup("REPORT_STORE") {
            Some(value) => value.parse::<StoreKind>()
                .map_err(|_| ConfigError::Invalid { name: "REPORT_STORE", value })?,
            None => StoreKind::Firestore,
        };

        let log_level = match lookup("LOG_LEVEL") {
            Some(value) => value.trim().parse::<LevelFilter>()
                .map_err(|_| ConfigError::Invalid { name: "LOG_LEVEL", value })?,
            None => LevelFilter::Info,
        };

        Ok(ServerConfig {
            host,
            port,
            credentials_path: lookup("FIREBASE_CREDENTIALS")
                .unwrap_or_else(|| DEFAULT_CREDENTIALS.into()).into(),
            images_dir: lookup("IMAGES_DIR")
                .unwrap_or_else(|| DEFAULT_IMAGES_DIR.into()).into(),
            static_dir: lookup("STATIC_DIR")
                .unwrap_or_else(|| DEFAULT_STATIC_DIR.into()).into(),
            store,
            log_level,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.trim().is_empty()),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars.iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect();

        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.credentials_path, PathBuf::from("firebase_key.json"));
        assert_eq!(config.images_dir, PathBuf::from("imagenes_reportes"));
        assert_eq!(config.store, StoreKind::Firestore);
        assert_eq!(config.log_level, LevelFilter::Info);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn port_and_store_are_read_from_env() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("REPORT_STORE", "Memory"),
            ("LOG_LEVEL", "debug"),
            ("SENTRY_DSN", "  "),
        ]).unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();

        assert_eq!(err.to_string(), "PORT has an invalid value: eighty");
    }
}
