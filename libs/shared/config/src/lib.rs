use std::env;
use tracing::warn;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_IMPORT_ROWS: usize = 20_000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub max_import_rows: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = match env::var("APP_PORT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("APP_PORT is not a valid port number, using {}", DEFAULT_PORT);
                DEFAULT_PORT
            }),
            Err(_) => DEFAULT_PORT,
        };

        let max_import_rows = match env::var("APP_MAX_IMPORT_ROWS") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(
                    "APP_MAX_IMPORT_ROWS is not a valid number, using {}",
                    DEFAULT_MAX_IMPORT_ROWS
                );
                DEFAULT_MAX_IMPORT_ROWS
            }),
            Err(_) => DEFAULT_MAX_IMPORT_ROWS,
        };

        Self {
            port,
            max_import_rows,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_import_rows: DEFAULT_MAX_IMPORT_ROWS,
        }
    }
}
