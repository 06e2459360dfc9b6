use serde::Deserialize;

use medgate_core::config::Config;

/// Records service configuration, read from the environment.
#[derive(Debug, Deserialize)]
pub struct RecordsConfig {
    /// PostgreSQL connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// TCP port to listen on. Env var: `RECORDS_PORT`.
    #[serde(default = "default_port")]
    pub records_port: u16,
    /// Directory holding uploaded reports and external prescriptions. Env var: `UPLOAD_DIR`.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Largest accepted request body for uploads, in bytes. Env var: `MAX_UPLOAD_BYTES`.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_port() -> u16 {
    3120
}

fn default_upload_dir() -> String {
    "uploads".to_owned()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl Config for RecordsConfig {}
