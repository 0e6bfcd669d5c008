use std::{env, path::PathBuf};

use dotenv::dotenv;

use crate::database::postgres::updater::UpdateTarget;

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("{0} must be provided, check your environment")]
    MissingKey(&'static str),

    #[error("POSTGRE_PORT is not a valid port number: {0}")]
    InvalidPort(String),
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

/// Everything a batch run needs, resolved from the environment once at
/// startup. Every required key is checked here before a connection is opened
/// or a row is read, so a missing key can never surface mid-batch.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,

    pub csv_path: PathBuf,
    pub set_column: String,
    pub where_column: String,

    pub target: UpdateTarget,

    pub log_query: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        dotenv().ok();

        let database = DatabaseSettings {
            host: required_env("POSTGRE_HOST")?,
            port: parse_port(required_env("POSTGRE_PORT")?)?,
            user: required_env("POSTGRE_UNAME")?,
            password: required_env("POSTGRE_PWD")?,
            database: required_env("POSTGRE_DB")?,
        };

        let target = UpdateTarget {
            table: required_env("TABLE_NAME")?,
            set_column: required_env("TABLE_SET_COLUMN")?,
            where_column: required_env("TABLE_WHERE_COLUMN")?,
        };

        Ok(Settings {
            database,
            csv_path: PathBuf::from(required_env("CSV_FILE_PATH")?),
            set_column: required_env("CSV_SET_COLUMN")?,
            where_column: required_env("CSV_WHERE_COLUMN")?,
            target,
            log_query: env::var("LOG_QUERY").map(|value| value == "true").unwrap_or(false),
        })
    }
}

fn required_env(key: &'static str) -> Result<String, SettingsError> {
    env::var(key).ok().filter(|value| !value.is_empty()).ok_or(SettingsError::MissingKey(key))
}

fn parse_port(raw: String) -> Result<u16, SettingsError> {
    raw.parse::<u16>().map_err(|_| SettingsError::InvalidPort(raw))
}
