// public
pub mod batch;

mod database;
pub use database::postgres::{
    client::{PostgresClient, PostgresConnectionError, PostgresError, ToSql},
    updater::{PostgresUpdater, UpdateTarget},
};

mod logger;
pub use logger::{setup_info_logger, setup_logger};

mod settings;
pub use settings::{DatabaseSettings, Settings, SettingsError};

// export 3rd party dependencies
pub use async_trait::async_trait;
pub use tracing::{error as csvpatch_error, info as csvpatch_info};
