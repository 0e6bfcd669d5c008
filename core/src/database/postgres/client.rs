use std::time::Duration;

use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio::{task, time::timeout};
pub use tokio_postgres::types::{ToSql, Type as PgType};
use tokio_postgres::{config::SslMode, Client, Config, Error as PgError, Statement, ToStatement};
use tracing::{debug, error};

use crate::settings::DatabaseSettings;

#[derive(thiserror::Error, Debug)]
pub enum PostgresConnectionError {
    #[error("Can not connect to the database please make sure your connection details are correct")]
    CanNotConnectToDatabase,

    #[error("Could not create tls connector")]
    CouldNotCreateTlsConnector,
}

#[derive(thiserror::Error, Debug)]
pub enum PostgresError {
    #[error("PgError {0}")]
    PgError(#[from] PgError),
}

/// A single exclusively-held connection. The batch runs one statement at a
/// time, so there is no pool; dropping the client closes the connection on
/// every exit path.
pub struct PostgresClient {
    client: Client,
    _connection: task::JoinHandle<()>,
}

impl PostgresClient {
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, PostgresConnectionError> {
        async fn _connect(
            settings: &DatabaseSettings,
            disable_ssl: bool,
        ) -> Result<PostgresClient, PostgresConnectionError> {
            let mut config = Config::new();
            config
                .host(&settings.host)
                .port(settings.port)
                .user(&settings.user)
                .password(&settings.password)
                .dbname(&settings.database);

            if disable_ssl {
                config.ssl_mode(SslMode::Disable);
            }

            let connector = TlsConnector::builder()
                .build()
                .map_err(|_| PostgresConnectionError::CouldNotCreateTlsConnector)?;
            let tls_connector = MakeTlsConnector::new(connector);

            let (client, connection) =
                match timeout(Duration::from_millis(5000), config.connect(tls_connector)).await {
                    Ok(Ok((client, connection))) => (client, connection),
                    Ok(Err(e)) => {
                        // retry without ssl if ssl has been attempted and failed
                        if !disable_ssl && config.get_ssl_mode() != SslMode::Disable {
                            return Box::pin(_connect(settings, true)).await;
                        }
                        error!("Error connecting to database: {}", e);
                        return Err(PostgresConnectionError::CanNotConnectToDatabase);
                    }
                    Err(e) => {
                        error!("Timeout connecting to database: {}", e);
                        return Err(PostgresConnectionError::CanNotConnectToDatabase);
                    }
                };

            // The connection future drives all traffic for the client and has
            // to be polled for the lifetime of the run.
            let connection_handle = task::spawn(async move {
                if let Err(e) = connection.await {
                    error!("Database connection error: {}", e);
                }
            });

            // Perform a simple query to check the connection
            match client.query_one("SELECT 1", &[]).await {
                Ok(_) => {}
                Err(_) => return Err(PostgresConnectionError::CanNotConnectToDatabase),
            };

            debug!("Connected to {} on {}:{}", settings.database, settings.host, settings.port);

            Ok(PostgresClient { client, _connection: connection_handle })
        }

        _connect(settings, false).await
    }

    pub async fn prepare(
        &self,
        query: &str,
        parameter_types: &[PgType],
    ) -> Result<Statement, PostgresError> {
        self.client.prepare_typed(query, parameter_types).await.map_err(PostgresError::PgError)
    }

    pub async fn execute<T>(
        &self,
        query: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, PostgresError>
    where
        T: ?Sized + ToStatement,
    {
        self.client.execute(query, params).await.map_err(PostgresError::PgError)
    }
}
