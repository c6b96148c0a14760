use crate::{Result, TestInfraError};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;
use std::time::Duration;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::ImageExt;
use testcontainers::{ContainerAsync, GenericImage};
use typed_builder::TypedBuilder;

const MYSQL_PORT: u16 = 3306;

#[derive(Debug, Clone, TypedBuilder)]
pub struct MysqlConfig {
    #[builder(default = "8.4".to_string(), setter(into))]
    tag: String,
    #[builder(default = "pinhole".to_string(), setter(into))]
    database: String,
    #[builder(default = "pinhole".to_string(), setter(into))]
    username: String,
    #[builder(default = "pinhole".to_string(), setter(into))]
    password: String,
    /// Connection attempts made by [`MySqlServer::connect`].
    #[builder(default = 20)]
    connect_attempts: usize,
    #[builder(default = Duration::from_millis(500))]
    connect_backoff: Duration,
}

/// A disposable MySQL server for integration tests.
///
/// The container is stopped and removed when the value is dropped.
pub struct MySqlServer {
    container: ContainerAsync<GenericImage>,
    config: MysqlConfig,
}

impl MySqlServer {
    pub async fn new(config: MysqlConfig) -> Result<Self> {
        let container = GenericImage::new("mysql", config.tag.as_str())
            .with_exposed_port(MYSQL_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stderr("ready for connections"))
            .with_env_var("MYSQL_DATABASE", config.database.as_str())
            .with_env_var("MYSQL_USER", config.username.as_str())
            .with_env_var("MYSQL_PASSWORD", config.password.as_str())
            .with_env_var("MYSQL_ROOT_PASSWORD", "root")
            .start()
            .await?;

        Ok(Self { container, config })
    }

    /// Returns a DSN usable with `sqlx::MySqlPool::connect`.
    pub async fn database_url(&self) -> Result<String> {
        let host = self.container.get_host().await?;
        let port = self.container.get_host_port_ipv4(MYSQL_PORT).await?;
        Ok(format!(
            "mysql://{}:{}@{}:{}/{}",
            self.config.username, self.config.password, host, port, self.config.database
        ))
    }

    /// Opens a pool, retrying while the server is still starting up.
    ///
    /// MySQL logs "ready for connections" once for the temporary init server
    /// and again for the real one, so the first attempts may be refused.
    pub async fn connect(&self) -> Result<MySqlPool> {
        let url = self.database_url().await?;
        let mut attempts = 0;

        loop {
            attempts += 1;
            match MySqlPoolOptions::new().max_connections(5).connect(&url).await {
                Ok(pool) => return Ok(pool),
                Err(err) if attempts >= self.config.connect_attempts => {
                    return Err(TestInfraError::Connect { attempts, source: err });
                }
                Err(_) => tokio::time::sleep(self.config.connect_backoff).await,
            }
        }
    }

    /// Connects and runs `ddl` as a single statement.
    pub async fn connect_with_schema(&self, ddl: &str) -> Result<MySqlPool> {
        let pool = self.connect().await?;
        sqlx::query(ddl).execute(&pool).await?;
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = MysqlConfig::builder().build();

        assert_eq!(config.tag, "8.4");
        assert_eq!(config.database, "pinhole");
        assert_eq!(config.connect_attempts, 20);
    }
}
