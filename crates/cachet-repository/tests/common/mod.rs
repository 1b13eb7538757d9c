//! Common test infrastructure for database integration tests.

use cachet_config::DatabaseConfig;
use cachet_repository::{DatabasePool, DatabasePoolInterface};
use std::sync::Arc;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::postgres::Postgres;

/// PostgreSQL testcontainer with a ready `users` table.
pub struct TestDatabase {
    _container: ContainerAsync<Postgres>,
    pool: Arc<DatabasePool>,
}

impl TestDatabase {
    pub async fn new() -> Self {
        let container = Postgres::default()
            .start()
            .await
            .expect("Failed to start PostgreSQL container");

        let port = container
            .get_host_port_ipv4(5432)
            .await
            .expect("Failed to get PostgreSQL port");

        let config = DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port,
            user: "postgres".to_string(),
            password: Some("postgres".to_string()),
            database: "postgres".to_string(),
            ssl_mode: "disable".to_string(),
            max_connections: 5,
            ..DatabaseConfig::default()
        };

        let pool = Self::connect_with_retry(&config, 30).await;

        sqlx::query(
            "CREATE TABLE users (id SERIAL PRIMARY KEY, name TEXT NOT NULL, email TEXT NOT NULL)",
        )
        .execute(pool.inner())
        .await
        .expect("Failed to create users table");

        Self {
            _container: container,
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> Arc<DatabasePool> {
        Arc::clone(&self.pool)
    }

    async fn connect_with_retry(config: &DatabaseConfig, max_attempts: u32) -> DatabasePool {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match DatabasePool::connect(config).await {
                Ok(pool) => return pool,
                Err(e) if attempts < max_attempts => {
                    eprintln!("Waiting for PostgreSQL (attempt {attempts}): {e}");
                    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                }
                Err(e) => panic!("Failed to connect after {max_attempts} attempts: {e}"),
            }
        }
    }
}
