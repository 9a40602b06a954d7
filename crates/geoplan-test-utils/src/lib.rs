//! Shared test utilities for geoplan integration tests.
//!
//! Provides one PostgreSQL server shared by every test in a binary; each
//! test gets its own throwaway database on it.
//!
//! Two modes:
//! - **`GEOPLAN_TEST_PG_URL`** set: use that server directly (a CI service
//!   container or a local instance). The URL has no database name.
//! - **No env var**: start a container via testcontainers, shared per
//!   binary through a `OnceCell`.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use testcontainers::ContainerAsync;
use testcontainers::ImageExt;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use geoplan_db::pool;

struct SharedPg {
    base_url: String,
    /// Keeps the container alive. `None` when using an external server.
    _container: Option<ContainerAsync<Postgres>>,
}

static SHARED_PG: OnceCell<SharedPg> = OnceCell::const_new();

async fn init_shared_pg() -> SharedPg {
    if let Ok(url) = std::env::var("GEOPLAN_TEST_PG_URL") {
        return SharedPg {
            base_url: url.trim_end_matches('/').to_owned(),
            _container: None,
        };
    }

    let container = Postgres::default()
        .with_tag("16")
        .start()
        .await
        .expect("failed to start PostgreSQL container");

    let host = container.get_host().await.expect("failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("failed to get mapped port");

    SharedPg {
        base_url: format!("postgresql://postgres:postgres@{host}:{port}"),
        _container: Some(container),
    }
}

/// Base URL (no database name) of the shared PostgreSQL server.
pub async fn pg_url() -> &'static str {
    let shared = SHARED_PG.get_or_init(init_shared_pg).await;
    &shared.base_url
}

async fn maintenance_pool() -> PgPool {
    let maint_url = format!("{}/postgres", pg_url().await);
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&maint_url)
        .await
        .expect("failed to connect to maintenance database")
}

/// A migrated, uniquely named database. Call [`TestDb::cleanup`] at the
/// end of the test.
pub struct TestDb {
    pub pool: PgPool,
    pub name: String,
}

impl TestDb {
    /// Create a fresh database with all migrations applied.
    pub async fn create() -> Self {
        let name = format!("geoplan_test_{}", Uuid::new_v4().simple());

        let maint_pool = maintenance_pool().await;
        maint_pool
            .execute(format!("CREATE DATABASE {name}").as_str())
            .await
            .unwrap_or_else(|e| panic!("failed to create temp database {name}: {e}"));
        maint_pool.close().await;

        let url = format!("{}/{name}", pg_url().await);
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&url)
            .await
            .unwrap_or_else(|e| panic!("failed to connect to temp database {name}: {e}"));

        pool::run_migrations(&pool)
            .await
            .expect("migrations should succeed");

        Self { pool, name }
    }

    /// Connection URL of this database.
    pub async fn url(&self) -> String {
        format!("{}/{}", pg_url().await, self.name)
    }

    /// Close the pool and drop the database.
    pub async fn cleanup(self) {
        self.pool.close().await;
        drop_database(&self.name).await;
    }
}

/// Drop a database by name, terminating its connections first. Safe to
/// call for a database that no longer exists.
pub async fn drop_database(name: &str) {
    let maint_pool = maintenance_pool().await;

    let terminate = format!(
        "SELECT pg_terminate_backend(pid) \
         FROM pg_stat_activity \
         WHERE datname = '{name}' AND pid <> pg_backend_pid()"
    );
    let _ = maint_pool.execute(terminate.as_str()).await;

    let _ = maint_pool
        .execute(format!("DROP DATABASE IF EXISTS {name}").as_str())
        .await;
    maint_pool.close().await;
}
