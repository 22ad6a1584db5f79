use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use anyhow::anyhow;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool, Row,
};
use tracing::{error, info};

pub const TABLE_NAMES: [&str; 2] = ["patients", "medical_records"];

/// Calls `connect` until it succeeds or `num_attempts` calls have failed.
///
/// Sleeps `delay` between failed attempts, never after the last one. The
/// returned error carries the message of the last failure.
pub async fn connect_with_retries<T, E, F, Fut>(
    label: &str,
    num_attempts: u32,
    delay: Duration,
    mut connect: F,
) -> Result<T, anyhow::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempts = 0;
    let mut last_err: Option<String> = None;

    while attempts < num_attempts {
        info!("Attempt to connect to {} {} of {}", label, attempts + 1, num_attempts);
        match connect().await {
            Ok(connection) => {
                info!("{} connection successful \u{2705}", label);
                return Ok(connection);
            }
            Err(e) => {
                error!("Failed to connect to {}. Attempt {} of {}: {}", label, attempts + 1, num_attempts, e);
                last_err = Some(e.to_string());
            }
        }
        attempts += 1;
        if attempts < num_attempts {
            tokio::time::sleep(delay).await;
        }
    }

    Err(anyhow!(
        "Failed to connect to {} after {} attempts: {}",
        label,
        num_attempts,
        last_err.unwrap_or_else(|| "no attempts were made".to_string())
    ))
}

pub async fn get_pg_connection_pool(
    pg_options: &PgConnectOptions,
    num_attempts: u32,
    delay: Duration,
    acquire_timeout: Duration,
) -> Result<PgPool, anyhow::Error> {
    info!("Trying to establish a PostgreSQL connection pool");

    connect_with_retries("PostgreSQL", num_attempts, delay, || {
        PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(acquire_timeout)
            .connect_with(pg_options.clone())
    })
    .await
}

pub async fn pred_tables_exist(pg_con_pool: &PgPool, table_names: &[&str]) -> Result<bool, anyhow::Error> {
    info!("Checking whether PostgreSQL tables exist");

    let table_query: &str = r#"select table_name::text from information_schema.tables where table_schema = current_schema();"#;

    let rows = sqlx::query(table_query)
        .fetch_all(pg_con_pool)
        .await
        .map_err(|err| {
            error!("Failed to execute query: {}", err);
            anyhow::Error::new(err)
        })?;

    let pg_table_names: Vec<String> = rows.into_iter().map(|row| row.get(0)).collect();
    let all_tables_exist = table_names
        .iter()
        .all(|table_name| pg_table_names.iter().any(|name| name == table_name));

    Ok(all_tables_exist)
}

pub async fn create_tables(pg_con_pool: &PgPool) -> Result<(), anyhow::Error> {
    info!("Creating PostgreSQL tables");

    let create_tables_queries = [
        "CREATE TABLE IF NOT EXISTS patients (
            id SERIAL PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            dob TEXT NOT NULL,
            consent_status BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        "CREATE TABLE IF NOT EXISTS medical_records (
            id SERIAL PRIMARY KEY,
            patient_id INTEGER NOT NULL REFERENCES patients(id),
            record_type TEXT NOT NULL,
            record_content TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        "CREATE INDEX IF NOT EXISTS medical_records_patient_id_idx
            ON medical_records (patient_id)",
    ];

    for query in create_tables_queries {
        sqlx::query(query)
            .execute(pg_con_pool)
            .await?;
    }

    info!("Database tables are set up and ready \u{2705}");
    Ok(())
}

/// Creates the tables unless all of them are already present.
pub async fn init_db(pg_con_pool: &PgPool) -> Result<(), anyhow::Error> {
    if pred_tables_exist(pg_con_pool, &TABLE_NAMES).await? {
        info!("All tables found as expected");
        return Ok(());
    }
    create_tables(pg_con_pool).await
}
