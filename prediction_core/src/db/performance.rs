//! Postgres-backed model performance repository.
//!
//! Reads the `model_performance` table written by the grading job (one row
//! per model per graded slate: how close the model's predictions came to
//! the actual box scores).

use crate::models::ModelPerformance;
use crate::weights::PerformanceRepository;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::debug;

/// [`PerformanceRepository`] over a shared Postgres pool.
pub struct PgPerformanceRepository {
    pool: PgPool,
}

impl PgPerformanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PerformanceRepository for PgPerformanceRepository {
    async fn fetch_performance_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<ModelPerformance>> {
        debug!("Fetching model performance since {since}");

        let rows = sqlx::query(
            r#"
            SELECT model_name, date, accuracy
            FROM model_performance
            WHERE date >= $1
            ORDER BY date DESC
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        let records = rows
            .into_iter()
            .map(|row| {
                Ok(ModelPerformance {
                    model_name: row.try_get("model_name")?,
                    date: row.try_get("date")?,
                    accuracy: row.try_get("accuracy")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Fetched {} performance records", records.len());
        Ok(records)
    }
}
