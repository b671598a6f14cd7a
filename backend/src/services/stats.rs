//! Model description and prediction usage statistics

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{summarize_recent, ModelInfo, UsageStats};
use sqlx::PgPool;

use crate::error::AppResult;

/// Number of recent predictions used for the average and crop distribution
const RECENT_WINDOW: i64 = 100;

#[derive(Clone)]
pub struct StatsService {
    db: PgPool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct ModelStatsRow {
    model_name: String,
    r2_score: f64,
    mae: f64,
    rmse: f64,
    training_samples: i64,
    last_trained: DateTime<Utc>,
    is_active: bool,
}

impl From<ModelStatsRow> for ModelInfo {
    fn from(row: ModelStatsRow) -> Self {
        Self {
            name: row.model_name,
            r2_score: row.r2_score,
            mae: row.mae,
            rmse: row.rmse,
            training_samples: row.training_samples,
            last_trained: row.last_trained,
            is_active: row.is_active,
        }
    }
}

/// Dashboard payload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStatsReport {
    pub model_info: ModelInfo,
    pub usage_stats: UsageStats,
}

impl StatsService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn report(&self) -> AppResult<ModelStatsReport> {
        Ok(ModelStatsReport {
            model_info: self.active_model().await?,
            usage_stats: self.usage().await?,
        })
    }

    /// Most recently trained active model, or the built-in description
    pub async fn active_model(&self) -> AppResult<ModelInfo> {
        let row = sqlx::query_as::<_, ModelStatsRow>(
            r#"
            SELECT model_name, r2_score, mae, rmse, training_samples, last_trained, is_active
            FROM model_stats
            WHERE is_active = TRUE
            ORDER BY last_trained DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.db)
        .await?;

        Ok(row
            .map(ModelInfo::from)
            .unwrap_or_else(|| ModelInfo::builtin(Utc::now())))
    }

    /// Prediction counts across all users
    pub async fn usage(&self) -> AppResult<UsageStats> {
        let (total_predictions, today_predictions, month_predictions, unique_users) =
            sqlx::query_as::<_, (i64, i64, i64, i64)>(
                r#"
                SELECT COUNT(*),
                       COUNT(*) FILTER (WHERE created_at >= date_trunc('day', NOW())),
                       COUNT(*) FILTER (WHERE created_at >= date_trunc('month', NOW())),
                       COUNT(DISTINCT user_id)
                FROM predictions
                "#,
            )
            .fetch_one(&self.db)
            .await?;

        let recent = sqlx::query_as::<_, (String, i64)>(
            "SELECT crop, predicted_yield FROM predictions ORDER BY created_at DESC LIMIT $1",
        )
        .bind(RECENT_WINDOW)
        .fetch_all(&self.db)
        .await?;

        let (avg_yield, crop_distribution) = summarize_recent(&recent);

        Ok(UsageStats {
            total_predictions,
            today_predictions,
            month_predictions,
            avg_yield,
            unique_users,
            crop_distribution,
        })
    }
}
