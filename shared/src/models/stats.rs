//! Model and usage statistics

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Description of the prediction model shown on the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    pub r2_score: f64,
    pub mae: f64,
    pub rmse: f64,
    pub training_samples: i64,
    pub last_trained: DateTime<Utc>,
    pub is_active: bool,
}

impl ModelInfo {
    /// Description used when no model has been registered yet
    pub fn builtin(now: DateTime<Utc>) -> Self {
        Self {
            name: "Random Forest Regressor".to_string(),
            r2_score: 0.89,
            mae: 245.5,
            rmse: 312.8,
            training_samples: 50,
            last_trained: now,
            is_active: true,
        }
    }
}

/// Aggregate prediction usage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub total_predictions: i64,
    pub today_predictions: i64,
    pub month_predictions: i64,
    /// Mean predicted yield over the most recent predictions
    pub avg_yield: i64,
    pub unique_users: i64,
    pub crop_distribution: HashMap<String, i64>,
}

/// Summary of the historical dataset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetStats {
    pub total_records: i64,
    pub unique_states: i64,
    pub unique_crops: i64,
}

/// Average yield and crop counts over a window of recent predictions
pub fn summarize_recent(recent: &[(String, i64)]) -> (i64, HashMap<String, i64>) {
    let mut distribution = HashMap::new();
    if recent.is_empty() {
        return (0, distribution);
    }

    let total: i64 = recent.iter().map(|(_, y)| *y).sum();
    for (crop, _) in recent {
        *distribution.entry(crop.clone()).or_insert(0) += 1;
    }

    let avg = (total as f64 / recent.len() as f64).round() as i64;
    (avg, distribution)
}
