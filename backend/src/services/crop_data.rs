//! Historical crop yield dataset: lookup, import and maintenance

use async_trait::async_trait;
use serde::Serialize;
use shared::prediction::normalize::{canonical_crop, prefilter_patterns};
use shared::validation::normalize_raw_row;
use shared::{DatasetStats, HistoricalRecord, RawCropRow};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::{AppError, AppResult};
use crate::services::prediction::HistoricalRecordStore;

/// Rows per INSERT statement; 16 binds each stays well under the
/// PostgreSQL parameter limit
const INSERT_BATCH_SIZE: usize = 1000;

/// Crop dataset service
#[derive(Clone)]
pub struct CropDataService {
    db: PgPool,
}

/// Stored historical record row
#[derive(Debug, Clone, sqlx::FromRow)]
struct CropYieldRow {
    crop: String,
    soil_type: Option<String>,
    region: Option<String>,
    state: Option<String>,
    district: Option<String>,
    season: Option<String>,
    rainfall: Option<f64>,
    annual_rainfall: Option<f64>,
    temperature: Option<f64>,
    humidity: Option<f64>,
    yield_kg_per_ha: f64,
    year: Option<i32>,
    area_hectares: Option<f64>,
    production: Option<f64>,
    fertilizer_used: Option<String>,
    pesticide: Option<f64>,
}

impl From<CropYieldRow> for HistoricalRecord {
    fn from(row: CropYieldRow) -> Self {
        Self {
            crop: row.crop,
            soil_type: row.soil_type,
            region: row.region,
            state: row.state,
            district: row.district,
            season: row.season,
            rainfall: row.rainfall,
            annual_rainfall: row.annual_rainfall,
            temperature: row.temperature,
            humidity: row.humidity,
            yield_kg_per_ha: row.yield_kg_per_ha,
            year: row.year,
            area_hectares: row.area_hectares,
            production: row.production,
            fertilizer_used: row.fertilizer_used,
            pesticide: row.pesticide,
        }
    }
}

/// Result of a CSV import
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ImportSummary {
    pub rows_read: usize,
    pub imported: usize,
    pub skipped: usize,
}

/// Records parsed from an upload, before insertion
#[derive(Debug, Default)]
pub struct ParsedImport {
    pub records: Vec<HistoricalRecord>,
    pub rows_read: usize,
    pub skipped: usize,
}

/// Parse a crop production CSV. Unreadable rows and rows without a crop or
/// positive yield are skipped; a missing header row is an error.
pub fn parse_csv(data: &[u8]) -> AppResult<ParsedImport> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| AppError::ValidationError(format!("Invalid CSV header: {}", e)))?;
    if headers.is_empty() {
        return Err(AppError::ValidationError("CSV body is empty".to_string()));
    }

    let mut parsed = ParsedImport::default();
    for (line, result) in reader.deserialize::<RawCropRow>().enumerate() {
        parsed.rows_read += 1;
        let record = match result {
            Ok(raw) => normalize_raw_row(&raw),
            Err(e) => {
                tracing::debug!("Skipping unreadable CSV row {}: {}", line + 2, e);
                None
            }
        };

        match record {
            Some(record) => parsed.records.push(record),
            None => parsed.skipped += 1,
        }
    }

    Ok(parsed)
}

impl CropDataService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Historical records whose crop could match `crop`
    pub async fn find_candidates(&self, crop: &str) -> AppResult<Vec<HistoricalRecord>> {
        let patterns = prefilter_patterns(crop);
        if patterns.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, CropYieldRow>(
            r#"
            SELECT crop, soil_type, region, state, district, season,
                   rainfall, annual_rainfall, temperature, humidity,
                   yield_kg_per_ha, year, area_hectares, production,
                   fertilizer_used, pesticide
            FROM crop_yield_data
            WHERE crop ILIKE ANY($1)
               OR $2 ILIKE '%' || btrim(crop) || '%'
            "#,
        )
        .bind(&patterns)
        .bind(canonical_crop(crop))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(HistoricalRecord::from).collect())
    }

    /// Import a CSV upload into the dataset
    pub async fn import_csv(&self, data: &[u8]) -> AppResult<ImportSummary> {
        let parsed = parse_csv(data)?;
        let imported = self.insert_records(&parsed.records).await?;

        tracing::info!(
            rows_read = parsed.rows_read,
            imported,
            skipped = parsed.skipped,
            "Crop data import completed"
        );

        Ok(ImportSummary {
            rows_read: parsed.rows_read,
            imported,
            skipped: parsed.skipped,
        })
    }

    /// Insert records in batches within one transaction
    pub async fn insert_records(&self, records: &[HistoricalRecord]) -> AppResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self.db.begin().await?;
        let mut inserted = 0usize;

        for chunk in records.chunks(INSERT_BATCH_SIZE) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO crop_yield_data (crop, soil_type, region, state, district, season, \
                 rainfall, annual_rainfall, temperature, humidity, yield_kg_per_ha, year, \
                 area_hectares, production, fertilizer_used, pesticide) ",
            );
            builder.push_values(chunk, |mut b, r| {
                b.push_bind(&r.crop)
                    .push_bind(&r.soil_type)
                    .push_bind(&r.region)
                    .push_bind(&r.state)
                    .push_bind(&r.district)
                    .push_bind(&r.season)
                    .push_bind(r.rainfall)
                    .push_bind(r.annual_rainfall)
                    .push_bind(r.temperature)
                    .push_bind(r.humidity)
                    .push_bind(r.yield_kg_per_ha)
                    .push_bind(r.year)
                    .push_bind(r.area_hectares)
                    .push_bind(r.production)
                    .push_bind(&r.fertilizer_used)
                    .push_bind(r.pesticide);
            });

            let result = builder.build().execute(&mut *tx).await?;
            inserted += result.rows_affected() as usize;
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Remove every historical record, returning how many were deleted
    pub async fn clear(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM crop_yield_data")
            .execute(&self.db)
            .await?;

        tracing::info!(deleted = result.rows_affected(), "Crop data cleared");
        Ok(result.rows_affected())
    }

    /// Record, state and crop counts
    pub async fn dataset_stats(&self) -> AppResult<DatasetStats> {
        let (total_records, unique_states, unique_crops) =
            sqlx::query_as::<_, (i64, i64, i64)>(
                r#"
                SELECT COUNT(*),
                       COUNT(DISTINCT state),
                       COUNT(DISTINCT crop)
                FROM crop_yield_data
                "#,
            )
            .fetch_one(&self.db)
            .await?;

        Ok(DatasetStats {
            total_records,
            unique_states,
            unique_crops,
        })
    }
}

#[async_trait]
impl HistoricalRecordStore for CropDataService {
    async fn fetch_records(&self, crop: &str) -> AppResult<Vec<HistoricalRecord>> {
        self.find_candidates(crop).await
    }
}
