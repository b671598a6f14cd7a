//! Input preparation for similarity scoring
//!
//! Historical rows and user queries arrive with inconsistent casing,
//! synonyms and missing values. Everything is canonicalized here so the
//! scorer only ever compares clean values.

use crate::models::{HistoricalRecord, PredictionQuery, Season};

/// Common crop names mapped onto the names used in the historical dataset
const CROP_ALIASES: &[(&str, &str)] = &[
    ("corn", "maize"),
    ("paddy", "rice"),
    ("tur", "arhar/tur"),
    ("arhar", "arhar/tur"),
    ("pigeon pea", "arhar/tur"),
    ("soybean", "soyabean"),
    ("chickpea", "gram"),
    ("sorghum", "jowar"),
    ("pearl millet", "bajra"),
    ("peanut", "groundnut"),
];

/// Tokens shorter than this never count as a shared crop word
const MIN_TOKEN_LEN: usize = 3;

/// Lowercase, trim and collapse inner whitespace
fn clean(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Cleaned value, or `None` when empty
pub fn normalize_text(raw: Option<&str>) -> Option<String> {
    raw.map(clean).filter(|s| !s.is_empty())
}

/// Canonical crop name: cleaned and alias-resolved
pub fn canonical_crop(raw: &str) -> String {
    let cleaned = clean(raw);
    CROP_ALIASES
        .iter()
        .find(|(alias, _)| *alias == cleaned)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or(cleaned)
}

/// Significant alphanumeric words of a canonical crop name
pub fn crop_tokens(canonical: &str) -> impl Iterator<Item = &str> {
    canonical
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= MIN_TOKEN_LEN)
}

/// Whether a canonical crop name belongs to a named crop class
pub fn crop_is(canonical: &str, name: &str) -> bool {
    canonical == name || crop_tokens(canonical).any(|t| t == name)
}

/// Fuzzy crop match between two canonical names
pub fn crops_match(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a.contains(b) || b.contains(a) {
        return true;
    }
    crop_tokens(a).any(|ta| crop_tokens(b).any(|tb| ta == tb))
}

/// `ILIKE` patterns covering every stored crop name that could fuzzy-match
/// the query crop, for narrowing the bulk read before scoring.
///
/// Stored names contained in the query itself are not covered here; the
/// store matches those with a reverse `LIKE`.
pub fn prefilter_patterns(query_crop: &str) -> Vec<String> {
    let canonical = canonical_crop(query_crop);
    if canonical.is_empty() {
        return Vec::new();
    }

    let mut terms: Vec<&str> = vec![canonical.as_str()];
    terms.extend(crop_tokens(&canonical));
    for &(alias, name) in CROP_ALIASES {
        if crops_match(name, &canonical) {
            terms.push(alias);
            terms.push(name);
        }
    }

    let mut patterns: Vec<String> = terms.into_iter().map(|t| format!("%{}%", t)).collect();
    patterns.sort();
    patterns.dedup();
    patterns
}

/// Query attributes in canonical form
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalQuery {
    pub crop: String,
    pub state: Option<String>,
    pub district: Option<String>,
    pub region: Option<String>,
    pub season: Option<Season>,
    pub rainfall: f64,
    pub temperature: f64,
    pub humidity: f64,
}

impl CanonicalQuery {
    pub fn from_query(query: &PredictionQuery) -> Self {
        Self {
            crop: canonical_crop(&query.crop),
            state: normalize_text(query.state.as_deref()),
            district: normalize_text(query.district.as_deref()),
            region: normalize_text(Some(&query.region)),
            season: Season::normalize(&query.season),
            rainfall: query.rainfall,
            temperature: query.temperature,
            humidity: query.humidity,
        }
    }
}

/// Historical record attributes in canonical form
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    pub crop: String,
    pub state: Option<String>,
    pub district: Option<String>,
    pub region: Option<String>,
    pub season: Option<Season>,
    pub rainfall: Option<f64>,
}

impl CanonicalRecord {
    pub fn from_record(record: &HistoricalRecord) -> Self {
        Self {
            crop: canonical_crop(&record.crop),
            state: normalize_text(record.state.as_deref()),
            district: normalize_text(record.district.as_deref()),
            region: normalize_text(record.region.as_deref()),
            season: record.season.as_deref().and_then(Season::normalize),
            rainfall: record.effective_rainfall().filter(|r| r.is_finite()),
        }
    }
}
