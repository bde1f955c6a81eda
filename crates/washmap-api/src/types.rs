//! Wire types for the car-wash service JSON API.
//!
//! These model the exact response bodies the Django backend emits. Optional
//! fields carry `#[serde(default)]` because the service omits keys rather
//! than sending `null` in several places.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scope a recommendation was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    County,
    Circle,
    Polygon,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::County => write!(f, "county"),
            SourceType::Circle => write!(f, "circle"),
            SourceType::Polygon => write!(f, "polygon"),
        }
    }
}

// ---------------------------------------------------------------------------
// nearest / nearby
// ---------------------------------------------------------------------------

/// `GET /api/nearest/` — `location` is absent when the database holds no
/// car washes at all.
#[derive(Debug, Deserialize)]
pub struct NearestResponse {
    #[serde(default)]
    pub location: Option<CarwashSummary>,
    #[serde(default)]
    pub distance: Option<f64>,
}

/// Flat car-wash record embedded in the nearest-lookup response.
#[derive(Debug, Clone, Deserialize)]
pub struct CarwashSummary {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

/// `GET /api/nearby/` — up to ten car washes ordered by distance.
#[derive(Debug, Deserialize)]
pub struct NearbyResponse {
    pub carwashes: Vec<NearbyCarwash>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NearbyCarwash {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub distance_km: f64,
}

// ---------------------------------------------------------------------------
// county wash counts
// ---------------------------------------------------------------------------

/// `GET /api/county_wash_counts/`.
#[derive(Debug, Deserialize)]
pub struct WashCountsResponse {
    pub counts: Vec<CountyWashCount>,
}

/// Per-county aggregate. The deployed service keys these on `name`; older
/// payloads used `name_en`, so both spellings deserialize.
#[derive(Debug, Clone, Deserialize)]
pub struct CountyWashCount {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(alias = "name_en")]
    pub name: String,
    pub wash_count: i64,
}

// ---------------------------------------------------------------------------
// recommendations
// ---------------------------------------------------------------------------

/// A server-computed candidate site. Circle and county requests return a
/// ranked list of these; the polygon request returns a single bare object
/// (no envelope).
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationCandidate {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub population: Option<i64>,
    #[serde(default)]
    pub min_distance_to_carwash_km: Option<f64>,
    #[serde(default)]
    pub nearby_settlements: Option<i64>,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<RecommendationCandidate>,
}

/// Tuning knobs shared by all three recommendation scopes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendParams {
    pub min_distance_km: f64,
    pub max_settlement_distance_km: f64,
}

/// `POST /api/recommendations/save/` request body.
#[derive(Debug, Clone, Serialize)]
pub struct SaveRecommendationRequest {
    pub lat: f64,
    pub lng: f64,
    pub source_type: SourceType,
    pub reason: String,
}

/// A persisted recommendation as returned by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct SavedRecommendation {
    #[serde(default)]
    pub id: Option<i64>,
    pub lat: f64,
    pub lng: f64,
    pub source_type: SourceType,
    #[serde(default)]
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SavedRecommendationsResponse {
    pub recommendations: Vec<SavedRecommendation>,
}

// ---------------------------------------------------------------------------
// weather / competition
// ---------------------------------------------------------------------------

/// `GET /api/weather/` — the advisory shown when a user selects a car wash.
/// `good_for_wash` is computed server-side and rendered verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct Weather {
    pub temp: f64,
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
    pub good_for_wash: bool,
}

/// Coarse competitor-density classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum SaturationLevel {
    #[serde(alias = "low", alias = "Low")]
    Low,
    #[serde(alias = "medium", alias = "Medium")]
    Medium,
    #[serde(alias = "high", alias = "High")]
    High,
}

/// `GET /api/competition/` — market-saturation analysis around a point.
#[derive(Debug, Clone, Deserialize)]
pub struct Competition {
    pub competitor_count: i64,
    pub saturation_level: SaturationLevel,
    pub radius_km: f64,
}

// ---------------------------------------------------------------------------
// auth
// ---------------------------------------------------------------------------

/// `POST /api/mobile_login/` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<UserInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}
