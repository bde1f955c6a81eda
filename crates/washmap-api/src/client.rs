//! HTTP client for the car-wash service API.
//!
//! Wraps `reqwest` with service-specific error handling, CSRF cookie/header
//! pairing, and typed response deserialization. Non-success responses that
//! carry an explicit `{"error": ...}` body surface as [`ApiError::Api`] with
//! the server's message verbatim; anything else non-2xx becomes
//! [`ApiError::UnexpectedStatus`].
//!
//! There is deliberately no retry, cancellation, or de-duplication here:
//! every call is a single attempt whose failure is reported once.

use std::sync::Arc;
use std::time::Duration;

use geojson::{FeatureCollection, Geometry, Value as GeoValue};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use washmap_core::LatLng;

use crate::error::ApiError;
use crate::features::{
    carwashes_from_collection, counties_from_collection, CarwashFeature, CountyFeature,
};
use crate::types::{
    Competition, CountyWashCount, LoginResponse, NearbyCarwash, NearbyResponse, NearestResponse,
    RecommendParams, RecommendationCandidate, RecommendationsResponse, SaveRecommendationRequest,
    SavedRecommendation, SavedRecommendationsResponse, WashCountsResponse, Weather,
};

/// Client for the car-wash service REST + GeoJSON API.
///
/// Holds the HTTP client, the normalised base URL, the cookie jar the
/// `csrftoken` cookie lives in, and the optional mobile-style auth token.
/// Point `base_url` at a mock server in tests.
pub struct WashmapClient {
    client: Client,
    base_url: Url,
    jar: Arc<Jar>,
    auth_token: Option<String>,
}

impl WashmapClient {
    /// Creates a client for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`ApiError::Api`] if `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ApiError> {
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .cookie_provider(Arc::clone(&jar))
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // Url::join treats it as a directory rather than replacing the last
        // path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| ApiError::Api(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            base_url,
            jar,
            auth_token: None,
        })
    }

    /// Attaches (or clears) the bearer-style token obtained from
    /// [`WashmapClient::login`]. Sent as `Authorization: Token <t>` on every
    /// subsequent request.
    pub fn set_auth_token(&mut self, token: Option<String>) {
        self.auth_token = token;
    }

    #[must_use]
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    // -----------------------------------------------------------------------
    // GeoJSON layers
    // -----------------------------------------------------------------------

    /// Fetches every car-wash point feature.
    ///
    /// # Errors
    ///
    /// [`ApiError::Http`], [`ApiError::UnexpectedStatus`], or
    /// [`ApiError::Deserialize`] if the body is not a feature collection.
    pub async fn fetch_carwashes(&self) -> Result<Vec<CarwashFeature>, ApiError> {
        let collection = self.get_feature_collection("carwashes.geojson").await?;
        Ok(carwashes_from_collection(&collection))
    }

    /// Fetches the county boundary polygons (authenticated, business mode).
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`WashmapClient::fetch_carwashes`].
    pub async fn fetch_counties(&self) -> Result<Vec<CountyFeature>, ApiError> {
        let collection = self.get_feature_collection("counties.geojson").await?;
        Ok(counties_from_collection(&collection))
    }

    /// Fetches the per-county wash-count aggregation for the choropleth.
    ///
    /// # Errors
    ///
    /// [`ApiError::Http`], [`ApiError::UnexpectedStatus`], [`ApiError::Api`],
    /// or [`ApiError::Deserialize`].
    pub async fn fetch_wash_counts(&self) -> Result<Vec<CountyWashCount>, ApiError> {
        let url = self.build_url("api/county_wash_counts/", &[])?;
        let body = self.get_json(url, "county_wash_counts").await?;
        let parsed: WashCountsResponse = parse(body, "county_wash_counts")?;
        Ok(parsed.counts)
    }

    // -----------------------------------------------------------------------
    // user-mode lookups
    // -----------------------------------------------------------------------

    /// Nearest single car wash to a point. `location` is `None` when the
    /// database is empty.
    ///
    /// # Errors
    ///
    /// [`ApiError::Http`], [`ApiError::UnexpectedStatus`], [`ApiError::Api`],
    /// or [`ApiError::Deserialize`].
    pub async fn nearest(&self, point: LatLng) -> Result<NearestResponse, ApiError> {
        let url = self.build_url(
            "api/nearest/",
            &[("lat", &point.lat_param()), ("lng", &point.lng_param())],
        )?;
        let body = self.get_json(url, "nearest").await?;
        parse(body, "nearest")
    }

    /// Up to ten car washes around a point, closest first.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`WashmapClient::nearest`].
    pub async fn nearby(&self, point: LatLng) -> Result<Vec<NearbyCarwash>, ApiError> {
        let url = self.build_url(
            "api/nearby/",
            &[("lat", &point.lat_param()), ("lng", &point.lng_param())],
        )?;
        let body = self.get_json(url, "nearby").await?;
        let parsed: NearbyResponse = parse(body, "nearby")?;
        Ok(parsed.carwashes)
    }

    // -----------------------------------------------------------------------
    // recommendations
    // -----------------------------------------------------------------------

    /// Ranked candidate sites inside a circle.
    ///
    /// # Errors
    ///
    /// [`ApiError::Api`] carries the server's message for bad parameters;
    /// otherwise the usual transport/status/deserialize taxonomy.
    pub async fn recommend_circle(
        &self,
        center: LatLng,
        radius_km: f64,
        params: RecommendParams,
    ) -> Result<Vec<RecommendationCandidate>, ApiError> {
        let url = self.build_url(
            "api/recommend_circle/",
            &[
                ("lat", &center.lat_param()),
                ("lng", &center.lng_param()),
                ("radius_km", &format!("{radius_km}")),
                ("min_distance_km", &format!("{}", params.min_distance_km)),
                (
                    "max_settlement_distance_km",
                    &format!("{}", params.max_settlement_distance_km),
                ),
            ],
        )?;
        let body = self.get_json(url, "recommend_circle").await?;
        let parsed: RecommendationsResponse = parse(body, "recommend_circle")?;
        Ok(parsed.recommendations)
    }

    /// Ranked candidate sites inside a county, by stable county identifier.
    ///
    /// # Errors
    ///
    /// [`ApiError::Api`] with "County not found" for an unknown id;
    /// otherwise the usual taxonomy.
    pub async fn recommend_county(
        &self,
        county_id: &str,
        params: RecommendParams,
    ) -> Result<Vec<RecommendationCandidate>, ApiError> {
        let url = self.build_url(
            "api/recommend_county/",
            &[
                ("county_id", county_id),
                ("min_distance_km", &format!("{}", params.min_distance_km)),
                (
                    "max_settlement_distance_km",
                    &format!("{}", params.max_settlement_distance_km),
                ),
            ],
        )?;
        let body = self.get_json(url, "recommend_county").await?;
        let parsed: RecommendationsResponse = parse(body, "recommend_county")?;
        Ok(parsed.recommendations)
    }

    /// Single best candidate inside a drawn polygon. `ring` must be a closed
    /// linear ring in GeoJSON `[lng, lat]` order. Unlike the circle and
    /// county endpoints the response is a bare recommendation object.
    ///
    /// # Errors
    ///
    /// [`ApiError::MissingCsrfToken`] before any I/O when the `csrftoken`
    /// cookie was never set; otherwise the usual taxonomy.
    pub async fn recommend_polygon(
        &self,
        ring: Vec<Vec<f64>>,
        min_distance_km: f64,
    ) -> Result<RecommendationCandidate, ApiError> {
        let url = self.build_url("api/recommend_polygon/", &[])?;
        let body = serde_json::json!({
            "geometry": Geometry::new(GeoValue::Polygon(vec![ring])),
            "min_distance_km": min_distance_km,
        });
        let value = self.post_json(url, &body, "recommend_polygon").await?;
        parse(value, "recommend_polygon")
    }

    /// All saved recommendations for the logged-in business user.
    ///
    /// # Errors
    ///
    /// Usual transport/status/deserialize taxonomy.
    pub async fn saved_recommendations(&self) -> Result<Vec<SavedRecommendation>, ApiError> {
        let url = self.build_url("api/recommendations/", &[])?;
        let body = self.get_json(url, "saved_recommendations").await?;
        let parsed: SavedRecommendationsResponse = parse(body, "saved_recommendations")?;
        Ok(parsed.recommendations)
    }

    /// Persists a recommendation. The server assigns `created_at`; callers
    /// should reload the full list afterwards rather than inserting locally.
    ///
    /// # Errors
    ///
    /// [`ApiError::MissingCsrfToken`] before any I/O when the `csrftoken`
    /// cookie was never set; otherwise the usual taxonomy.
    pub async fn save_recommendation(
        &self,
        request: &SaveRecommendationRequest,
    ) -> Result<SavedRecommendation, ApiError> {
        let url = self.build_url("api/recommendations/save/", &[])?;
        let value = self.post_json(url, request, "save_recommendation").await?;
        parse(value, "save_recommendation")
    }

    // -----------------------------------------------------------------------
    // advisories
    // -----------------------------------------------------------------------

    /// Weather advisory for a point. Note the service spells longitude `lon`
    /// here, unlike the lookup endpoints.
    ///
    /// # Errors
    ///
    /// Usual transport/status/deserialize taxonomy.
    pub async fn weather(&self, point: LatLng) -> Result<Weather, ApiError> {
        let url = self.build_url(
            "api/weather/",
            &[("lat", &point.lat_param()), ("lon", &point.lng_param())],
        )?;
        let body = self.get_json(url, "weather").await?;
        parse(body, "weather")
    }

    /// Competition analysis around a point.
    ///
    /// # Errors
    ///
    /// Usual transport/status/deserialize taxonomy.
    pub async fn competition(
        &self,
        point: LatLng,
        radius_km: f64,
    ) -> Result<Competition, ApiError> {
        let url = self.build_url(
            "api/competition/",
            &[
                ("lat", &point.lat_param()),
                ("lon", &point.lng_param()),
                ("radius", &format!("{radius_km}")),
            ],
        )?;
        let body = self.get_json(url, "competition").await?;
        parse(body, "competition")
    }

    // -----------------------------------------------------------------------
    // auth
    // -----------------------------------------------------------------------

    /// Mobile-style credential login. On success the returned token is also
    /// attached to this client for subsequent requests. No CSRF header: the
    /// login endpoint is csrf-exempt, token auth replaces it.
    ///
    /// # Errors
    ///
    /// [`ApiError::UnexpectedStatus`] for invalid credentials (the service
    /// answers 400 with no error body); otherwise the usual taxonomy.
    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, ApiError> {
        let url = self.build_url("api/mobile_login/", &[])?;
        let body = serde_json::json!({ "username": username, "password": password });
        let request = self.client.post(url).json(&body);
        let value = self.execute_json(request, "mobile_login").await?;
        let parsed: LoginResponse = parse(value, "mobile_login")?;
        self.auth_token = Some(parsed.token.clone());
        Ok(parsed)
    }

    // -----------------------------------------------------------------------
    // plumbing
    // -----------------------------------------------------------------------

    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| ApiError::Api(format!("invalid endpoint path '{path}': {e}")))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    /// Reads the `csrftoken` cookie out of the jar for the service origin.
    /// The server sets it on any page or GET response; until then mutating
    /// requests are refused client-side.
    pub(crate) fn csrf_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base_url)?;
        let raw = header.to_str().ok()?;
        raw.split(';')
            .map(str::trim)
            .find_map(|pair| pair.strip_prefix("csrftoken=").map(str::to_owned))
    }

    #[cfg(test)]
    pub(crate) fn seed_csrf_cookie(&self, token: &str) {
        self.jar
            .add_cookie_str(&format!("csrftoken={token}"), &self.base_url);
    }

    async fn get_feature_collection(&self, path: &str) -> Result<FeatureCollection, ApiError> {
        let url = self.build_url(path, &[])?;
        let body = self.get_json(url, path).await?;
        serde_json::from_value(body).map_err(|e| ApiError::Deserialize {
            context: path.to_owned(),
            source: e,
        })
    }

    async fn get_json(&self, url: Url, context: &str) -> Result<serde_json::Value, ApiError> {
        let request = self.client.get(url);
        self.execute_json(request, context).await
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
        context: &str,
    ) -> Result<serde_json::Value, ApiError> {
        let token = self.csrf_token().ok_or(ApiError::MissingCsrfToken)?;
        let request = self
            .client
            .post(url)
            .header("X-CSRFToken", token)
            .json(body);
        self.execute_json(request, context).await
    }

    async fn execute_json(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<serde_json::Value, ApiError> {
        let request = match &self.auth_token {
            Some(token) => request.header(reqwest::header::AUTHORIZATION, format!("Token {token}")),
            None => request,
        };
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().clone();
        let text = response.text().await?;
        let body: Result<serde_json::Value, _> = serde_json::from_str(&text);

        if !status.is_success() {
            if let Ok(value) = &body {
                if let Some(message) = value.get("error").and_then(serde_json::Value::as_str) {
                    return Err(ApiError::Api(message.to_owned()));
                }
            }
            return Err(ApiError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let value = body.map_err(|e| ApiError::Deserialize {
            context: context.to_owned(),
            source: e,
        })?;
        // A 200 with an error body still counts as a server-side refusal.
        if let Some(message) = value.get("error").and_then(serde_json::Value::as_str) {
            return Err(ApiError::Api(message.to_owned()));
        }
        Ok(value)
    }
}

fn parse<T: DeserializeOwned>(value: serde_json::Value, context: &str) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
