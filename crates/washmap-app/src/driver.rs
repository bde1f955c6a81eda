//! Session driver: runs [`Action`] values against the gateway and applies
//! the responses back onto the [`AppState`].
//!
//! Every request is a single attempt. A failure surfaces as exactly one
//! [`Notice`]: server-provided `{"error": ...}` messages verbatim at warning
//! level, anything else as a danger notice with a stable fallback message
//! (the underlying error goes to the log, not the user).

use washmap_api::features::CountyFeature;
use washmap_api::types::{NearestResponse, RecommendationCandidate, SourceType};
use washmap_api::{ApiError, WashmapClient};
use washmap_core::{LatLng, Notice};

use crate::dispatch::{self, Action};
use crate::recommend::Recommendation;
use crate::state::{AppState, BusinessParams, Mode, ViewportFit};

/// A map session: owned state plus the client that serves its actions.
pub struct Session {
    pub state: AppState,
    client: WashmapClient,
}

impl Session {
    /// Builds a session around an already-configured client. A client that
    /// carries an auth token starts the session authenticated.
    #[must_use]
    pub fn new(client: WashmapClient, params: BusinessParams) -> Self {
        let mut state = AppState::new(params);
        state.set_authenticated(client.auth_token().is_some());
        Self { state, client }
    }

    #[must_use]
    pub fn client(&self) -> &WashmapClient {
        &self.client
    }

    /// Logs in and marks the session authenticated. The client keeps the
    /// token for every subsequent request.
    pub async fn login(&mut self, username: &str, password: &str) -> Vec<Notice> {
        match self.client.login(username, password).await {
            Ok(response) => {
                self.state.set_authenticated(true);
                let who = response
                    .user
                    .map_or_else(|| username.to_owned(), |user| user.username);
                vec![Notice::success(format!("Logged in as {who}."))]
            }
            Err(err) => vec![failure_notice(&err, "Login failed. Check your credentials.")],
        }
    }

    /// Loads the car-wash point layer shown in both modes.
    pub async fn load_carwashes(&mut self) -> Vec<Notice> {
        match self.client.fetch_carwashes().await {
            Ok(features) => {
                self.state.carwashes = features;
                Vec::new()
            }
            Err(err) => vec![failure_notice(&err, "Failed to load car wash locations.")],
        }
    }

    /// Switches mode and runs whatever fetches the transition asks for.
    pub async fn set_mode(&mut self, mode: Mode) -> Vec<Notice> {
        match self.state.set_mode(mode) {
            Ok(actions) => self.run_actions(actions).await,
            Err(notice) => vec![notice],
        }
    }

    /// Handles a map click end to end.
    pub async fn click(&mut self, point: LatLng) -> Vec<Notice> {
        let actions = dispatch::map_click(&mut self.state, point);
        self.run_actions(actions).await
    }

    /// Handles a click on a county boundary polygon.
    pub async fn county_click(&mut self, county: &CountyFeature) -> Vec<Notice> {
        match dispatch::county_click(&self.state, county) {
            Ok(Some(action)) => self.run_actions(vec![action]).await,
            Ok(None) => Vec::new(),
            Err(notice) => vec![notice],
        }
    }

    /// Submits the drawn polygon. Below three vertices the draft is kept and
    /// the user is told what is missing; nothing is sent.
    pub async fn finish_polygon(&mut self) -> Vec<Notice> {
        if self.state.drawing.is_active() && !self.state.drawing.can_finish() {
            return vec![Notice::warning("Add at least 3 points to the polygon first.")];
        }
        match dispatch::finish_polygon(&mut self.state) {
            Some(action) => self.run_actions(vec![action]).await,
            None => Vec::new(),
        }
    }

    /// Persists the staged recommendation, then reloads the saved list so
    /// server-assigned fields are authoritative.
    pub async fn save_last(&mut self) -> Vec<Notice> {
        let request = match self.state.recommendations.for_save() {
            Ok(request) => request,
            Err(notice) => return vec![notice],
        };
        match self.client.save_recommendation(&request).await {
            Ok(_) => {
                let mut notices = vec![Notice::success("Recommendation saved!")];
                notices.extend(
                    self.run_actions(vec![Action::RefreshSavedRecommendations])
                        .await,
                );
                notices
            }
            Err(err) => vec![failure_notice(&err, "Failed to save the recommendation.")],
        }
    }

    /// Recenters on a selected car wash and fetches its advisory panel:
    /// weather in user mode, competition analysis in business mode.
    pub async fn select_carwash(&mut self, point: LatLng) -> Vec<Notice> {
        self.state.artifacts.fit = Some(ViewportFit::Point(point));
        match self.state.mode {
            Mode::User => match self.client.weather(point).await {
                Ok(weather) => {
                    self.state.weather = Some(weather);
                    Vec::new()
                }
                Err(err) => vec![failure_notice(&err, "Failed to load weather data.")],
            },
            Mode::Business => {
                let radius_km = self.state.params.competition_radius_km;
                match self.client.competition(point, radius_km).await {
                    Ok(competition) => {
                        self.state.competition = Some(competition);
                        Vec::new()
                    }
                    Err(err) => vec![failure_notice(&err, "Failed to load competition data.")],
                }
            }
        }
    }

    /// Recenters on a saved recommendation without repeating any server
    /// computation.
    pub fn select_saved(&mut self, index: usize) -> Option<Notice> {
        let (position, summary) = self.state.recommendations.select_saved(index)?;
        self.state.artifacts.fit = Some(ViewportFit::Point(position));
        Some(Notice::info(summary))
    }

    /// Executes a batch of actions in order. Consecutive nearest+nearby and
    /// counties+wash-counts pairs run concurrently; each is independent, so
    /// one failing never suppresses the other.
    pub async fn run_actions(&mut self, actions: Vec<Action>) -> Vec<Notice> {
        let mut notices = Vec::new();
        let mut queue = actions.into_iter().peekable();
        while let Some(action) = queue.next() {
            match action {
                Action::FetchNearest(point) => {
                    if matches!(queue.peek(), Some(Action::FetchNearby(next)) if *next == point) {
                        queue.next();
                        let (nearest, nearby) =
                            futures::join!(self.client.nearest(point), self.client.nearby(point));
                        notices.push(self.apply_nearest(nearest));
                        notices.extend(self.apply_nearby(nearby));
                    } else {
                        let nearest = self.client.nearest(point).await;
                        notices.push(self.apply_nearest(nearest));
                    }
                }
                Action::FetchNearby(point) => {
                    let nearby = self.client.nearby(point).await;
                    notices.extend(self.apply_nearby(nearby));
                }
                Action::FetchCircleRecommendation {
                    center,
                    radius_km,
                    params,
                } => {
                    let result = self.client.recommend_circle(center, radius_km, params).await;
                    notices.push(self.apply_candidates(result, SourceType::Circle));
                }
                Action::FetchCountyRecommendation { county_id, params } => {
                    let result = self.client.recommend_county(&county_id, params).await;
                    notices.push(self.apply_candidates(result, SourceType::County));
                }
                Action::SubmitPolygon {
                    ring,
                    min_distance_km,
                } => {
                    let result = self.client.recommend_polygon(ring, min_distance_km).await;
                    notices.push(self.apply_polygon(result));
                }
                Action::FetchCounties => {
                    if matches!(queue.peek(), Some(Action::FetchWashCounts)) {
                        queue.next();
                        let (counties, counts) = futures::join!(
                            self.client.fetch_counties(),
                            self.client.fetch_wash_counts()
                        );
                        let mut loaded = true;
                        match counties {
                            Ok(features) => self.state.counties = features,
                            Err(err) => {
                                loaded = false;
                                notices.push(failure_notice(
                                    &err,
                                    "Failed to load county boundaries.",
                                ));
                            }
                        }
                        match counts {
                            Ok(counts) => self.state.wash_counts = counts,
                            Err(err) => {
                                loaded = false;
                                notices.push(failure_notice(
                                    &err,
                                    "Failed to load county wash counts.",
                                ));
                            }
                        }
                        if loaded {
                            self.state.mark_county_data_loaded();
                        }
                    } else {
                        match self.client.fetch_counties().await {
                            Ok(features) => self.state.counties = features,
                            Err(err) => notices
                                .push(failure_notice(&err, "Failed to load county boundaries.")),
                        }
                    }
                }
                Action::FetchWashCounts => match self.client.fetch_wash_counts().await {
                    Ok(counts) => self.state.wash_counts = counts,
                    Err(err) => {
                        notices.push(failure_notice(&err, "Failed to load county wash counts."));
                    }
                },
                Action::RefreshSavedRecommendations => {
                    if self.state.mode == Mode::Business && self.state.is_authenticated() {
                        match self.client.saved_recommendations().await {
                            Ok(saved) => self.state.recommendations.replace_saved(saved),
                            Err(err) => notices.push(failure_notice(
                                &err,
                                "Failed to load saved recommendations.",
                            )),
                        }
                    }
                }
            }
        }
        notices
    }

    fn apply_nearest(&mut self, result: Result<NearestResponse, ApiError>) -> Notice {
        match result {
            Ok(response) => match response.location {
                Some(summary) => {
                    if let Ok(position) = LatLng::new(summary.lat, summary.lng) {
                        self.state.artifacts.nearest_marker = Some(position);
                        self.state.artifacts.fit = Some(ViewportFit::Point(position));
                    }
                    let name = summary.name.as_deref().unwrap_or("Car wash");
                    match response.distance {
                        Some(km) => {
                            Notice::success(format!("Nearest car wash: {name}, {km:.1} km away."))
                        }
                        None => Notice::success(format!("Nearest car wash: {name}.")),
                    }
                }
                None => {
                    self.state.artifacts.nearest_marker = None;
                    Notice::info("No car wash found nearby.")
                }
            },
            Err(err) => failure_notice(&err, "Failed to find the nearest car wash."),
        }
    }

    fn apply_nearby(
        &mut self,
        result: Result<Vec<washmap_api::types::NearbyCarwash>, ApiError>,
    ) -> Option<Notice> {
        match result {
            Ok(carwashes) => {
                self.state.nearby = carwashes;
                None
            }
            Err(err) => Some(failure_notice(&err, "Failed to load nearby car washes.")),
        }
    }

    fn apply_candidates(
        &mut self,
        result: Result<Vec<RecommendationCandidate>, ApiError>,
        source: SourceType,
    ) -> Notice {
        match result {
            Ok(candidates) if candidates.is_empty() => {
                Notice::info("No suitable locations found in this area.")
            }
            Ok(candidates) => {
                let recommendations: Vec<Recommendation> = candidates
                    .into_iter()
                    .map(|candidate| Recommendation::from_candidate(candidate, source))
                    .collect();
                let total = recommendations.len();
                let first = recommendations[0].clone();
                if let Some(position) = first.position() {
                    self.state.artifacts.recommendation_marker = Some(position);
                    self.state.artifacts.fit = Some(ViewportFit::Point(position));
                }
                self.state.recommendations.stage(first);
                self.state.recommendations.set_candidates(recommendations);
                if total == 1 {
                    Notice::success("Found a recommended location.")
                } else {
                    Notice::success(format!("Found {total} recommended locations."))
                }
            }
            Err(err) => failure_notice(&err, "Failed to fetch recommendations."),
        }
    }

    fn apply_polygon(&mut self, result: Result<RecommendationCandidate, ApiError>) -> Notice {
        match result {
            Ok(candidate) => {
                let recommendation = Recommendation::from_candidate(candidate, SourceType::Polygon);
                if let Some(position) = recommendation.position() {
                    self.state.artifacts.recommendation_marker = Some(position);
                    self.state.artifacts.fit = Some(ViewportFit::Point(position));
                }
                self.state.recommendations.stage(recommendation);
                // The draft served its purpose; a failed submission above
                // keeps it so the user can retry.
                self.state.drawing.clear();
                Notice::success("Found a recommended location inside the polygon.")
            }
            Err(err) => failure_notice(&err, "Failed to fetch the polygon recommendation."),
        }
    }
}

/// Maps an [`ApiError`] to its single user-facing notice. Server-worded
/// refusals pass through verbatim; transport and decode problems get the
/// caller's fallback wording and a log line.
fn failure_notice(err: &ApiError, fallback: &str) -> Notice {
    match err {
        ApiError::Api(message) => Notice::warning(message.clone()),
        other => {
            tracing::warn!(error = %other, "request failed");
            Notice::danger(fallback)
        }
    }
}
