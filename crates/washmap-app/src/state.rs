//! Owned application state: mode, tool, map artifacts, caches.
//!
//! One `AppState` owns everything the map shows. All mutation happens
//! synchronously inside event-handling methods; network
//! effects are returned as [`Action`] values for the driver to run, so this
//! module stays pure and unit-testable.

use washmap_api::features::{CarwashFeature, CountyFeature};
use washmap_api::types::{Competition, CountyWashCount, NearbyCarwash, RecommendParams, Weather};
use washmap_core::{LatLng, Notice};

use crate::dispatch::Action;
use crate::drawing::DrawingSession;
use crate::pins::PinBoard;
use crate::recommend::RecommendationSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    User,
    Business,
}

/// Active business recommendation tool. Meaningful only in business mode;
/// exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendMode {
    County,
    Circle,
    Polygon,
}

/// Sidebar parameters for business recommendations.
#[derive(Debug, Clone, Copy)]
pub struct BusinessParams {
    pub radius_km: f64,
    pub min_distance_km: f64,
    pub max_settlement_distance_km: f64,
    pub competition_radius_km: f64,
}

impl BusinessParams {
    #[must_use]
    pub fn recommend_params(&self) -> RecommendParams {
        RecommendParams {
            min_distance_km: self.min_distance_km,
            max_settlement_distance_km: self.max_settlement_distance_km,
        }
    }
}

/// The business-mode circle overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleOverlay {
    pub center: LatLng,
    pub radius_m: f64,
}

/// Where the viewport should move after the latest interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportFit {
    Point(LatLng),
    Circle { center: LatLng, radius_m: f64 },
}

/// Transient overlays owned by the map. Mode and tool switches clear the
/// pieces belonging to the state being left so no stale overlay survives.
#[derive(Debug, Default)]
pub struct MapArtifacts {
    /// The always-placed click marker; replaced on every click, never
    /// auto-expired.
    pub click_marker: Option<LatLng>,
    pub nearest_marker: Option<LatLng>,
    pub recommendation_marker: Option<LatLng>,
    pub circle: Option<CircleOverlay>,
    /// County polygons answer clicks only while the county tool is active.
    pub county_layer_interactive: bool,
    pub fit: Option<ViewportFit>,
}

pub struct AppState {
    pub mode: Mode,
    pub recommend_mode: RecommendMode,
    authenticated: bool,
    county_data_loaded: bool,
    pub params: BusinessParams,
    pub artifacts: MapArtifacts,
    pub drawing: DrawingSession,
    pub recommendations: RecommendationSession,
    pub pins: PinBoard,
    /// Sidebar lat/lng fields, populated by circle-mode clicks.
    pub circle_form: Option<LatLng>,
    pub carwashes: Vec<CarwashFeature>,
    pub counties: Vec<CountyFeature>,
    pub wash_counts: Vec<CountyWashCount>,
    pub nearby: Vec<NearbyCarwash>,
    /// Weather advisory panel (user mode car-wash selection).
    pub weather: Option<Weather>,
    /// Competition panel (business mode car-wash selection).
    pub competition: Option<Competition>,
}

impl AppState {
    #[must_use]
    pub fn new(params: BusinessParams) -> Self {
        Self {
            mode: Mode::User,
            recommend_mode: RecommendMode::County,
            authenticated: false,
            county_data_loaded: false,
            params,
            artifacts: MapArtifacts::default(),
            drawing: DrawingSession::default(),
            recommendations: RecommendationSession::default(),
            pins: PinBoard::default(),
            circle_form: None,
            carwashes: Vec::new(),
            counties: Vec::new(),
            wash_counts: Vec::new(),
            nearby: Vec::new(),
            weather: None,
            competition: None,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn set_authenticated(&mut self, authenticated: bool) {
        self.authenticated = authenticated;
    }

    #[must_use]
    pub fn county_data_loaded(&self) -> bool {
        self.county_data_loaded
    }

    /// Called by the driver once both county fetches have succeeded, so
    /// re-entering business mode stops re-fetching.
    pub fn mark_county_data_loaded(&mut self) {
        self.county_data_loaded = true;
    }

    /// Switches between user and business mode.
    ///
    /// Every transition clears the transient artifacts of the state being
    /// left. Entering business mode re-applies the selected tool (so the
    /// county layer's interactivity is correct) and asks for a saved-list
    /// refresh; the county boundary + wash-count fetches are emitted only
    /// until they have succeeded once.
    ///
    /// # Errors
    ///
    /// Entering business mode while unauthenticated is rejected with a
    /// warning [`Notice`]; state is left untouched. This is the only
    /// blocked transition.
    pub fn set_mode(&mut self, mode: Mode) -> Result<Vec<Action>, Notice> {
        if mode == Mode::Business && !self.authenticated {
            return Err(Notice::warning("Log in to use business mode."));
        }

        self.mode = mode;
        self.artifacts.click_marker = None;
        self.artifacts.nearest_marker = None;
        self.artifacts.circle = None;
        self.artifacts.fit = None;
        // A polygon draft never survives a mode change.
        self.drawing.clear();

        match mode {
            Mode::User => {
                self.artifacts.county_layer_interactive = false;
                Ok(Vec::new())
            }
            Mode::Business => {
                let mut actions = Vec::new();
                if !self.county_data_loaded {
                    actions.push(Action::FetchCounties);
                    actions.push(Action::FetchWashCounts);
                }
                self.apply_recommend_mode(self.recommend_mode);
                actions.push(Action::RefreshSavedRecommendations);
                Ok(actions)
            }
        }
    }

    /// Selects the business recommendation tool, tearing down the previous
    /// tool's map artifacts: leaving circle removes the circle overlay,
    /// leaving polygon clears the drawing session.
    pub fn set_recommend_mode(&mut self, mode: RecommendMode) {
        if self.recommend_mode != mode {
            match self.recommend_mode {
                RecommendMode::Circle => {
                    self.artifacts.circle = None;
                    self.circle_form = None;
                }
                RecommendMode::Polygon => self.drawing.clear(),
                RecommendMode::County => {}
            }
        }
        self.recommend_mode = mode;
        self.apply_recommend_mode(mode);
    }

    /// Starts the polygon draw tool. Only usable in business mode with the
    /// polygon tool selected; otherwise ignored.
    pub fn start_polygon_drawing(&mut self) {
        if self.mode == Mode::Business && self.recommend_mode == RecommendMode::Polygon {
            self.drawing.start();
        }
    }

    fn apply_recommend_mode(&mut self, mode: RecommendMode) {
        self.artifacts.county_layer_interactive =
            self.mode == Mode::Business && mode == RecommendMode::County;
        if mode != RecommendMode::Polygon && self.drawing.is_active() {
            self.drawing.clear();
        }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
