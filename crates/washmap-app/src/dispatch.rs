//! Map interaction dispatcher.
//!
//! A click is routed by `(mode, recommend_mode, drawing.active)` through a
//! fixed precedence order; the first matching branch wins and the rest are
//! skipped. Overlay state is mutated synchronously here; the returned
//! [`Action`] values are the network effects the driver must run.

use washmap_api::features::CountyFeature;
use washmap_api::types::RecommendParams;
use washmap_core::{LatLng, Notice};

use crate::state::{AppState, CircleOverlay, Mode, RecommendMode, ViewportFit};

/// A network effect requested by the pure interaction layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    FetchNearest(LatLng),
    FetchNearby(LatLng),
    FetchCircleRecommendation {
        center: LatLng,
        radius_km: f64,
        params: RecommendParams,
    },
    FetchCountyRecommendation {
        county_id: String,
        params: RecommendParams,
    },
    SubmitPolygon {
        ring: Vec<Vec<f64>>,
        min_distance_km: f64,
    },
    FetchCounties,
    FetchWashCounts,
    RefreshSavedRecommendations,
}

/// Routes a map click. Precedence:
///
/// 1. always place the click marker (replacing the previous one);
/// 2. active polygon drawing in business mode captures the point;
/// 3. business circle mode stages the form, draws the circle, fits the
///    viewport, and requests a recommendation;
/// 4. user mode requests the nearest and nearby lookups.
///
/// Business county mode produces only the click marker here; county clicks
/// arrive through [`county_click`] via the boundary layer.
pub fn map_click(state: &mut AppState, point: LatLng) -> Vec<Action> {
    state.artifacts.click_marker = Some(point);

    if state.drawing.is_active() && state.mode == Mode::Business {
        state.drawing.add_point(point);
        return Vec::new();
    }

    if state.mode == Mode::Business && state.recommend_mode == RecommendMode::Circle {
        let radius_km = state.params.radius_km;
        state.circle_form = Some(point);
        state.artifacts.circle = Some(CircleOverlay {
            center: point,
            radius_m: radius_km * 1000.0,
        });
        state.artifacts.fit = Some(ViewportFit::Circle {
            center: point,
            radius_m: radius_km * 1000.0,
        });
        return vec![Action::FetchCircleRecommendation {
            center: point,
            radius_km,
            params: state.params.recommend_params(),
        }];
    }

    if state.mode == Mode::User {
        return vec![Action::FetchNearest(point), Action::FetchNearby(point)];
    }

    Vec::new()
}

/// Routes a click on a county polygon. Fires only while the county layer is
/// interactive (business mode, county tool); otherwise the click already
/// went through [`map_click`] and nothing more may happen.
///
/// # Errors
///
/// Returns a warning [`Notice`] when the feature carries no resolvable
/// identifier, so no request can be scoped to it.
pub fn county_click(
    state: &AppState,
    county: &CountyFeature,
) -> Result<Option<Action>, Notice> {
    if !state.artifacts.county_layer_interactive {
        return Ok(None);
    }
    let county_id = county
        .id
        .clone()
        .ok_or_else(|| Notice::warning(format!("No identifier for county {}", county.name_en)))?;
    Ok(Some(Action::FetchCountyRecommendation {
        county_id,
        params: state.params.recommend_params(),
    }))
}

/// Finalizes the polygon draft into a submission action. No-op (returns
/// `None`) below three vertices or when drawing is not active.
#[must_use]
pub fn finish_polygon(state: &mut AppState) -> Option<Action> {
    if !state.drawing.is_active() {
        return None;
    }
    let submission = state.drawing.finish(state.params.min_distance_km)?;
    Some(Action::SubmitPolygon {
        ring: submission.ring,
        min_distance_km: submission.min_distance_km,
    })
}

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod tests;
