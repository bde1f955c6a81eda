//! Recommendation session: the latest server suggestion and the saved list.

use washmap_api::types::{
    RecommendationCandidate, SaveRecommendationRequest, SavedRecommendation, SourceType,
};
use washmap_core::{LatLng, Notice};

/// The most recent server-suggested site, tagged with the scope that
/// produced it. Held until overwritten by the next successful fetch.
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub lat: f64,
    pub lng: f64,
    pub source_type: SourceType,
    pub reason: String,
    pub name: Option<String>,
    pub population: Option<i64>,
    pub min_distance_to_carwash_km: Option<f64>,
    pub nearby_settlements: Option<i64>,
}

impl Recommendation {
    #[must_use]
    pub fn from_candidate(candidate: RecommendationCandidate, source_type: SourceType) -> Self {
        Self {
            lat: candidate.lat,
            lng: candidate.lng,
            source_type,
            reason: candidate.reason,
            name: candidate.name,
            population: candidate.population,
            min_distance_to_carwash_km: candidate.min_distance_to_carwash_km,
            nearby_settlements: candidate.nearby_settlements,
        }
    }

    /// Marker position, when the server sent coordinates inside range.
    #[must_use]
    pub fn position(&self) -> Option<LatLng> {
        LatLng::new(self.lat, self.lng).ok()
    }
}

/// Tracks `last` (overwritten, never queued) and the read-through mirror of
/// the server's saved list.
#[derive(Debug, Default)]
pub struct RecommendationSession {
    last: Option<Recommendation>,
    /// Full ranked list from the latest circle/county fetch, for display.
    candidates: Vec<Recommendation>,
    saved: Vec<SavedRecommendation>,
}

impl RecommendationSession {
    /// Overwrites `last` with a fresh suggestion.
    pub fn stage(&mut self, recommendation: Recommendation) {
        self.last = Some(recommendation);
    }

    /// Replaces the display list of ranked candidates.
    pub fn set_candidates(&mut self, candidates: Vec<Recommendation>) {
        self.candidates = candidates;
    }

    #[must_use]
    pub fn last(&self) -> Option<&Recommendation> {
        self.last.as_ref()
    }

    #[must_use]
    pub fn candidates(&self) -> &[Recommendation] {
        &self.candidates
    }

    /// Builds the save payload from `last`. When nothing has been staged the
    /// caller gets a warning notice and must not issue any request. Saving
    /// does not consume `last`; the next fetch overwrites it.
    ///
    /// # Errors
    ///
    /// Returns a warning [`Notice`] when no recommendation has been staged.
    pub fn for_save(&self) -> Result<SaveRecommendationRequest, Notice> {
        let last = self
            .last
            .as_ref()
            .ok_or_else(|| Notice::warning("No recommendation to save yet."))?;
        Ok(SaveRecommendationRequest {
            lat: last.lat,
            lng: last.lng,
            source_type: last.source_type,
            reason: last.reason.clone(),
        })
    }

    /// Wholesale replacement after a reload — never an incremental append,
    /// so server-assigned fields like `created_at` cannot drift.
    pub fn replace_saved(&mut self, saved: Vec<SavedRecommendation>) {
        self.saved = saved;
    }

    #[must_use]
    pub fn saved(&self) -> &[SavedRecommendation] {
        &self.saved
    }

    /// Recenter target and popup summary for a saved item. No server
    /// computation is repeated.
    #[must_use]
    pub fn select_saved(&self, index: usize) -> Option<(LatLng, String)> {
        let item = self.saved.get(index)?;
        let position = LatLng::new(item.lat, item.lng).ok()?;
        Some((position, format!("{}: {}", item.source_type, item.reason)))
    }

}

#[cfg(test)]
#[path = "recommend_test.rs"]
mod tests;
