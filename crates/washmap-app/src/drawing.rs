//! Polygon drawing session for business polygon recommendations.
//!
//! Vertices are stored in GeoJSON `[lng, lat]` order from the moment they
//! are captured, even though map click events arrive lat-first — the
//! submission path must never re-order coordinates.

use washmap_core::LatLng;

/// Minimum vertices before a polygon can be finished.
const MIN_VERTICES: usize = 3;

/// Payload produced by finishing a drawing: a closed linear ring ready for
/// the polygon recommendation endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonSubmission {
    /// Closed ring in `[lng, lat]` order (first vertex repeated at the end).
    pub ring: Vec<Vec<f64>>,
    pub min_distance_km: f64,
}

/// Accumulates clicked points into a candidate polygon.
///
/// Created on entering the polygon tool, cleared on tool or mode switch,
/// reset after a successful submission.
#[derive(Debug, Default)]
pub struct DrawingSession {
    active: bool,
    vertices: Vec<Vec<f64>>,
    /// Rendered per-vertex markers, lat-first for the map layer.
    vertex_markers: Vec<LatLng>,
    /// The finalized ring once `finish` has run, kept for rendering.
    polygon_overlay: Option<Vec<Vec<f64>>>,
}

impl DrawingSession {
    /// Enters drawing mode. Any leftover draft is discarded first.
    pub fn start(&mut self) {
        self.clear();
        self.active = true;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn vertex_markers(&self) -> &[LatLng] {
        &self.vertex_markers
    }

    #[must_use]
    pub fn polygon_overlay(&self) -> Option<&[Vec<f64>]> {
        self.polygon_overlay.as_deref()
    }

    /// Appends a clicked point to the draft and renders its vertex marker.
    pub fn add_point(&mut self, point: LatLng) {
        self.vertices.push(point.to_geojson_position());
        self.vertex_markers.push(point);
    }

    /// The finish action is enabled exactly when three or more vertices
    /// exist.
    #[must_use]
    pub fn can_finish(&self) -> bool {
        self.vertices.len() >= MIN_VERTICES
    }

    /// Closes the ring and produces the submission payload. Returns `None`
    /// (and changes nothing) below the minimum vertex count. The draft
    /// survives until [`DrawingSession::clear`] so a failed submission can
    /// be retried without redrawing.
    #[must_use]
    pub fn finish(&mut self, min_distance_km: f64) -> Option<PolygonSubmission> {
        if !self.can_finish() {
            return None;
        }
        let mut ring = self.vertices.clone();
        ring.push(ring[0].clone());
        self.polygon_overlay = Some(ring.clone());
        Some(PolygonSubmission {
            ring,
            min_distance_km,
        })
    }

    /// Empties the draft, its vertex markers, and any finalized overlay,
    /// and leaves drawing mode. Idempotent, callable at any time.
    pub fn clear(&mut self) {
        self.active = false;
        self.vertices.clear();
        self.vertex_markers.clear();
        self.polygon_overlay = None;
    }
}

#[cfg(test)]
#[path = "drawing_test.rs"]
mod tests;
