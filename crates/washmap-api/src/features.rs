//! Typed views over the service's GeoJSON feature collections.
//!
//! The raw features are duck-typed on the wire (every property is optional
//! and may simply be missing). These conversions pin each property to an
//! explicit `Option` field once, so the rest of the client never touches
//! `serde_json::Value` again.

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, JsonObject, Value};
use washmap_core::LatLng;

/// A car-wash point feature from `/carwashes.geojson`. Read-only; never
/// mutated client-side.
#[derive(Debug, Clone)]
pub struct CarwashFeature {
    pub position: LatLng,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub addr_street: Option<String>,
    pub addr_city: Option<String>,
    pub addr_postcode: Option<String>,
    pub amenity: Option<String>,
    pub operator: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub opening_hours: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
}

impl CarwashFeature {
    /// Address parts joined with commas, in street/city/postcode order.
    /// `None` when no part is present.
    #[must_use]
    pub fn address(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.addr_street, &self.addr_city, &self.addr_postcode]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// A county polygon feature from `/counties.geojson`.
#[derive(Debug, Clone)]
pub struct CountyFeature {
    /// Stable identifier: the feature id, else `properties.id`, else an OSM
    /// `@id`. Counties without any of the three cannot be used for
    /// county-scoped recommendations.
    pub id: Option<String>,
    pub name_en: String,
    pub name_ga: Option<String>,
    pub alt_name: Option<String>,
    pub area: Option<f64>,
}

fn prop_str(props: Option<&JsonObject>, key: &str) -> Option<String> {
    props?
        .get(key)
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned)
}

fn prop_f64(props: Option<&JsonObject>, key: &str) -> Option<f64> {
    props?.get(key).and_then(serde_json::Value::as_f64)
}

fn feature_id(feature: &Feature) -> Option<String> {
    match &feature.id {
        Some(Id::String(s)) => Some(s.clone()),
        Some(Id::Number(n)) => Some(n.to_string()),
        None => None,
    }
}

/// Resolves the stable identifier for a county feature: feature id first,
/// then `properties.id`, then the OSM `@id`.
#[must_use]
pub fn county_identifier(feature: &Feature) -> Option<String> {
    if let Some(id) = feature_id(feature) {
        return Some(id);
    }
    let props = feature.properties.as_ref();
    if let Some(id) = props.and_then(|p| p.get("id")) {
        return match id {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        };
    }
    prop_str(props, "@id")
}

/// Converts a car-wash feature, returning `None` for features without a
/// point geometry (logged and skipped rather than failing the whole load).
#[must_use]
pub fn carwash_from_feature(feature: &Feature) -> Option<CarwashFeature> {
    let position = match feature.geometry.as_ref().map(|g| &g.value) {
        Some(Value::Point(coords)) if coords.len() >= 2 => {
            // GeoJSON order: [lng, lat].
            LatLng::new(coords[1], coords[0]).ok()?
        }
        _ => {
            tracing::warn!("skipping carwash feature without a point geometry");
            return None;
        }
    };
    let props = feature.properties.as_ref();
    Some(CarwashFeature {
        position,
        name: prop_str(props, "name"),
        brand: prop_str(props, "brand"),
        addr_street: prop_str(props, "addr_street"),
        addr_city: prop_str(props, "addr_city"),
        addr_postcode: prop_str(props, "addr_postcode"),
        amenity: prop_str(props, "amenity"),
        operator: prop_str(props, "operator"),
        website: prop_str(props, "website"),
        phone: prop_str(props, "phone"),
        opening_hours: prop_str(props, "opening_hours"),
        email: prop_str(props, "email"),
        description: prop_str(props, "description"),
    })
}

/// Converts a county feature, requiring a polygonal geometry and an English
/// name.
#[must_use]
pub fn county_from_feature(feature: &Feature) -> Option<CountyFeature> {
    match feature.geometry.as_ref().map(|g| &g.value) {
        Some(Value::Polygon(_) | Value::MultiPolygon(_)) => {}
        _ => {
            tracing::warn!("skipping county feature without a polygon geometry");
            return None;
        }
    }
    let props = feature.properties.as_ref();
    let name_en = prop_str(props, "name_en")?;
    Some(CountyFeature {
        id: county_identifier(feature),
        name_en,
        name_ga: prop_str(props, "name_ga"),
        alt_name: prop_str(props, "alt_name"),
        area: prop_f64(props, "area"),
    })
}

/// Converts a whole collection, dropping malformed features.
#[must_use]
pub fn carwashes_from_collection(collection: &FeatureCollection) -> Vec<CarwashFeature> {
    collection
        .features
        .iter()
        .filter_map(carwash_from_feature)
        .collect()
}

/// Converts a whole collection, dropping malformed features.
#[must_use]
pub fn counties_from_collection(collection: &FeatureCollection) -> Vec<CountyFeature> {
    collection
        .features
        .iter()
        .filter_map(county_from_feature)
        .collect()
}

#[cfg(test)]
#[path = "features_test.rs"]
mod tests;
