//! Choropleth support: wash-count join and fill-color interpolation.

use washmap_api::features::CountyFeature;
use washmap_api::types::CountyWashCount;

/// Strips the `"County "` prefix some data sources carry on county names.
fn normalize_name(name: &str) -> &str {
    name.strip_prefix("County ").unwrap_or(name)
}

/// Looks up the wash count for a county feature by English name.
///
/// The boundary layer and the counts endpoint come from different sources
/// and disagree on the `"County X"` vs `"X"` spelling; the join resolves
/// either combination to the same count.
#[must_use]
pub fn wash_count_for(counts: &[CountyWashCount], county: &CountyFeature) -> Option<i64> {
    let wanted = normalize_name(&county.name_en);
    counts
        .iter()
        .find(|row| normalize_name(&row.name) == wanted)
        .map(|row| row.wash_count)
}

/// Linear color ramp between two RGB endpoints.
#[derive(Debug, Clone, Copy)]
pub struct ColorRamp {
    low: [u8; 3],
    high: [u8; 3],
}

impl Default for ColorRamp {
    /// Pale-to-dark green, the service's wash-count styling.
    fn default() -> Self {
        Self {
            low: [0xe8, 0xf5, 0xe9],
            high: [0x1b, 0x5e, 0x20],
        }
    }
}

impl ColorRamp {
    /// Fill color for a county holding `count` washes when the busiest
    /// county holds `max_count`, as `#rrggbb`. A zero `max_count` (no data
    /// anywhere) pins everything to the low end.
    #[must_use]
    pub fn color_for(&self, count: i64, max_count: i64) -> String {
        let t = if max_count <= 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let ratio = count.clamp(0, max_count) as f64 / max_count as f64;
            ratio
        };
        let channel = |low: u8, high: u8| -> u8 {
            let value = f64::from(low) + (f64::from(high) - f64::from(low)) * t;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let rounded = value.round() as u8;
            rounded
        };
        format!(
            "#{:02x}{:02x}{:02x}",
            channel(self.low[0], self.high[0]),
            channel(self.low[1], self.high[1]),
            channel(self.low[2], self.high[2]),
        )
    }
}

/// One styled row of the choropleth layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoroplethEntry {
    pub name_en: String,
    pub wash_count: i64,
    pub fill_color: String,
}

/// Joins counties to their wash counts and assigns ramp colors. Counties
/// missing from the counts payload style as zero.
#[must_use]
pub fn choropleth(counties: &[CountyFeature], counts: &[CountyWashCount]) -> Vec<ChoroplethEntry> {
    let ramp = ColorRamp::default();
    let max_count = counts.iter().map(|row| row.wash_count).max().unwrap_or(0);
    counties
        .iter()
        .map(|county| {
            let wash_count = wash_count_for(counts, county).unwrap_or(0);
            ChoroplethEntry {
                name_en: county.name_en.clone(),
                wash_count,
                fill_color: ramp.color_for(wash_count, max_count),
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "counties_test.rs"]
mod tests;
