use chrono::TimeZone;
use washmap_api::types::SavedRecommendation;
use washmap_core::NoticeLevel;

use super::*;

fn candidate(name: &str) -> RecommendationCandidate {
    serde_json::from_value(serde_json::json!({
        "lat": 53.1,
        "lng": -6.5,
        "name": name,
        "population": 5000,
        "reason": "Recommended location inside selected circle"
    }))
    .expect("valid candidate")
}

fn saved(id: i64, source: SourceType) -> SavedRecommendation {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "lat": 53.0,
        "lng": -7.0,
        "source_type": source,
        "reason": "r",
        "created_at": chrono::Utc.with_ymd_and_hms(2025, 10, 1, 8, 0, 0).unwrap().to_rfc3339()
    }))
    .expect("valid saved record")
}

#[test]
fn for_save_without_staged_recommendation_is_a_warning() {
    let session = RecommendationSession::default();
    let err = session.for_save().unwrap_err();
    assert_eq!(err.level, NoticeLevel::Warning);
}

#[test]
fn stage_overwrites_previous_suggestion() {
    let mut session = RecommendationSession::default();
    session.stage(Recommendation::from_candidate(
        candidate("Blessington"),
        SourceType::Circle,
    ));
    session.stage(Recommendation::from_candidate(
        candidate("Naas"),
        SourceType::County,
    ));
    let last = session.last().expect("staged");
    assert_eq!(last.name.as_deref(), Some("Naas"));
    assert_eq!(last.source_type, SourceType::County);
}

#[test]
fn for_save_does_not_consume_last() {
    let mut session = RecommendationSession::default();
    session.stage(Recommendation::from_candidate(
        candidate("Blessington"),
        SourceType::Polygon,
    ));
    let request = session.for_save().expect("staged");
    assert_eq!(request.source_type, SourceType::Polygon);
    assert!(session.last().is_some(), "save must not clear last");
}

#[test]
fn replace_saved_is_wholesale() {
    let mut session = RecommendationSession::default();
    session.replace_saved(vec![saved(1, SourceType::Circle), saved(2, SourceType::County)]);
    session.replace_saved(vec![saved(3, SourceType::Polygon)]);
    assert_eq!(session.saved().len(), 1);
    assert_eq!(session.saved()[0].id, Some(3));
}

#[test]
fn select_saved_summarises_source_and_reason() {
    let mut session = RecommendationSession::default();
    session.replace_saved(vec![saved(1, SourceType::County)]);
    let (position, summary) = session.select_saved(0).expect("item exists");
    assert!((position.lat - 53.0).abs() < f64::EPSILON);
    assert_eq!(summary, "county: r");
    assert!(session.select_saved(5).is_none());
}
