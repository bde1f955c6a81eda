//! End-to-end session tests: clicks and mode switches driven against a
//! wiremock stand-in for the car-wash service.

use washmap_api::types::SourceType;
use washmap_api::WashmapClient;
use washmap_app::recommend::Recommendation;
use washmap_app::state::{RecommendMode, ViewportFit};
use washmap_app::{BusinessParams, Mode, Session};
use washmap_core::{LatLng, NoticeLevel};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn params() -> BusinessParams {
    BusinessParams {
        radius_km: 10.0,
        min_distance_km: 5.0,
        max_settlement_distance_km: 10.0,
        competition_radius_km: 3.0,
    }
}

fn point(lat: f64, lng: f64) -> LatLng {
    LatLng::new(lat, lng).expect("valid test coordinate")
}

fn user_session(server: &MockServer) -> Session {
    let client =
        WashmapClient::new(&server.uri(), 30, "washmap-test/0.1").expect("client construction");
    Session::new(client, params())
}

/// Mounts the three responses every business-mode entry needs: county
/// boundaries, wash counts, and the saved list (whose response also seeds
/// the csrftoken cookie, as any Django GET would).
async fn mount_business_bootstrap(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/counties.geojson"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "id": 7,
                "geometry": { "type": "Polygon", "coordinates": [[
                    [-9.0, 51.5], [-8.0, 51.5], [-8.0, 52.5], [-9.0, 51.5]
                ]]},
                "properties": { "name_en": "Cork", "name_ga": "Corcaigh" }
            }]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/county_wash_counts/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "counts": [{ "id": 7, "name": "Cork", "wash_count": 12 }]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/recommendations/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "csrftoken=testtoken; Path=/")
                .set_body_json(serde_json::json!({ "recommendations": [] })),
        )
        .mount(server)
        .await;
}

async fn business_session(server: &MockServer, tool: RecommendMode) -> Session {
    mount_business_bootstrap(server).await;
    let mut session = user_session(server);
    session.state.set_authenticated(true);
    let notices = session.set_mode(Mode::Business).await;
    assert!(notices.is_empty(), "bootstrap should succeed: {notices:?}");
    session.state.set_recommend_mode(tool);
    session
}

#[tokio::test]
async fn user_click_hits_both_lookups_and_places_markers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/nearest/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "location": { "name": "Shiny Suds", "lat": 53.35, "lng": -6.26 },
            "distance": 1.27
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/nearby/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "carwashes": [
                { "name": "Shiny Suds", "lat": 53.35, "lng": -6.26, "distance_km": 1.27 },
                { "name": "Wash&Go", "lat": 53.30, "lng": -6.30, "distance_km": 3.4 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = user_session(&server);
    let notices = session.click(point(53.3, -6.2)).await;

    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Success);
    assert!(notices[0].message.contains("Shiny Suds"));
    assert_eq!(session.state.nearby.len(), 2);
    assert!(session.state.artifacts.click_marker.is_some());
    assert_eq!(
        session.state.artifacts.nearest_marker,
        Some(point(53.35, -6.26))
    );
}

#[tokio::test]
async fn empty_database_yields_info_notice_and_no_marker() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/nearest/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "location": null })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/nearby/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "carwashes": [] })),
        )
        .mount(&server)
        .await;

    let mut session = user_session(&server);
    let notices = session.click(point(53.3, -6.2)).await;

    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Info);
    assert_eq!(notices[0].message, "No car wash found nearby.");
    assert!(session.state.artifacts.nearest_marker.is_none());
    // The click marker still lands.
    assert!(session.state.artifacts.click_marker.is_some());
}

#[tokio::test]
async fn business_mode_is_refused_without_login() {
    let server = MockServer::start().await;
    let mut session = user_session(&server);
    let notices = session.set_mode(Mode::Business).await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
    assert_eq!(session.state.mode, Mode::User);
}

#[tokio::test]
async fn business_entry_loads_county_data_once() {
    let server = MockServer::start().await;
    let mut session = business_session(&server, RecommendMode::County).await;
    assert_eq!(session.state.counties.len(), 1);
    assert_eq!(session.state.wash_counts.len(), 1);
    assert!(session.state.county_data_loaded());

    // Re-entering must not fetch boundaries again; only the saved list.
    session.set_mode(Mode::User).await;
    session.set_mode(Mode::Business).await;
    let requests = server
        .received_requests()
        .await
        .expect("request recording enabled");
    let boundary_fetches = requests
        .iter()
        .filter(|r| r.url.path() == "/counties.geojson")
        .count();
    assert_eq!(boundary_fetches, 1);
}

#[tokio::test]
async fn failed_county_load_is_reported_and_retried_on_reentry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/counties.geojson"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/county_wash_counts/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "counts": [] })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/recommendations/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "recommendations": [] })),
        )
        .mount(&server)
        .await;

    let mut session = user_session(&server);
    session.state.set_authenticated(true);
    let notices = session.set_mode(Mode::Business).await;

    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Danger);
    assert_eq!(notices[0].message, "Failed to load county boundaries.");
    assert!(!session.state.county_data_loaded());
}

#[tokio::test]
async fn circle_click_fetches_and_stages_a_recommendation() {
    let server = MockServer::start().await;
    let mut session = business_session(&server, RecommendMode::Circle).await;

    Mock::given(method("GET"))
        .and(path("/api/recommend_circle/"))
        .and(query_param("radius_km", "10"))
        .and(query_param("min_distance_km", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "recommendations": [{
                "lat": 53.1, "lng": -6.5, "name": "Blessington",
                "reason": "Recommended location inside selected circle"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let notices = session.click(point(53.3, -6.2)).await;

    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Success);
    let staged = session.state.recommendations.last().expect("staged");
    assert_eq!(staged.source_type, SourceType::Circle);
    assert_eq!(staged.name.as_deref(), Some("Blessington"));
    assert_eq!(
        session.state.artifacts.recommendation_marker,
        Some(point(53.1, -6.5))
    );
    assert!(session.state.artifacts.circle.is_some());
}

#[tokio::test]
async fn empty_recommendation_list_is_an_info_notice() {
    let server = MockServer::start().await;
    let mut session = business_session(&server, RecommendMode::Circle).await;

    Mock::given(method("GET"))
        .and(path("/api/recommend_circle/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "recommendations": []
        })))
        .mount(&server)
        .await;

    let notices = session.click(point(53.3, -6.2)).await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Info);
    assert!(session.state.recommendations.last().is_none());
    assert!(session.state.artifacts.recommendation_marker.is_none());
}

#[tokio::test]
async fn county_click_scopes_the_request_to_the_county() {
    let server = MockServer::start().await;
    let mut session = business_session(&server, RecommendMode::County).await;

    Mock::given(method("GET"))
        .and(path("/api/recommend_county/"))
        .and(query_param("county_id", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "recommendations": [{
                "lat": 51.9, "lng": -8.5, "name": "Macroom",
                "reason": "Recommended location in Cork"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let county = session.state.counties[0].clone();
    let notices = session.county_click(&county).await;

    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Success);
    let staged = session.state.recommendations.last().expect("staged");
    assert_eq!(staged.source_type, SourceType::County);
}

#[tokio::test]
async fn polygon_finish_posts_exactly_once_and_clears_the_draft() {
    let server = MockServer::start().await;
    let mut session = business_session(&server, RecommendMode::Polygon).await;
    session.state.start_polygon_drawing();

    Mock::given(method("POST"))
        .and(path("/api/recommend_polygon/"))
        .and(header("X-CSRFToken", "testtoken"))
        .and(body_partial_json(serde_json::json!({
            "min_distance_km": 5.0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "lat": 53.35, "lng": -6.25, "name": "Best Settlement",
            "reason": "Best settlement inside selected polygon"
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Clicks are captured as vertices; no lookup fires.
    assert!(session.click(point(53.3, -6.3)).await.is_empty());
    assert!(session.click(point(53.3, -6.2)).await.is_empty());
    assert!(session.click(point(53.4, -6.2)).await.is_empty());

    let notices = session.finish_polygon().await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Success);
    let staged = session.state.recommendations.last().expect("staged");
    assert_eq!(staged.source_type, SourceType::Polygon);
    assert_eq!(session.state.drawing.vertex_count(), 0);
    assert!(!session.state.drawing.is_active());
}

#[tokio::test]
async fn short_polygon_is_rejected_locally_and_the_draft_survives() {
    let server = MockServer::start().await;
    let mut session = business_session(&server, RecommendMode::Polygon).await;
    session.state.start_polygon_drawing();

    Mock::given(method("POST"))
        .and(path("/api/recommend_polygon/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    session.click(point(53.3, -6.3)).await;
    session.click(point(53.3, -6.2)).await;

    let notices = session.finish_polygon().await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
    assert_eq!(session.state.drawing.vertex_count(), 2, "draft kept");
    assert!(session.state.drawing.is_active());
}

#[tokio::test]
async fn save_without_a_staged_recommendation_sends_nothing() {
    let server = MockServer::start().await;
    let mut session = business_session(&server, RecommendMode::Circle).await;

    Mock::given(method("POST"))
        .and(path("/api/recommendations/save/"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let notices = session.save_last().await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
    assert_eq!(notices[0].message, "No recommendation to save yet.");
}

#[tokio::test]
async fn save_persists_and_reloads_the_saved_list() {
    let server = MockServer::start().await;
    let mut session = business_session(&server, RecommendMode::Circle).await;

    Mock::given(method("POST"))
        .and(path("/api/recommendations/save/"))
        .and(header("X-CSRFToken", "testtoken"))
        .and(body_partial_json(serde_json::json!({
            "lat": 53.1, "lng": -6.5, "source_type": "circle"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 7, "lat": 53.1, "lng": -6.5, "source_type": "circle",
            "reason": "Recommended location inside selected circle",
            "created_at": "2025-11-02T10:15:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;
    // Outranks the bootstrap mock that answered the initial (empty)
    // saved-list fetch.
    Mock::given(method("GET"))
        .and(path("/api/recommendations/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "recommendations": [{
                "id": 7, "lat": 53.1, "lng": -6.5, "source_type": "circle",
                "reason": "Recommended location inside selected circle",
                "created_at": "2025-11-02T10:15:00Z"
            }]
        })))
        .with_priority(1)
        .mount(&server)
        .await;

    session.state.recommendations.stage(Recommendation {
        lat: 53.1,
        lng: -6.5,
        source_type: SourceType::Circle,
        reason: "Recommended location inside selected circle".to_owned(),
        name: Some("Blessington".to_owned()),
        population: None,
        min_distance_to_carwash_km: None,
        nearby_settlements: None,
    });

    let notices = session.save_last().await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Success);
    assert_eq!(session.state.recommendations.saved().len(), 1);
    // Saving does not consume the staged recommendation.
    assert!(session.state.recommendations.last().is_some());
}

#[tokio::test]
async fn server_worded_refusals_surface_verbatim_as_warnings() {
    let server = MockServer::start().await;
    let mut session = business_session(&server, RecommendMode::County).await;

    Mock::given(method("GET"))
        .and(path("/api/recommend_county/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": "County not found"
        })))
        .mount(&server)
        .await;

    let county = session.state.counties[0].clone();
    let notices = session.county_click(&county).await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
    assert_eq!(notices[0].message, "County not found");
    assert!(session.state.recommendations.last().is_none());
}

#[tokio::test]
async fn selecting_a_carwash_fetches_the_mode_specific_advisory() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/weather/"))
        .and(query_param("lon", "-6.260000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "temp": 11.5, "description": "light rain", "good_for_wash": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = user_session(&server);
    let target = point(53.35, -6.26);
    let notices = session.select_carwash(target).await;
    assert!(notices.is_empty());
    // Selecting from the nearby list recenters on the selected wash.
    assert_eq!(session.state.artifacts.fit, Some(ViewportFit::Point(target)));
    let weather = session.state.weather.as_ref().expect("weather stored");
    assert!(!weather.good_for_wash);

    Mock::given(method("GET"))
        .and(path("/api/competition/"))
        .and(query_param("radius", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "competitor_count": 9, "saturation_level": "high", "radius_km": 3.0
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_business_bootstrap(&server).await;
    session.state.set_authenticated(true);
    session.set_mode(Mode::Business).await;

    let notices = session.select_carwash(target).await;
    assert!(notices.is_empty());
    assert_eq!(session.state.artifacts.fit, Some(ViewportFit::Point(target)));
    let competition = session.state.competition.as_ref().expect("stored");
    assert_eq!(competition.competitor_count, 9);
}

#[tokio::test]
async fn login_marks_the_session_authenticated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/mobile_login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "tok-123",
            "user": { "username": "biz" }
        })))
        .mount(&server)
        .await;

    let mut session = user_session(&server);
    let notices = session.login("biz", "hunter2").await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Success);
    assert!(session.state.is_authenticated());
    assert_eq!(session.client().auth_token(), Some("tok-123"));
}

#[tokio::test]
async fn failed_login_leaves_the_session_unauthenticated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/mobile_login/"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let mut session = user_session(&server);
    let notices = session.login("biz", "wrong").await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Danger);
    assert!(!session.state.is_authenticated());
}
