use super::*;

fn point(lat: f64, lng: f64) -> LatLng {
    LatLng::new(lat, lng).expect("valid test coordinate")
}

#[test]
fn vertices_are_stored_lng_first() {
    let mut session = DrawingSession::default();
    session.start();
    session.add_point(point(53.3, -6.2));
    let submission = {
        session.add_point(point(53.4, -6.3));
        session.add_point(point(53.5, -6.1));
        session.finish(5.0).expect("three vertices")
    };
    assert_eq!(submission.ring[0], vec![-6.2, 53.3]);
}

#[test]
fn finish_is_noop_below_three_vertices() {
    let mut session = DrawingSession::default();
    session.start();
    session.add_point(point(53.3, -6.2));
    session.add_point(point(53.4, -6.3));
    assert!(!session.can_finish());
    assert!(session.finish(5.0).is_none());
    assert!(session.polygon_overlay().is_none());
}

#[test]
fn finish_becomes_available_exactly_at_three() {
    let mut session = DrawingSession::default();
    session.start();
    session.add_point(point(53.3, -6.2));
    assert!(!session.can_finish());
    session.add_point(point(53.4, -6.3));
    assert!(!session.can_finish());
    session.add_point(point(53.5, -6.1));
    assert!(session.can_finish());
}

#[test]
fn finish_closes_ring_in_click_order() {
    let mut session = DrawingSession::default();
    session.start();
    session.add_point(point(53.3, -6.3));
    session.add_point(point(53.3, -6.2));
    session.add_point(point(53.4, -6.2));
    let submission = session.finish(7.5).expect("should finish");
    assert_eq!(
        submission.ring,
        vec![
            vec![-6.3, 53.3],
            vec![-6.2, 53.3],
            vec![-6.2, 53.4],
            vec![-6.3, 53.3],
        ]
    );
    assert!((submission.min_distance_km - 7.5).abs() < f64::EPSILON);
    assert!(session.polygon_overlay().is_some());
}

#[test]
fn clear_is_idempotent() {
    let mut session = DrawingSession::default();
    session.start();
    session.add_point(point(53.3, -6.2));
    session.add_point(point(53.4, -6.3));
    session.add_point(point(53.5, -6.1));
    let _ = session.finish(5.0);

    session.clear();
    assert_eq!(session.vertex_count(), 0);
    assert!(session.vertex_markers().is_empty());
    assert!(session.polygon_overlay().is_none());
    assert!(!session.is_active());

    session.clear();
    assert_eq!(session.vertex_count(), 0);
    assert!(session.vertex_markers().is_empty());
    assert!(session.polygon_overlay().is_none());
    assert!(!session.is_active());
}

#[test]
fn start_discards_previous_draft() {
    let mut session = DrawingSession::default();
    session.start();
    session.add_point(point(53.3, -6.2));
    session.start();
    assert_eq!(session.vertex_count(), 0);
    assert!(session.is_active());
}
