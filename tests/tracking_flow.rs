use crux_core::testing::AppTester;

use poimap_shared::capabilities::{LocationOperation, PermissionState};
use poimap_shared::event::Event;
use poimap_shared::model::Model;
use poimap_shared::{App, Effect};

fn location_ops(effects: &[Effect]) -> Vec<LocationOperation> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Location(req) => Some(req.operation),
            _ => None,
        })
        .collect()
}

#[test]
fn session_start_requests_location_permission() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(Event::Started, &mut model);

    assert_eq!(
        location_ops(&update.effects),
        vec![LocationOperation::RequestPermission]
    );
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Render(_))));
}

#[test]
fn granted_authorization_starts_updates() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(
        Event::AuthorizationChanged(PermissionState::AuthorizedWhenInUse),
        &mut model,
    );

    assert_eq!(
        location_ops(&update.effects),
        vec![LocationOperation::StartUpdates]
    );
    assert!(model.permission.is_authorized());
}

#[test]
fn denied_authorization_is_reported_once_and_session_stays_live() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(
        Event::AuthorizationChanged(PermissionState::Denied),
        &mut model,
    );
    assert!(location_ops(&update.effects).is_empty());
    assert!(model.permission_denial_reported);

    // The session keeps rendering; a repeat denial is not re-reported.
    let update = app.update(
        Event::AuthorizationChanged(PermissionState::Restricted),
        &mut model,
    );
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Render(_))));

    let view = app.view(&model);
    assert_eq!(view.map_latitude_span, 0.02);
    assert!(view.markers.is_empty());
    assert_eq!(
        view.error.as_ref().map(|e| e.code.as_str()),
        Some("LOCATION_PERMISSION_DENIED")
    );
}

#[test]
fn first_fix_after_enabling_tracking_recenters_the_map() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(Event::LocationUpdated { lat: 48.1, lon: 11.5 }, &mut model);

    assert_eq!(model.region.center.lat(), 48.1);
    assert_eq!(model.region.center.lon(), 11.5);
    assert_eq!(model.region.latitude_span, 0.02);
    assert_eq!(model.region.longitude_span, 0.02);

    // Further fixes do not recenter, so free panning stays possible.
    app.update(Event::LocationUpdated { lat: 48.2, lon: 11.6 }, &mut model);
    assert_eq!(model.region.center.lat(), 48.1);
    assert_eq!(model.location.map(|c| c.lat()), Some(48.2));
}

#[test]
fn toggling_tracking_rearms_the_recenter() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(Event::LocationUpdated { lat: 48.1, lon: 11.5 }, &mut model);
    assert!(!model.recenter_on_next_fix);

    let update = app.update(Event::TrackingToggled, &mut model);
    assert!(!model.tracking_enabled);
    assert_eq!(
        location_ops(&update.effects),
        vec![LocationOperation::StopUpdates]
    );

    let update = app.update(Event::TrackingToggled, &mut model);
    assert!(model.tracking_enabled);
    assert!(model.recenter_on_next_fix);
    assert_eq!(
        location_ops(&update.effects),
        vec![LocationOperation::StartUpdates]
    );

    app.update(Event::LocationUpdated { lat: 50.0, lon: 8.0 }, &mut model);
    assert_eq!(model.region.center.lat(), 50.0);
}

#[test]
fn toggling_tracking_does_not_trigger_a_fetch() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(Event::LocationUpdated { lat: 48.1, lon: 11.5 }, &mut model);
    let update = app.update(Event::TrackingToggled, &mut model);

    assert!(!update
        .effects
        .iter()
        .any(|e| matches!(e, Effect::Http(_) | Effect::Timer(_))));
}

#[test]
fn invalid_location_updates_are_ignored() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(Event::LocationUpdated { lat: 91.0, lon: 0.0 }, &mut model);
    app.update(
        Event::LocationUpdated {
            lat: f64::NAN,
            lon: 13.4,
        },
        &mut model,
    );

    assert!(model.location.is_none());
    assert_eq!(model.region.center.lat(), 0.0);
}
