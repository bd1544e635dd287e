use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::notify::NoticeKind;
use crate::session::{MemoryTokenStore, TokenStore};
use tripkit_core::{Place, Trip};

struct Harness {
    picker: MapPicker,
    events: mpsc::UnboundedReceiver<PickerEvent>,
    store: Arc<Mutex<TripStore>>,
}

fn make_picker(backend: &MockServer, provider: &MockServer, token: Option<&str>) -> Harness {
    let api = Arc::new(TripApi::new(&backend.uri(), 5).expect("client construction should not fail"));
    let places = Arc::new(
        PlacesClient::new(&provider.uri(), "test-key", 5)
            .expect("client construction should not fail"),
    );
    let tokens = Arc::new(MemoryTokenStore::new());
    if let Some(token) = token {
        tokens.set(token);
    }
    let (session, _session_events) = Session::new(api.clone(), tokens);
    let store = Arc::new(Mutex::new(TripStore::new()));
    let (picker, events) = MapPicker::new(api, places, Arc::new(session), store.clone());
    Harness {
        picker,
        events,
        store,
    }
}

fn drain(rx: &mut mpsc::UnboundedReceiver<PickerEvent>) -> Vec<PickerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn marker_click(place_id: &str) -> MapClick {
    MapClick {
        position: Coordinates::new(-25.44, -49.24),
        place_id: Some(place_id.to_owned()),
    }
}

fn details_body(place_id: &str) -> serde_json::Value {
    json!({
        "status": "OK",
        "result": {
            "place_id": place_id,
            "name": "Jardim Botânico",
            "formatted_address": "Jardim Botânico, Curitiba, PR, Brasil",
            "rating": 4.8,
            "photos": [{"photo_reference": "photo-ref-1"}],
            "geometry": {"location": {"lat": -25.4424, "lng": -49.2402}}
        }
    })
}

async fn mount_details(provider: &MockServer, backend: &MockServer, place_id: &str) {
    Mock::given(method("GET"))
        .and(path("/maps/api/place/details/json"))
        .and(query_param("place_id", place_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(details_body(place_id)))
        .mount(provider)
        .await;
    Mock::given(method("GET"))
        .and(path("/tripPlaces/photo"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"url": "https://img.example/1.jpg"})),
        )
        .mount(backend)
        .await;
}

fn place_row(id: i64, place_id: &str, trip_id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "placeId": place_id,
        "name": "Jardim Botânico",
        "address": "Jardim Botânico, Curitiba, PR, Brasil",
        "latitude": -25.4424,
        "longitude": -49.2402,
        "tripId": trip_id
    })
}

fn trip_body(id: i64, name: &str, places: Vec<serde_json::Value>) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "startDate": "2026-01-10T00:00:00Z",
        "endDate": "2026-01-20T00:00:00Z",
        "places": places
    })
}

fn make_place(id: i64, place_id: &str, trip_id: i64) -> Place {
    Place {
        id,
        place_id: place_id.to_owned(),
        name: "Jardim Botânico".to_owned(),
        address: "Jardim Botânico, Curitiba, PR, Brasil".to_owned(),
        latitude: -25.4424,
        longitude: -49.2402,
        rating: None,
        photo_name: None,
        is_destination: false,
        trip_id,
    }
}

fn make_trip(id: i64, places: Vec<Place>) -> Trip {
    Trip {
        id,
        name: "Southern loop".to_owned(),
        start_date: Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap(),
        end_date: Utc.with_ymd_and_hms(2026, 1, 20, 0, 0, 0).unwrap(),
        places,
        collaborators: None,
    }
}

async fn wait_for_resolved(picker: &MapPicker) -> ResolvedPlace {
    for _ in 0..50 {
        if let Selection::Resolved(place) = picker.selection().await {
            return place;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("selection never resolved: {:?}", picker.selection().await);
}

#[tokio::test]
async fn clicking_a_marker_pins_immediately_then_resolves_details() {
    let backend = MockServer::start().await;
    let provider = MockServer::start().await;
    mount_details(&provider, &backend, "gm-1").await;

    let mut harness = make_picker(&backend, &provider, None);

    harness.picker.click(marker_click("gm-1")).await;

    let resolved = wait_for_resolved(&harness.picker).await;
    assert_eq!(resolved.place_id, "gm-1");
    assert_eq!(resolved.name.as_deref(), Some("Jardim Botânico"));
    assert_eq!(resolved.photo_url.as_deref(), Some("https://img.example/1.jpg"));
    assert_eq!(resolved.position, Coordinates::new(-25.4424, -49.2402));

    let events = drain(&mut harness.events);
    assert!(
        matches!(
            &events[0],
            PickerEvent::SelectionChanged(Selection::Pending { place_id, .. })
                if place_id == "gm-1"
        ),
        "got: {events:?}"
    );
    assert!(
        matches!(
            events.last(),
            Some(PickerEvent::SelectionChanged(Selection::Resolved(_)))
        ),
        "got: {events:?}"
    );
}

#[tokio::test]
async fn failed_details_leave_the_pin_usable() {
    let backend = MockServer::start().await;
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/api/place/details/json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&provider)
        .await;

    let mut harness = make_picker(&backend, &provider, None);

    harness.picker.click(marker_click("gm-1")).await;
    tokio::time::sleep(Duration::from_millis(150)).await;

    match harness.picker.selection().await {
        Selection::Pending { place_id, position } => {
            assert_eq!(place_id, "gm-1");
            assert_eq!(position, Coordinates::new(-25.44, -49.24));
        }
        other => panic!("expected pending selection, got: {other:?}"),
    }

    let events = drain(&mut harness.events);
    assert!(
        !events.iter().any(|e| matches!(e, PickerEvent::Notice(_))),
        "a failed details fetch should stay quiet, got: {events:?}"
    );
}

#[tokio::test]
async fn clicking_bare_ground_clears_the_selection() {
    let backend = MockServer::start().await;
    let provider = MockServer::start().await;
    mount_details(&provider, &backend, "gm-1").await;

    let mut harness = make_picker(&backend, &provider, None);

    harness.picker.click(marker_click("gm-1")).await;
    wait_for_resolved(&harness.picker).await;

    harness
        .picker
        .click(MapClick {
            position: Coordinates::new(-25.5, -49.3),
            place_id: None,
        })
        .await;

    assert_eq!(harness.picker.selection().await, Selection::Idle);
    assert_eq!(harness.picker.menu().await, TripMenu::Closed);

    let events = drain(&mut harness.events);
    assert!(
        matches!(
            events[events.len() - 2],
            PickerEvent::SelectionChanged(Selection::Idle)
        ),
        "got: {events:?}"
    );
}

#[tokio::test]
async fn a_second_click_discards_the_first_details_fetch() {
    let backend = MockServer::start().await;
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/api/place/details/json"))
        .and(query_param("place_id", "gm-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(300))
                .set_body_json(details_body("gm-1")),
        )
        .mount(&provider)
        .await;
    mount_details(&provider, &backend, "gm-2").await;

    let mut harness = make_picker(&backend, &provider, None);

    harness.picker.click(marker_click("gm-1")).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    harness.picker.click(marker_click("gm-2")).await;

    let resolved = wait_for_resolved(&harness.picker).await;
    assert_eq!(resolved.place_id, "gm-2");

    // Let the delayed gm-1 response land; it must be discarded.
    tokio::time::sleep(Duration::from_millis(400)).await;
    match harness.picker.selection().await {
        Selection::Resolved(place) => assert_eq!(place.place_id, "gm-2"),
        other => panic!("expected gm-2 to stay selected, got: {other:?}"),
    }

    let events = drain(&mut harness.events);
    let resolved_ids: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            PickerEvent::SelectionChanged(Selection::Resolved(p)) => Some(p.place_id.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(resolved_ids, vec!["gm-2".to_owned()], "got: {events:?}");
}

#[tokio::test]
async fn open_menu_without_a_selection_does_nothing() {
    let backend = MockServer::start().await;
    let provider = MockServer::start().await;
    let harness = make_picker(&backend, &provider, Some("tok-1"));

    harness.picker.open_menu().await;

    assert_eq!(harness.picker.menu().await, TripMenu::Closed);
    let requests = backend
        .received_requests()
        .await
        .expect("request recording enabled");
    assert!(requests.is_empty(), "got: {requests:?}");
}

#[tokio::test]
async fn open_menu_without_a_token_asks_for_sign_in() {
    let backend = MockServer::start().await;
    let provider = MockServer::start().await;
    let harness = make_picker(&backend, &provider, None);

    harness.picker.click(marker_click("gm-1")).await;
    harness.picker.open_menu().await;

    assert_eq!(harness.picker.menu().await, TripMenu::AuthRequired);
    let requests = backend
        .received_requests()
        .await
        .expect("request recording enabled");
    assert!(requests.is_empty(), "got: {requests:?}");
}

#[tokio::test]
async fn open_menu_lists_the_users_trips() {
    let backend = MockServer::start().await;
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trips/myTrips"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            trip_body(7, "Southern loop", vec![]),
            trip_body(9, "Beach week", vec![]),
        ])))
        .expect(1)
        .mount(&backend)
        .await;

    let mut harness = make_picker(&backend, &provider, Some("tok-1"));

    harness.picker.click(marker_click("gm-1")).await;
    harness.picker.open_menu().await;

    match harness.picker.menu().await {
        TripMenu::Open(trips) => {
            assert_eq!(trips.len(), 2);
            assert_eq!(
                trips[0],
                TripSummary {
                    id: 7,
                    name: "Southern loop".to_owned()
                }
            );
        }
        other => panic!("expected an open menu, got: {other:?}"),
    }

    let events = drain(&mut harness.events);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, PickerEvent::MenuChanged(TripMenu::Loading))),
        "got: {events:?}"
    );
    assert!(
        matches!(
            events.last(),
            Some(PickerEvent::MenuChanged(TripMenu::Open(_)))
        ),
        "got: {events:?}"
    );
}

#[tokio::test]
async fn choose_trip_skips_the_attach_when_the_place_is_already_there() {
    let backend = MockServer::start().await;
    let provider = MockServer::start().await;

    let mut harness = make_picker(&backend, &provider, Some("tok-1"));
    harness
        .store
        .lock()
        .await
        .insert(make_trip(7, vec![make_place(1, "gm-1", 7)]));

    harness.picker.click(marker_click("gm-1")).await;
    harness.picker.choose_trip(7).await;

    let requests = backend
        .received_requests()
        .await
        .expect("request recording enabled");
    assert!(
        requests.is_empty(),
        "a duplicate must not reach the backend, got: {requests:?}"
    );

    assert!(
        matches!(harness.picker.selection().await, Selection::Pending { .. }),
        "the pin should survive a duplicate"
    );
    assert_eq!(harness.picker.menu().await, TripMenu::Closed);

    let events = drain(&mut harness.events);
    assert!(
        events.iter().any(|e| matches!(
            e,
            PickerEvent::Notice(n)
                if n.kind == NoticeKind::Info
                    && n.message == "This place is already in that trip."
        )),
        "got: {events:?}"
    );
}

#[tokio::test]
async fn choose_trip_fetches_uncached_places_before_the_duplicate_check() {
    let backend = MockServer::start().await;
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tripPlaces/7"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(trip_body(
            7,
            "Southern loop",
            vec![place_row(1, "gm-1", 7)],
        )))
        .expect(1)
        .mount(&backend)
        .await;

    let mut harness = make_picker(&backend, &provider, Some("tok-1"));

    harness.picker.click(marker_click("gm-1")).await;
    harness.picker.choose_trip(7).await;

    let requests = backend
        .received_requests()
        .await
        .expect("request recording enabled");
    assert_eq!(requests.len(), 1, "got: {requests:?}");
    assert_eq!(requests[0].url.path(), "/tripPlaces/7");

    assert!(harness.store.lock().await.contains(7));

    let events = drain(&mut harness.events);
    assert!(
        events.iter().any(|e| matches!(
            e,
            PickerEvent::Notice(n) if n.message == "This place is already in that trip."
        )),
        "got: {events:?}"
    );
}

#[tokio::test]
async fn choose_trip_attaches_and_navigates_to_the_trip() {
    let backend = MockServer::start().await;
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tripPlaces"))
        .and(header("authorization", "Bearer tok-1"))
        .and(body_json(json!({"placeId": "gm-1", "tripId": 7})))
        .respond_with(ResponseTemplate::new(201).set_body_json(place_row(42, "gm-1", 7)))
        .expect(1)
        .mount(&backend)
        .await;

    let mut harness = make_picker(&backend, &provider, Some("tok-1"));
    harness.store.lock().await.insert(make_trip(7, vec![]));

    harness.picker.click(marker_click("gm-1")).await;
    harness.picker.choose_trip(7).await;

    assert!(harness.store.lock().await.has_place(7, "gm-1"));
    assert_eq!(harness.picker.selection().await, Selection::Idle);
    assert_eq!(harness.picker.menu().await, TripMenu::Closed);

    let events = drain(&mut harness.events);
    assert!(
        events.iter().any(|e| matches!(
            e,
            PickerEvent::Notice(n)
                if n.kind == NoticeKind::Success && n.message == "Place added to the trip."
        )),
        "got: {events:?}"
    );
    assert!(
        matches!(
            events.last(),
            Some(PickerEvent::Navigate(NavTarget::TripPlaces(7)))
        ),
        "got: {events:?}"
    );
}

#[tokio::test]
async fn choose_trip_failure_keeps_the_selection() {
    let backend = MockServer::start().await;
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tripPlaces"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .mount(&backend)
        .await;

    let mut harness = make_picker(&backend, &provider, Some("tok-1"));
    harness.store.lock().await.insert(make_trip(7, vec![]));

    harness.picker.click(marker_click("gm-1")).await;
    harness.picker.choose_trip(7).await;

    assert!(
        matches!(harness.picker.selection().await, Selection::Pending { .. }),
        "the pin should survive a failed attach"
    );
    assert!(!harness.store.lock().await.has_place(7, "gm-1"));

    let events = drain(&mut harness.events);
    assert!(
        events.iter().any(|e| matches!(
            e,
            PickerEvent::Notice(n) if n.kind == NoticeKind::Error && n.message == "boom"
        )),
        "got: {events:?}"
    );
    assert!(
        !events.iter().any(|e| matches!(e, PickerEvent::Navigate(_))),
        "failure should not navigate, got: {events:?}"
    );
}

#[tokio::test]
async fn choose_trip_without_a_token_goes_to_login() {
    let backend = MockServer::start().await;
    let provider = MockServer::start().await;
    let mut harness = make_picker(&backend, &provider, None);

    harness.picker.click(marker_click("gm-1")).await;
    harness.picker.choose_trip(7).await;

    assert_eq!(harness.picker.selection().await, Selection::Idle);

    let requests = backend
        .received_requests()
        .await
        .expect("request recording enabled");
    assert!(requests.is_empty(), "got: {requests:?}");

    let events = drain(&mut harness.events);
    assert!(
        matches!(events.last(), Some(PickerEvent::Navigate(NavTarget::Login))),
        "got: {events:?}"
    );
}
