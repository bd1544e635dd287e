//! Command handlers for the CLI.
//!
//! Each handler builds the engine from config, drives the matching
//! controller, and prints whatever notices and navigation the controller
//! reported. The CLI stands in for the rendering layer: event channels are
//! drained to stdout instead of a screen.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};

use tripkit_api::TripApi;
use tripkit_core::AppConfig;
use tripkit_places::{PlacesClient, SessionToken};
use tripkit_planner::{
    MapClick, MapPicker, MemoryTokenStore, NavTarget, Notice, NoticeKind, PickerEvent,
    PlaceSearch, Reconciler, ReconcilerEvent, SearchUpdate, Session, SessionEvent, TokenStore,
    TripStore,
};

/// Clients, session, and store every command starts from.
struct Engine {
    api: Arc<TripApi>,
    places: Arc<PlacesClient>,
    session: Arc<Session>,
    session_events: mpsc::UnboundedReceiver<SessionEvent>,
    store: Arc<Mutex<TripStore>>,
}

fn build_engine(config: &AppConfig) -> anyhow::Result<Engine> {
    let api = Arc::new(TripApi::new(
        &config.api_base_url,
        config.request_timeout_secs,
    )?);
    let places = Arc::new(PlacesClient::new(
        &config.maps_api_base,
        &config.maps_api_key,
        config.request_timeout_secs,
    )?);

    let tokens = Arc::new(MemoryTokenStore::new());
    if let Some(token) = &config.auth_token {
        tokens.set(token);
    }
    let (session, session_events) = Session::new(api.clone(), tokens);

    Ok(Engine {
        api,
        places,
        session: Arc::new(session),
        session_events,
        store: Arc::new(Mutex::new(TripStore::new())),
    })
}

/// Sign in and print the token so later invocations can reuse it.
///
/// # Errors
///
/// Returns an error if the configuration or clients cannot be built; a
/// rejected login is reported as a notice, not an error.
pub(crate) async fn run_login(
    config: &AppConfig,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    let mut engine = build_engine(config)?;

    engine.session.login(email, password).await;
    report_session_events(&mut engine.session_events);

    if let Some(token) = engine.session.token() {
        println!("export TRIPKIT_AUTH_TOKEN={token}");
    }
    Ok(())
}

/// List the signed-in user's trips.
///
/// # Errors
///
/// Returns an error if the trip list request fails.
pub(crate) async fn run_trips(config: &AppConfig) -> anyhow::Result<()> {
    let mut engine = build_engine(config)?;

    engine.session.restore().await;
    report_session_events(&mut engine.session_events);

    let Some(token) = engine.session.token() else {
        println!("not signed in; run `tripkit login` or set TRIPKIT_AUTH_TOKEN");
        return Ok(());
    };

    let trips = engine.api.my_trips(&token).await?;
    if trips.is_empty() {
        println!("no trips yet");
        return Ok(());
    }

    println!("{:<8}NAME", "ID");
    for trip in &trips {
        println!("{:<8}{}", trip.id, trip.name);
    }
    Ok(())
}

/// Run one debounced autocomplete round, optionally geocoding a pick.
///
/// # Errors
///
/// Returns an error if the provider does not answer in time or the pick is
/// out of range.
pub(crate) async fn run_search(
    config: &AppConfig,
    query: &str,
    pick: Option<usize>,
) -> anyhow::Result<()> {
    let engine = build_engine(config)?;
    let (search, mut updates) = PlaceSearch::new(
        engine.places.clone(),
        Duration::from_millis(config.debounce_ms),
    );

    search.input(query).await;

    let deadline = Duration::from_millis(config.debounce_ms + 500)
        + Duration::from_secs(config.request_timeout_secs);
    let suggestions = match tokio::time::timeout(deadline, updates.recv()).await {
        Ok(Some(SearchUpdate::Suggestions(suggestions))) => suggestions,
        Ok(Some(SearchUpdate::Cleared)) => {
            println!("nothing to search for");
            return Ok(());
        }
        Ok(other) => anyhow::bail!("unexpected search update: {other:?}"),
        Err(_) => anyhow::bail!("the places provider did not answer in time"),
    };

    if suggestions.is_empty() {
        println!("no suggestions for '{query}'");
        return Ok(());
    }
    for (index, suggestion) in suggestions.iter().enumerate() {
        println!("{:>2}. {}", index + 1, suggestion.description);
    }

    let Some(pick) = pick else { return Ok(()) };
    let Some(suggestion) = suggestions.get(pick.saturating_sub(1)) else {
        anyhow::bail!(
            "--pick {pick} is out of range ({} suggestions)",
            suggestions.len()
        );
    };

    search.select(suggestion).await;
    while let Ok(update) = updates.try_recv() {
        if let SearchUpdate::Picked(picked) = update {
            println!(
                "picked {} at {} [{}]",
                picked.address, picked.position, picked.place_id
            );
        }
    }
    Ok(())
}

/// Attach a place to a trip through the picker flow: details, duplicate
/// check, attach.
///
/// # Errors
///
/// Returns an error if the place's details cannot be resolved; attach
/// failures are reported as notices.
pub(crate) async fn run_attach(
    config: &AppConfig,
    trip_id: i64,
    place_id: &str,
) -> anyhow::Result<()> {
    let engine = build_engine(config)?;

    // The CLI stands in for the map widget here: it has to look up the
    // marker's position before it can click it.
    let details = engine
        .places
        .place_details(place_id, &SessionToken::new())
        .await?;
    let position = details.geometry.location;
    println!(
        "attaching {} at {}",
        details.name.as_deref().unwrap_or(place_id),
        position
    );

    let (picker, mut events) = MapPicker::new(
        engine.api.clone(),
        engine.places.clone(),
        engine.session.clone(),
        engine.store.clone(),
    );
    picker
        .click(MapClick {
            position,
            place_id: Some(place_id.to_owned()),
        })
        .await;
    picker.choose_trip(trip_id).await;

    report_picker_events(&mut events);
    Ok(())
}

/// Rename a trip through the reconciler.
///
/// # Errors
///
/// Returns an error only if the engine cannot be built.
pub(crate) async fn run_rename(config: &AppConfig, trip_id: i64, name: &str) -> anyhow::Result<()> {
    let engine = build_engine(config)?;
    let (reconciler, mut events) = Reconciler::new(
        engine.api.clone(),
        engine.session.clone(),
        engine.store.clone(),
    );

    reconciler.rename_trip(trip_id, name).await;
    report_reconciler_events(&mut events);
    Ok(())
}

/// Remove a place (by row id) from a trip through the reconciler.
///
/// # Errors
///
/// Returns an error only if the engine cannot be built.
pub(crate) async fn run_remove_place(
    config: &AppConfig,
    trip_id: i64,
    place_id: i64,
) -> anyhow::Result<()> {
    let engine = build_engine(config)?;
    let (reconciler, mut events) = Reconciler::new(
        engine.api.clone(),
        engine.session.clone(),
        engine.store.clone(),
    );

    reconciler.delete_place(trip_id, place_id).await;
    report_reconciler_events(&mut events);
    Ok(())
}

/// Delete a trip through the reconciler.
///
/// # Errors
///
/// Returns an error only if the engine cannot be built.
pub(crate) async fn run_delete_trip(config: &AppConfig, trip_id: i64) -> anyhow::Result<()> {
    let engine = build_engine(config)?;
    let (reconciler, mut events) = Reconciler::new(
        engine.api.clone(),
        engine.session.clone(),
        engine.store.clone(),
    );

    reconciler.delete_trip(trip_id).await;
    report_reconciler_events(&mut events);
    Ok(())
}

fn print_notice(notice: &Notice) {
    match notice.kind {
        NoticeKind::Info | NoticeKind::Success => println!("{}", notice.message),
        NoticeKind::Error => eprintln!("error: {}", notice.message),
    }
}

fn print_navigate(target: NavTarget) {
    let destination = match target {
        NavTarget::Home => "home".to_owned(),
        NavTarget::Login => "login".to_owned(),
        NavTarget::Trips => "trips".to_owned(),
        NavTarget::TripPlaces(id) => format!("trip {id} places"),
    };
    println!("(navigate: {destination})");
}

fn report_session_events(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            SessionEvent::StateChanged(_) => {}
            SessionEvent::Notice(notice) => print_notice(&notice),
            SessionEvent::Navigate(target) => print_navigate(target),
        }
    }
}

fn report_picker_events(rx: &mut mpsc::UnboundedReceiver<PickerEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            PickerEvent::SelectionChanged(_) | PickerEvent::MenuChanged(_) => {}
            PickerEvent::Notice(notice) => print_notice(&notice),
            PickerEvent::Navigate(target) => print_navigate(target),
        }
    }
}

fn report_reconciler_events(rx: &mut mpsc::UnboundedReceiver<ReconcilerEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            ReconcilerEvent::Notice(notice) => print_notice(&notice),
            ReconcilerEvent::Navigate(target) => print_navigate(target),
        }
    }
}
