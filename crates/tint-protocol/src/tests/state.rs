//! Unit tests for the mirrored worker state.

use rstest::{fixture, rstest};

use crate::{Location, WorkerEvent, WorkerState, decode};

#[fixture]
fn state() -> WorkerState {
    WorkerState::default()
}

#[rstest]
fn defaults_before_first_report(state: WorkerState) {
    assert!(!state.enabled);
    assert_eq!(state.temperature_kelvin, 0);
    assert_eq!(state.period, "Unknown");
    assert_eq!(state.location, Location::default());
}

#[rstest]
fn repeated_keys_overwrite_earlier_values(mut state: WorkerState) {
    state.apply(WorkerEvent::Temperature(5000));
    state.apply(WorkerEvent::Temperature(4200));
    assert_eq!(state.temperature_kelvin, 4200);
}

#[rstest]
fn ignored_lines_leave_state_untouched(mut state: WorkerState) {
    let before = state.clone();
    if let Some(event) = decode("garbage line without colon") {
        state.apply(event);
    }
    assert_eq!(state, before);
}

#[rstest]
fn renders_the_status_report(mut state: WorkerState) {
    state.apply(WorkerEvent::Status { enabled: true });
    state.apply(WorkerEvent::Temperature(5000));
    state.apply(WorkerEvent::Period(String::from("Daytime")));
    state.apply(WorkerEvent::Location(Location {
        latitude: 55.7,
        longitude: 12.55,
    }));
    assert_eq!(
        state.to_string(),
        "Status: Enabled\nLocation: 55.7, 12.55\nColor temperature: 5000K\nPeriod: Daytime"
    );
}

#[rstest]
fn location_is_shown_with_reported_precision(mut state: WorkerState) {
    let event = decode("Location: 55.7012, 12.5681").expect("location should decode");
    state.apply(event);
    assert_eq!(state.location.to_string(), "55.7012, 12.5681");
}
