//! Unit tests for report line decoding.

use rstest::rstest;

use crate::{Location, Record, WorkerEvent, decode, parse_record};

#[rstest]
#[case("Status: Disabled", WorkerEvent::Status { enabled: false })]
#[case("Status: Enabled", WorkerEvent::Status { enabled: true })]
#[case("Color temperature: 4500K", WorkerEvent::Temperature(4500))]
#[case("Color temperature: 6500", WorkerEvent::Temperature(6500))]
#[case("Color temperature: 4500KK", WorkerEvent::Temperature(4500))]
#[case("Period: Night", WorkerEvent::Period(String::from("Night")))]
#[case("Period: Transition (42.05% day)", WorkerEvent::Period(String::from("Transition (42.05% day)")))]
#[case(
    "Location: 51.50, -0.12",
    WorkerEvent::Location(Location { latitude: 51.50, longitude: -0.12 })
)]
fn decodes_recognised_keys(#[case] line: &str, #[case] expected: WorkerEvent) {
    assert_eq!(decode(line), Some(expected));
}

#[rstest]
fn any_status_other_than_disabled_means_enabled() {
    assert_eq!(
        decode("Status: Suspended"),
        Some(WorkerEvent::Status { enabled: true })
    );
}

#[rstest]
#[case("garbage line without colon")]
#[case("")]
#[case("Status:Enabled")]
#[case("Status: ")]
#[case(": value without key")]
#[case("Key-with-dash: value")]
fn malformed_lines_yield_no_event(#[case] line: &str) {
    assert_eq!(decode(line), None);
}

#[rstest]
#[case("Brightness: 0.80")]
#[case("Color temperature: warmK")]
#[case("Location: north")]
#[case("Location: 51.50,-0.12")]
fn unknown_or_unparseable_records_yield_no_event(#[case] line: &str) {
    assert_eq!(decode(line), None);
}

#[rstest]
fn record_splits_at_the_first_separator() {
    assert_eq!(
        parse_record("Period: Night: late"),
        Some(Record {
            key: "Period",
            value: "Night: late",
        })
    );
}

#[rstest]
fn record_keys_may_contain_spaces_and_digits() {
    assert_eq!(
        parse_record("Gamma 2 value: 0.9"),
        Some(Record {
            key: "Gamma 2 value",
            value: "0.9",
        })
    );
}
