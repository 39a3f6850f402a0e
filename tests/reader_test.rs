use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use tracewin::error::TraceError;
use tracewin::reader::{build_trace, parse_trace, read_trace_file, RawTrace};
use tracewin::types::Duration;
use tracewin::{LocationId, Trace};

use test_helpers::{assert_laminar, at, flatten};

const TRACE_JSON: &str = r#"{
  "locations": [{ "name": "rank 0", "group": "node-a" }, { "name": "rank 1" }],
  "events": [
    { "location": 0, "enter": "main", "time": 0 },
    { "location": 1, "enter": "main", "time": 10 },
    { "location": 0, "enter": "MPI_Send", "time": 40 },
    { "location": 0, "leave": 60 },
    { "location": 1, "leave": 900 },
    { "location": 0, "leave": 1000 }
  ],
  "communications": [{ "sender": 0, "receiver": 1, "start": 50, "end": 150, "tag": 7 }],
  "collectives": [{ "kind": "barrier", "participants": [1, 0, 1], "start": 10, "end": 20 }]
}"#;

fn check_trace_json_contents(trace: &impl Trace) {
    assert_eq!(trace.start_time(), at(0));
    assert_eq!(trace.runtime(), Duration(1000));

    let locations = trace.locations();
    assert_eq!(locations.len(), 2);
    assert_eq!(locations[0].name, "rank 0");
    assert_eq!(locations[0].group, "node-a");
    assert_eq!(locations[1].group, "");

    let rank0 = flatten(&trace.slots()[&LocationId(0)]);
    let names: Vec<&str> = rank0.iter().map(|slot| &*slot.name).collect();
    assert_eq!(names, vec!["main", "MPI_Send"]);
    assert_eq!((rank0[1].start, rank0[1].end), (at(40), at(60)));
    assert_eq!(trace.slots()[&LocationId(1)].len(), 1);

    let message = &trace.communications()[0];
    assert_eq!((message.sender, message.receiver), (LocationId(0), LocationId(1)));
    assert_eq!(message.tag, 7);

    let collective = &trace.collective_communications()[0];
    assert_eq!(&*collective.kind, "barrier");
    assert_eq!(collective.participants, vec![LocationId(0), LocationId(1)]);
    assert_laminar(trace);
}

#[test]
fn test_parse_json_trace() {
    let trace = parse_trace(TRACE_JSON.as_bytes()).unwrap();
    check_trace_json_contents(&trace);
}

#[test]
fn test_parse_gzipped_trace() {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(TRACE_JSON.as_bytes()).unwrap();
    let compressed = encoder.finish().unwrap();

    let trace = parse_trace(&compressed).unwrap();
    check_trace_json_contents(&trace);
    assert_eq!(trace, parse_trace(TRACE_JSON.as_bytes()).unwrap());
}

#[test]
fn test_read_trace_file() {
    let path = std::env::temp_dir().join(format!("tracewin-reader-{}.json", std::process::id()));
    std::fs::write(&path, TRACE_JSON).unwrap();
    let result = read_trace_file(&path);
    std::fs::remove_file(&path).unwrap();
    check_trace_json_contents(&result.unwrap());

    let missing = std::env::temp_dir().join("tracewin-reader-missing.json");
    let err = read_trace_file(&missing).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to read"));
}

#[test]
fn test_missing_sections_give_empty_trace() {
    let trace = parse_trace(b"{}").unwrap();
    assert!(trace.locations().is_empty());
    assert_eq!(trace.start_time(), at(0));
    assert_eq!(trace.runtime(), Duration::ZERO);
}

#[test]
fn test_invalid_input_is_reported() {
    assert!(parse_trace(b"{ not json").is_err());
    assert!(parse_trace(&[0xff, 0xfe, 0x00]).is_err());
    // Gzip magic followed by garbage.
    assert!(parse_trace(&[0x1f, 0x8b, 0x00, 0x01]).is_err());
}

fn build(json: &str) -> Result<tracewin::FullTrace, TraceError> {
    let raw: RawTrace = serde_json::from_str(json).unwrap();
    build_trace(raw)
}

#[test]
fn test_malformed_events_are_rejected() {
    assert_eq!(
        build(r#"{ "locations": [{ "name": "r" }], "events": [{ "location": 0, "leave": 5 }] }"#),
        Err(TraceError::UnmatchedLeave {
            location: LocationId(0),
            time: at(5)
        })
    );

    assert_eq!(
        build(
            r#"{ "locations": [{ "name": "r" }],
                 "events": [{ "location": 0, "enter": "main", "time": 5 }] }"#
        ),
        Err(TraceError::UnclosedRegion {
            location: LocationId(0),
            name: "main".to_string(),
            start: at(5)
        })
    );

    assert_eq!(
        build(
            r#"{ "locations": [{ "name": "r" }],
                 "events": [{ "location": 0, "enter": "main", "time": 5 },
                            { "location": 0, "leave": 4 }] }"#
        ),
        Err(TraceError::OutOfOrder {
            location: LocationId(0),
            time: at(4),
            previous: at(5)
        })
    );

    assert_eq!(
        build(r#"{ "events": [{ "location": 3, "enter": "main", "time": 0 }] }"#),
        Err(TraceError::UnknownLocation(LocationId(3)))
    );
}

#[test]
fn test_malformed_messages_are_rejected() {
    assert_eq!(
        build(
            r#"{ "locations": [{ "name": "r" }],
                 "communications": [{ "sender": 0, "receiver": 0, "start": 0, "end": 1 }] }"#
        ),
        Err(TraceError::SelfMessage(LocationId(0)))
    );

    assert_eq!(
        build(
            r#"{ "locations": [{ "name": "a" }, { "name": "b" }],
                 "communications": [{ "sender": 0, "receiver": 1, "start": 9, "end": 1 }] }"#
        ),
        Err(TraceError::NegativeDuration {
            start: at(9),
            end: at(1)
        })
    );

    assert_eq!(
        build(
            r#"{ "locations": [{ "name": "a" }],
                 "collectives": [{ "kind": "barrier", "participants": [], "start": 0, "end": 1 }] }"#
        ),
        Err(TraceError::NoParticipants("barrier".to_string()))
    );
}
