//! End-to-end checks of the public location API.

use geolog::{decode, encode, LocationRecord, Presence, Source};

#[test]
fn gps_fix_survives_the_wire() {
    let mut record = LocationRecord::new();
    record
        .set_lat_lon(1_700_000_000_000, 37.774_900_0, -122.419_400_0, 5.0)
        .set_source(Source::Gps);

    let decoded = decode(&encode(&record)).unwrap();
    let fix = decoded.lat_lon().unwrap();

    assert_eq!(fix.timestamp_ms, 1_700_000_000_000);
    assert!((fix.latitude_deg - 37.774_9).abs() <= 1e-7);
    assert!((fix.longitude_deg + 122.419_4).abs() <= 1e-7);
    assert!((fix.horizontal_accuracy_m - 5.0).abs() <= 0.01);
    assert_eq!(decoded.source(), Some(Source::Gps));

    let debug = decoded.to_debug_string();
    assert!(debug.contains("utc=1700000000000,lat=37.7749000,lon=-122.4194000,acc=5.00"));
    assert!(debug.contains(",src=GPS"));
}

#[test]
fn empty_record_is_one_byte() {
    let bytes = encode(&LocationRecord::new());
    assert_eq!(bytes, vec![0]);

    let decoded = decode(&bytes).unwrap();
    assert_eq!(decoded.presence(), Presence::empty());
    assert!(decoded.is_empty());
    assert_eq!(decoded.to_debug_string(), "<>");
}

#[test]
fn speed_only_record_is_three_bytes() {
    let mut record = LocationRecord::new();
    record.set_speed(12.34);

    let bytes = encode(&record);
    assert_eq!(bytes.len(), 3);

    let decoded = decode(&bytes).unwrap();
    assert!((decoded.speed().unwrap() - 12.34).abs() <= 0.01);
    assert!(decoded.lat_lon().is_none());
}

#[test]
fn stored_event_keeps_its_location() {
    let journal = geolog::EventJournal::open_in_memory().unwrap();
    let mut fix = LocationRecord::new();
    fix.set_lat_lon(1_700_000_000_000, 52.52, 13.405, 12.5)
        .set_source(Source::Network)
        .set_speed(1.5);

    let id = journal
        .record(&geolog::Event::new("checkin").with_value("cafe").at_location(fix))
        .unwrap();
    let stored = journal.get(id).unwrap().unwrap();
    let location = stored.location.unwrap();

    assert_eq!(location.presence(), fix.presence());
    assert_eq!(location.source(), Some(Source::Network));
    assert!((location.speed().unwrap() - 1.5).abs() <= 0.01);
    assert!((location.lat_lon().unwrap().latitude_deg - 52.52).abs() <= 1e-7);
}
