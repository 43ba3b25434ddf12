//! Property tests for the location codec.

use geolog::location::{
    decode, encode, DecodeError, LocationRecord, Presence, Source, DEGREE_SCALE, METRIC_SCALE,
};
use proptest::prelude::*;

const DEGREE_TOLERANCE: f64 = 1.0 / DEGREE_SCALE + 1e-12;
const METRIC_TOLERANCE: f64 = 1.0 / METRIC_SCALE + 1e-9;

fn arb_source() -> impl Strategy<Value = Source> {
    prop_oneof![
        Just(Source::Unknown),
        Just(Source::Gps),
        Just(Source::Network),
        Just(Source::Passive),
    ]
}

#[derive(Debug, Clone)]
struct Reading {
    lat_lon: Option<(u64, f64, f64, f64)>,
    source: Option<Source>,
    altitude: Option<(f64, f64)>,
    bearing: Option<f64>,
    speed: Option<f64>,
}

impl Reading {
    fn build(&self) -> LocationRecord {
        let mut record = LocationRecord::new();
        if let Some((ts, lat, lon, acc)) = self.lat_lon {
            record.set_lat_lon(ts, lat, lon, acc);
        }
        if let Some(source) = self.source {
            record.set_source(source);
        }
        if let Some((alt, vac)) = self.altitude {
            record.set_altitude(alt, vac);
        }
        if let Some(bearing) = self.bearing {
            record.set_bearing(bearing);
        }
        if let Some(speed) = self.speed {
            record.set_speed(speed);
        }
        record
    }
}

// Values stay inside what each fixed-point field can hold.
fn arb_reading() -> impl Strategy<Value = Reading> {
    (
        proptest::option::of((
            0u64..(1u64 << 48),
            -90.0f64..=90.0,
            -180.0f64..=180.0,
            0.01f64..40_000_000.0,
        )),
        proptest::option::of(arb_source()),
        proptest::option::of((-20_000_000.0f64..20_000_000.0, 0.01f64..655.0)),
        proptest::option::of(0.0f64..360.0),
        proptest::option::of(0.0f64..655.0),
    )
        .prop_map(|(lat_lon, source, altitude, bearing, speed)| Reading {
            lat_lon,
            source,
            altitude,
            bearing,
            speed,
        })
}

/// Bytes each present block occupies, in decode order.
fn block_sizes(record: &LocationRecord) -> Vec<usize> {
    let mask = record.presence();
    let mut sizes = Vec::new();
    if mask.contains(Presence::LAT_LON) {
        sizes.push(18);
        if mask.contains(Presence::SOURCE) {
            sizes.push(1);
        }
    }
    if mask.contains(Presence::ALTITUDE) {
        sizes.push(6);
    }
    if mask.contains(Presence::BEARING) {
        sizes.push(4);
    }
    if mask.contains(Presence::SPEED) {
        sizes.push(2);
    }
    sizes
}

proptest! {
    #[test]
    fn round_trip_preserves_mask_and_resolution(reading in arb_reading()) {
        let record = reading.build();
        let decoded = decode(&encode(&record)).unwrap();

        prop_assert_eq!(decoded.presence(), record.presence());

        if let Some(p) = record.lat_lon() {
            let d = decoded.lat_lon().unwrap();
            prop_assert_eq!(d.timestamp_ms, p.timestamp_ms);
            prop_assert!((d.latitude_deg - p.latitude_deg).abs() <= DEGREE_TOLERANCE);
            prop_assert!((d.longitude_deg - p.longitude_deg).abs() <= DEGREE_TOLERANCE);
            prop_assert!(
                (d.horizontal_accuracy_m - p.horizontal_accuracy_m).abs() <= METRIC_TOLERANCE
            );
            prop_assert_eq!(decoded.source(), record.source());
        }
        if let Some(a) = record.altitude() {
            let d = decoded.altitude().unwrap();
            prop_assert!((d.altitude_m - a.altitude_m).abs() <= METRIC_TOLERANCE);
            prop_assert!((d.vertical_accuracy_m - a.vertical_accuracy_m).abs() <= METRIC_TOLERANCE);
        }
        if let Some(b) = record.bearing() {
            prop_assert!((decoded.bearing().unwrap() - b).abs() <= DEGREE_TOLERANCE);
        }
        if let Some(s) = record.speed() {
            prop_assert!((decoded.speed().unwrap() - s).abs() <= METRIC_TOLERANCE);
        }
    }

    #[test]
    fn encoded_length_matches_mask(reading in arb_reading()) {
        let record = reading.build();
        let expected: usize = 1 + block_sizes(&record).iter().sum::<usize>();
        prop_assert_eq!(encode(&record).len(), expected);
    }

    #[test]
    fn setting_twice_is_idempotent(reading in arb_reading()) {
        let once = reading.build();
        let mut twice = reading.build();
        if let Some((ts, lat, lon, acc)) = reading.lat_lon {
            twice.set_lat_lon(ts, lat, lon, acc);
        }
        if let Some(speed) = reading.speed {
            twice.set_speed(speed);
        }
        prop_assert_eq!(encode(&once), encode(&twice));
    }

    #[test]
    fn any_truncation_is_rejected(reading in arb_reading(), cut in any::<prop::sample::Index>()) {
        let bytes = encode(&reading.build());
        prop_assume!(bytes.len() > 1);
        let keep = 1 + cut.index(bytes.len() - 1);
        let truncated = &bytes[..keep];
        let is_truncated = matches!(
            decode(truncated),
            Err(DecodeError::TruncatedInput { .. })
        );
        prop_assert!(is_truncated);
    }

    #[test]
    fn negative_inputs_leave_record_unchanged(
        reading in arb_reading(),
        bad in -1_000.0f64..-0.001,
    ) {
        let mut record = reading.build();
        let before = encode(&record);
        record
            .set_lat_lon(1, 1.0, 1.0, bad)
            .set_altitude(1.0, bad)
            .set_bearing(bad)
            .set_speed(bad);
        prop_assert_eq!(encode(&record), before);
    }

    #[test]
    fn decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..40)) {
        let _ = decode(&bytes);
    }
}

#[test]
fn empty_input_is_rejected() {
    assert_eq!(decode(&[]), Err(DecodeError::EmptyInput));
}
