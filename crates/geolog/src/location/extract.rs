//! Conversion from a raw platform location reading.
//!
//! Platform location services report every quantity as a plain number and
//! mark unknown ones with a negative value. [`extract_location`] turns such a
//! reading into a [`LocationRecord`], leaving out every group whose accuracy
//! or value is flagged unknown.

use super::LocationRecord;

/// A location reading as reported by a platform location service.
///
/// Negative accuracies, course or speed mean "not available".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlatformReading {
    /// Fix time in seconds since the Unix epoch.
    pub timestamp_s: f64,
    /// Latitude in degrees.
    pub latitude_deg: f64,
    /// Longitude in degrees.
    pub longitude_deg: f64,
    /// Horizontal accuracy in meters, negative if unknown.
    pub horizontal_accuracy_m: f64,
    /// Altitude in meters.
    pub altitude_m: f64,
    /// Vertical accuracy in meters, negative if unknown.
    pub vertical_accuracy_m: f64,
    /// Course in degrees from true north, negative if unknown.
    pub course_deg: f64,
    /// Speed in meters per second, negative if unknown.
    pub speed_mps: f64,
}

impl PlatformReading {
    /// Fix time in whole milliseconds, clamped at zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn timestamp_ms(&self) -> u64 {
        (self.timestamp_s * 1000.0) as u64
    }
}

/// Build a record from an optional platform reading.
///
/// An absent reading yields an empty record. The source is never set here;
/// callers that know the provider add it afterwards.
#[must_use]
pub fn extract_location(reading: Option<&PlatformReading>) -> LocationRecord {
    let mut record = LocationRecord::new();
    let Some(r) = reading else {
        return record;
    };

    if r.horizontal_accuracy_m >= 0.0 {
        record.set_lat_lon(
            r.timestamp_ms(),
            r.latitude_deg,
            r.longitude_deg,
            r.horizontal_accuracy_m,
        );
    }
    if r.vertical_accuracy_m >= 0.0 {
        record.set_altitude(r.altitude_m, r.vertical_accuracy_m);
    }
    if r.speed_mps >= 0.0 {
        record.set_speed(r.speed_mps);
    }
    if r.course_deg >= 0.0 {
        record.set_bearing(r.course_deg);
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Presence;

    fn good_reading() -> PlatformReading {
        PlatformReading {
            timestamp_s: 1_700_000_000.5,
            latitude_deg: 48.858_37,
            longitude_deg: 2.294_481,
            horizontal_accuracy_m: 8.0,
            altitude_m: 35.0,
            vertical_accuracy_m: 4.0,
            course_deg: 90.0,
            speed_mps: 1.4,
        }
    }

    #[test]
    fn test_absent_reading_is_empty() {
        assert!(extract_location(None).is_empty());
    }

    #[test]
    fn test_full_reading() {
        let record = extract_location(Some(&good_reading()));
        assert_eq!(
            record.presence(),
            Presence::LAT_LON | Presence::ALTITUDE | Presence::BEARING | Presence::SPEED
        );
        assert_eq!(record.lat_lon().unwrap().timestamp_ms, 1_700_000_000_500);
        assert!(record.source().is_none());
    }

    #[test]
    fn test_unknown_values_are_skipped() {
        let reading = PlatformReading {
            horizontal_accuracy_m: -1.0,
            vertical_accuracy_m: -1.0,
            course_deg: -1.0,
            ..good_reading()
        };
        let record = extract_location(Some(&reading));
        assert_eq!(record.presence(), Presence::SPEED);
    }

    #[test]
    fn test_zero_accuracy_still_gated_by_setter() {
        let reading = PlatformReading {
            horizontal_accuracy_m: 0.0,
            vertical_accuracy_m: 0.0,
            ..good_reading()
        };
        let record = extract_location(Some(&reading));
        assert!(record.lat_lon().is_none());
        assert!(record.altitude().is_none());
        assert!(record.speed().is_some());
    }

    #[test]
    fn test_negative_timestamp_clamps_to_zero() {
        let reading = PlatformReading {
            timestamp_s: -5.0,
            ..good_reading()
        };
        assert_eq!(reading.timestamp_ms(), 0);
    }
}
