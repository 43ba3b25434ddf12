//! Location records and their compact binary form.
//!
//! A [`LocationRecord`] holds a single location sample split into five
//! optional field groups. Which groups carry data is tracked by a
//! [`Presence`] mask; a group's values are only reachable through accessors
//! that return `None` while its flag is clear.
//!
//! Setters gate their inputs: a reading without a usable accuracy, or with a
//! negative bearing or speed, is silently ignored rather than reported.

pub mod codec;
pub mod extract;

use std::fmt;

use bitflags::bitflags;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub use codec::{decode, encode, DecodeError, Segment, MAX_ENCODED_LEN};
pub use extract::{extract_location, PlatformReading};

/// Scale applied to degrees (latitude, longitude, bearing).
///
/// Seven decimal places, roughly 1.1 cm at the equator.
pub const DEGREE_SCALE: f64 = 10_000_000.0;

/// Scale applied to metric values (accuracies, altitude, speed).
pub const METRIC_SCALE: f64 = 100.0;

bitflags! {
    /// Field groups present in a [`LocationRecord`].
    ///
    /// Serialized as the leading byte of the encoded form.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Presence: u8 {
        /// Timestamp, latitude, longitude and horizontal accuracy.
        const LAT_LON = 1 << 0;
        /// Altitude and vertical accuracy.
        const ALTITUDE = 1 << 1;
        /// Bearing from true north.
        const BEARING = 1 << 2;
        /// Ground speed.
        const SPEED = 1 << 3;
        /// Provider that produced the fix.
        const SOURCE = 1 << 4;
    }
}

impl Default for Presence {
    fn default() -> Self {
        Presence::empty()
    }
}

/// The provider that produced a location fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Source {
    /// Provider not known.
    #[default]
    Unknown = 0,
    /// Satellite positioning.
    Gps = 1,
    /// Cell or Wi-Fi positioning.
    Network = 2,
    /// Fix obtained passively from another consumer's request.
    Passive = 3,
}

impl Source {
    /// Map a wire byte to a source. Unassigned values read as `Unknown`.
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            1 => Self::Gps,
            2 => Self::Network,
            3 => Self::Passive,
            _ => Self::Unknown,
        }
    }

    /// The wire byte for this source.
    #[must_use]
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Three-letter abbreviation used in debug output.
    #[must_use]
    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::Gps => "GPS",
            Self::Network => "Net",
            Self::Passive => "Psv",
            Self::Unknown => "Unk",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// A single location sample.
///
/// Built empty and filled in through the `set_*` methods, each of which
/// returns `&mut Self` so calls can be chained:
///
/// ```
/// use geolog::location::{LocationRecord, Source};
///
/// let mut record = LocationRecord::new();
/// record
///     .set_lat_lon(1_700_000_000_000, 37.7749, -122.4194, 5.0)
///     .set_source(Source::Gps);
///
/// let bytes = geolog::location::encode(&record);
/// let decoded = geolog::location::decode(&bytes).unwrap();
/// assert_eq!(decoded.presence(), record.presence());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocationRecord {
    presence: Presence,
    timestamp_ms: u64,
    latitude_deg: f64,
    longitude_deg: f64,
    horizontal_accuracy_m: f64,
    altitude_m: f64,
    vertical_accuracy_m: f64,
    bearing_deg: f64,
    speed_mps: f64,
    source: Source,
}

/// Timestamped coordinate with its horizontal accuracy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    /// Degrees north of the equator.
    pub latitude_deg: f64,
    /// Degrees east of the prime meridian.
    pub longitude_deg: f64,
    /// Radius of uncertainty in meters.
    pub horizontal_accuracy_m: f64,
}

/// Altitude with its vertical accuracy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Altitude {
    /// Meters above sea level.
    pub altitude_m: f64,
    /// Uncertainty in meters.
    pub vertical_accuracy_m: f64,
}

impl LocationRecord {
    /// Create a record with no populated groups.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The set of populated field groups.
    #[must_use]
    pub fn presence(&self) -> Presence {
        self.presence
    }

    /// Whether no field group is populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.presence.is_empty()
    }

    /// Record the fix position.
    ///
    /// Ignored unless `horizontal_accuracy_m` is strictly positive.
    pub fn set_lat_lon(
        &mut self,
        timestamp_ms: u64,
        latitude_deg: f64,
        longitude_deg: f64,
        horizontal_accuracy_m: f64,
    ) -> &mut Self {
        if horizontal_accuracy_m > 0.0 {
            self.timestamp_ms = timestamp_ms;
            self.latitude_deg = latitude_deg;
            self.longitude_deg = longitude_deg;
            self.horizontal_accuracy_m = horizontal_accuracy_m;
            self.presence |= Presence::LAT_LON;
        }
        self
    }

    /// Record which provider produced the fix.
    ///
    /// Only written to the wire alongside the position.
    pub fn set_source(&mut self, source: Source) -> &mut Self {
        self.source = source;
        self.presence |= Presence::SOURCE;
        self
    }

    /// Record altitude. Ignored unless `vertical_accuracy_m` is strictly positive.
    pub fn set_altitude(&mut self, altitude_m: f64, vertical_accuracy_m: f64) -> &mut Self {
        if vertical_accuracy_m > 0.0 {
            self.altitude_m = altitude_m;
            self.vertical_accuracy_m = vertical_accuracy_m;
            self.presence |= Presence::ALTITUDE;
        }
        self
    }

    /// Record bearing in degrees from true north. Negative values are ignored.
    pub fn set_bearing(&mut self, bearing_deg: f64) -> &mut Self {
        if bearing_deg >= 0.0 {
            self.bearing_deg = bearing_deg;
            self.presence |= Presence::BEARING;
        }
        self
    }

    /// Record speed in meters per second. Negative values are ignored.
    pub fn set_speed(&mut self, speed_mps: f64) -> &mut Self {
        if speed_mps >= 0.0 {
            self.speed_mps = speed_mps;
            self.presence |= Presence::SPEED;
        }
        self
    }

    /// The position group, if set.
    #[must_use]
    pub fn lat_lon(&self) -> Option<LatLon> {
        self.presence.contains(Presence::LAT_LON).then_some(LatLon {
            timestamp_ms: self.timestamp_ms,
            latitude_deg: self.latitude_deg,
            longitude_deg: self.longitude_deg,
            horizontal_accuracy_m: self.horizontal_accuracy_m,
        })
    }

    /// The fix time as a UTC date, if the position group is set.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let lat_lon = self.lat_lon()?;
        i64::try_from(lat_lon.timestamp_ms)
            .ok()
            .and_then(DateTime::from_timestamp_millis)
    }

    /// The provider, if set.
    #[must_use]
    pub fn source(&self) -> Option<Source> {
        self.presence
            .contains(Presence::SOURCE)
            .then_some(self.source)
    }

    /// The altitude group, if set.
    #[must_use]
    pub fn altitude(&self) -> Option<Altitude> {
        self.presence.contains(Presence::ALTITUDE).then_some(Altitude {
            altitude_m: self.altitude_m,
            vertical_accuracy_m: self.vertical_accuracy_m,
        })
    }

    /// Bearing in degrees, if set.
    #[must_use]
    pub fn bearing(&self) -> Option<f64> {
        self.presence
            .contains(Presence::BEARING)
            .then_some(self.bearing_deg)
    }

    /// Speed in meters per second, if set.
    #[must_use]
    pub fn speed(&self) -> Option<f64> {
        self.presence
            .contains(Presence::SPEED)
            .then_some(self.speed_mps)
    }

    /// Encode into the compact wire form. See [`encode`].
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        codec::encode(self)
    }

    /// Decode from the compact wire form. See [`decode`].
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if `bytes` is empty or shorter than its
    /// presence mask requires.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        codec::decode(bytes)
    }

    /// Render the populated groups for logs and diagnostics.
    #[must_use]
    pub fn to_debug_string(&self) -> String {
        self.to_string()
    }

    /// Check that populated values lie within geographic bounds.
    ///
    /// [`decode`] never calls this; callers that want stricter input
    /// handling opt in explicitly.
    ///
    /// # Errors
    ///
    /// Returns the first field found outside its range.
    pub fn check_ranges(&self) -> Result<(), RangeError> {
        if let Some(lat_lon) = self.lat_lon() {
            check_field("latitude", lat_lon.latitude_deg, -90.0, 90.0, true)?;
            check_field("longitude", lat_lon.longitude_deg, -180.0, 180.0, true)?;
        }
        if let Some(bearing) = self.bearing() {
            check_field("bearing", bearing, 0.0, 360.0, false)?;
        }
        Ok(())
    }
}

fn check_field(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
    max_inclusive: bool,
) -> Result<(), RangeError> {
    let below_max = if max_inclusive { value <= max } else { value < max };
    if value >= min && below_max {
        Ok(())
    } else {
        Err(RangeError { field, value })
    }
}

/// A populated field holds a value outside its geographic range.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("{field} out of range: {value}")]
pub struct RangeError {
    /// Name of the offending field.
    pub field: &'static str,
    /// The value found.
    pub value: f64,
}

// Segments after a missing position keep their leading comma so the output
// stays identical to what existing log consumers already parse.
impl fmt::Display for LocationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<")?;
        if let Some(p) = self.lat_lon() {
            write!(
                f,
                "utc={},lat={:.7},lon={:.7},acc={:.2}",
                p.timestamp_ms, p.latitude_deg, p.longitude_deg, p.horizontal_accuracy_m
            )?;
        }
        if let Some(a) = self.altitude() {
            write!(f, ",alt={:.2},vac={:.2}", a.altitude_m, a.vertical_accuracy_m)?;
        }
        if let Some(bearing) = self.bearing() {
            write!(f, ",bea={bearing:.7}")?;
        }
        if let Some(speed) = self.speed() {
            write!(f, ",spd={speed:.2}")?;
        }
        if let Some(source) = self.source() {
            write!(f, ",src={source}")?;
        }
        f.write_str(">")
    }
}
