//! Binary encoding for [`LocationRecord`].
//!
//! Layout, each block present only when its presence bit is set:
//!
//! ```text
//! [mask u8]
//! LatLon:   [timestamp 6 bytes] [lat i32] [lon i32] [h_acc u32] ([source u8] if Source)
//! Altitude: [altitude i32] [v_acc u16]
//! Bearing:  [bearing u32]
//! Speed:    [speed u16]
//! ```
//!
//! All integers are little-endian. Degrees are stored multiplied by
//! [`DEGREE_SCALE`], metric values by [`METRIC_SCALE`]; the conversion
//! truncates toward zero. The timestamp keeps only its low 48 bits.
//!
//! There is no version tag and no range checking on decode.

use std::fmt;

use thiserror::Error;

use super::{LocationRecord, Presence, Source, DEGREE_SCALE, METRIC_SCALE};

/// Bytes used by the truncated timestamp.
const TIMESTAMP_LEN: usize = 6;

/// Size of the position block without the source byte.
const LAT_LON_LEN: usize = TIMESTAMP_LEN + 4 + 4 + 4;

/// Size of the source byte.
const SOURCE_LEN: usize = 1;

/// Size of the altitude block.
const ALTITUDE_LEN: usize = 4 + 2;

/// Size of the bearing block.
const BEARING_LEN: usize = 4;

/// Size of the speed block.
const SPEED_LEN: usize = 2;

/// Longest possible encoding: mask plus every block.
pub const MAX_ENCODED_LEN: usize =
    1 + LAT_LON_LEN + SOURCE_LEN + ALTITUDE_LEN + BEARING_LEN + SPEED_LEN;

/// A block of the encoded form, named in decode errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Timestamp, coordinates and horizontal accuracy.
    LatLon,
    /// Source byte following the position.
    Source,
    /// Altitude and vertical accuracy.
    Altitude,
    /// Bearing.
    Bearing,
    /// Speed.
    Speed,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LatLon => write!(f, "lat_lon"),
            Self::Source => write!(f, "source"),
            Self::Altitude => write!(f, "altitude"),
            Self::Bearing => write!(f, "bearing"),
            Self::Speed => write!(f, "speed"),
        }
    }
}

/// Errors returned by [`decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// No bytes at all, not even the presence mask.
    #[error("cannot decode location from empty input")]
    EmptyInput,

    /// The presence mask announces a block that the input is too short to hold.
    #[error("truncated location: {segment} needs {needed} bytes, {available} remain")]
    TruncatedInput {
        /// The block that could not be read.
        segment: Segment,
        /// Bytes that block requires.
        needed: usize,
        /// Bytes left in the input.
        available: usize,
    },
}

/// Encode a record into its compact form.
///
/// Never fails: setters refuse the values that could not be represented
/// meaningfully, and values beyond an integer's range saturate.
#[must_use]
pub fn encode(record: &LocationRecord) -> Vec<u8> {
    let mask = record.presence;
    let mut out = Vec::with_capacity(MAX_ENCODED_LEN);
    out.push(mask.bits());

    if mask.contains(Presence::LAT_LON) {
        out.extend_from_slice(&record.timestamp_ms.to_le_bytes()[..TIMESTAMP_LEN]);
        out.extend_from_slice(&to_fixed_i32(record.latitude_deg, DEGREE_SCALE).to_le_bytes());
        out.extend_from_slice(&to_fixed_i32(record.longitude_deg, DEGREE_SCALE).to_le_bytes());
        out.extend_from_slice(
            &to_fixed_u32(record.horizontal_accuracy_m, METRIC_SCALE).to_le_bytes(),
        );
        if mask.contains(Presence::SOURCE) {
            out.push(record.source.as_byte());
        }
    }
    if mask.contains(Presence::ALTITUDE) {
        out.extend_from_slice(&to_fixed_i32(record.altitude_m, METRIC_SCALE).to_le_bytes());
        out.extend_from_slice(
            &to_fixed_u16(record.vertical_accuracy_m, METRIC_SCALE).to_le_bytes(),
        );
    }
    if mask.contains(Presence::BEARING) {
        out.extend_from_slice(&to_fixed_u32(record.bearing_deg, DEGREE_SCALE).to_le_bytes());
    }
    if mask.contains(Presence::SPEED) {
        out.extend_from_slice(&to_fixed_u16(record.speed_mps, METRIC_SCALE).to_le_bytes());
    }
    out
}

/// Decode a record from its compact form.
///
/// Blocks are read in fixed order, each one checked for length when it is
/// reached. Bytes past the last announced block are ignored.
///
/// # Errors
///
/// [`DecodeError::EmptyInput`] for a zero-length input and
/// [`DecodeError::TruncatedInput`] when an announced block does not fit.
pub fn decode(bytes: &[u8]) -> Result<LocationRecord, DecodeError> {
    let (&mask_byte, rest) = bytes.split_first().ok_or(DecodeError::EmptyInput)?;
    let mask = Presence::from_bits_truncate(mask_byte);
    let mut reader = Reader::new(rest);
    let mut record = LocationRecord {
        presence: mask,
        ..LocationRecord::default()
    };

    if mask.contains(Presence::LAT_LON) {
        let block = reader.take::<LAT_LON_LEN>(Segment::LatLon)?;
        let mut timestamp = [0u8; 8];
        timestamp[..TIMESTAMP_LEN].copy_from_slice(&block[..TIMESTAMP_LEN]);
        record.timestamp_ms = u64::from_le_bytes(timestamp);
        record.latitude_deg = f64::from(i32::from_le_bytes(word(&block, 6))) / DEGREE_SCALE;
        record.longitude_deg = f64::from(i32::from_le_bytes(word(&block, 10))) / DEGREE_SCALE;
        record.horizontal_accuracy_m =
            f64::from(u32::from_le_bytes(word(&block, 14))) / METRIC_SCALE;

        if mask.contains(Presence::SOURCE) {
            let [source] = reader.take::<SOURCE_LEN>(Segment::Source)?;
            record.source = Source::from_byte(source);
        }
    }
    if mask.contains(Presence::ALTITUDE) {
        let block = reader.take::<ALTITUDE_LEN>(Segment::Altitude)?;
        record.altitude_m = f64::from(i32::from_le_bytes(word(&block, 0))) / METRIC_SCALE;
        record.vertical_accuracy_m =
            f64::from(u16::from_le_bytes([block[4], block[5]])) / METRIC_SCALE;
    }
    if mask.contains(Presence::BEARING) {
        let block = reader.take::<BEARING_LEN>(Segment::Bearing)?;
        record.bearing_deg = f64::from(u32::from_le_bytes(block)) / DEGREE_SCALE;
    }
    if mask.contains(Presence::SPEED) {
        let block = reader.take::<SPEED_LEN>(Segment::Speed)?;
        record.speed_mps = f64::from(u16::from_le_bytes(block)) / METRIC_SCALE;
    }
    Ok(record)
}

/// Sequential cursor over the bytes following the mask.
struct Reader<'a> {
    remaining: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(remaining: &'a [u8]) -> Self {
        Self { remaining }
    }

    fn take<const N: usize>(&mut self, segment: Segment) -> Result<[u8; N], DecodeError> {
        if self.remaining.len() < N {
            return Err(DecodeError::TruncatedInput {
                segment,
                needed: N,
                available: self.remaining.len(),
            });
        }
        let (head, tail) = self.remaining.split_at(N);
        self.remaining = tail;
        let mut out = [0u8; N];
        out.copy_from_slice(head);
        Ok(out)
    }
}

fn word(block: &[u8], offset: usize) -> [u8; 4] {
    [
        block[offset],
        block[offset + 1],
        block[offset + 2],
        block[offset + 3],
    ]
}

#[allow(clippy::cast_possible_truncation)]
fn to_fixed_i32(value: f64, scale: f64) -> i32 {
    (value * scale) as i32
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_fixed_u32(value: f64, scale: f64) -> u32 {
    (value * scale) as u32
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_fixed_u16(value: f64, scale: f64) -> u16 {
    (value * scale) as u16
}
