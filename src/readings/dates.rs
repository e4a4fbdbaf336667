//! Spreadsheet date-serial conversion
//!
//! Serial 25569 is 1970-01-01T00:00:00Z; the fractional part is the time of
//! day as a fraction of 86 400 000 ms.

use chrono::{DateTime, Utc};

pub const UNIX_EPOCH_SERIAL: f64 = 25569.0;
pub const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Largest instant magnitude a date may take, in ms from the Unix epoch
const MAX_INSTANT_MILLIS: f64 = 8.64e15;

/// Convert a date serial into a UTC instant, rounded to the millisecond.
///
/// Returns `None` when the serial is not finite or lands outside the
/// representable range.
pub fn to_date(serial: f64) -> Option<DateTime<Utc>> {
    if !serial.is_finite() {
        return None;
    }

    let millis = ((serial - UNIX_EPOCH_SERIAL) * MILLIS_PER_DAY).round();
    if !millis.is_finite() || millis.abs() > MAX_INSTANT_MILLIS {
        return None;
    }

    // Safe cast: finite and bounded above
    #[allow(clippy::cast_possible_truncation)]
    DateTime::from_timestamp_millis(millis as i64)
}

/// Convert a UTC instant back into a date serial
#[cfg(test)]
pub fn to_serial(date: &DateTime<Utc>) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let millis = date.timestamp_millis() as f64;
    millis / MILLIS_PER_DAY + UNIX_EPOCH_SERIAL
}

pub fn is_valid_serial(serial: f64) -> bool {
    to_date(serial).is_some()
}
