//! Timestamp normalization for archive entry metadata.
//!
//! ZIP stores modification times as timezone-less DOS date/time fields which
//! readers interpret as local wall-clock time. Entries are therefore stored
//! shifted by the packing host's UTC offset at the moment of modification, or
//! by a pinned offset when one is configured.

use chrono::DateTime;
use chrono::Datelike;
use chrono::FixedOffset;
use chrono::Local;
use chrono::NaiveDateTime;
use chrono::Timelike;
use chrono::Utc;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

/// Converts a filesystem modification time into the wall-clock timestamp
/// stored in the archive.
///
/// With `offset == None` the host's local offset in effect at `modified` is
/// applied (daylight saving included). Times before the Unix epoch collapse to
/// the epoch; they fall below the DOS range anyway.
///
/// # Examples
///
/// ```
/// use chrono::FixedOffset;
/// use distpack_core::timestamp::normalize;
/// use std::time::Duration;
/// use std::time::UNIX_EPOCH;
///
/// let mtime = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
/// let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
/// let ts = normalize(mtime, Some(plus_two));
/// assert_eq!(ts.to_string(), "2023-11-15 00:13:20");
/// ```
#[must_use]
pub fn normalize(modified: SystemTime, offset: Option<FixedOffset>) -> NaiveDateTime {
    let utc = to_utc(modified);
    match offset {
        Some(offset) => utc.with_timezone(&offset).naive_local(),
        None => utc.with_timezone(&Local).naive_local(),
    }
}

/// Converts a normalized timestamp into a ZIP `DateTime`.
///
/// Values outside the DOS range (1980-01-01 to 2107-12-31) are clamped to the
/// nearest bound. DOS time has two-second resolution; odd seconds round down.
#[must_use]
pub fn to_zip_datetime(ts: NaiveDateTime) -> zip::DateTime {
    if ts.year() < 1980 {
        return zip::DateTime::default();
    }
    if ts.year() > 2107 {
        return dos_max();
    }

    let fields = || -> Option<zip::DateTime> {
        zip::DateTime::from_date_and_time(
            u16::try_from(ts.year()).ok()?,
            u8::try_from(ts.month()).ok()?,
            u8::try_from(ts.day()).ok()?,
            u8::try_from(ts.hour()).ok()?,
            u8::try_from(ts.minute()).ok()?,
            u8::try_from(ts.second()).ok()?,
        )
        .ok()
    };
    fields().unwrap_or_default()
}

fn to_utc(modified: SystemTime) -> DateTime<Utc> {
    let Ok(since_epoch) = modified.duration_since(UNIX_EPOCH) else {
        return DateTime::<Utc>::UNIX_EPOCH;
    };
    i64::try_from(since_epoch.as_secs())
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, since_epoch.subsec_nanos()))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn dos_max() -> zip::DateTime {
    zip::DateTime::from_date_and_time(2107, 12, 31, 23, 59, 58).unwrap_or_default()
}
