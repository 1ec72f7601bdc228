use chrono::{Datelike, Duration, Months, NaiveDateTime, Timelike};

/// Run timestamp and device display name derived from a folder name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunIdentity {
    pub device_name: String,
    pub timestamp: NaiveDateTime,
}

/// Parses a run folder name of the form `<name>_<YYYY>-<MM>-<DD>_<HH>-<MM>`.
///
/// The device name is everything before the first `_20` year marker. Each
/// timestamp token is range-checked and then applied as a delta to `now`,
/// so tokens the range checks admit but a calendar rejects (hour 24,
/// minute 60) roll over instead of failing. Seconds end up zeroed. Any
/// missing marker or failed range check yields `None` with no partial
/// result.
pub fn parse_run_folder_name(folder_name: &str, now: NaiveDateTime) -> Option<RunIdentity> {
    let marker = folder_name.find("_20")?;
    let device_name = folder_name[..marker].to_string();

    let start = marker + 1;
    let year = parse_token(folder_name, start, 4)?;
    let month = parse_token(folder_name, start + 5, 2)?;
    let day = parse_token(folder_name, start + 8, 2)?;
    let hour = parse_token(folder_name, start + 11, 2)?;
    let minute = parse_token(folder_name, start + 14, 2)?;

    if !(2000..=2099).contains(&year)
        || !(1..=12).contains(&month)
        || !(1..=31).contains(&day)
        || !(0..=24).contains(&hour)
        || !(0..=60).contains(&minute)
    {
        return None;
    }

    let mut dt = now;
    dt = add_months(dt, (year - i64::from(dt.year())) * 12)?;
    dt = add_months(dt, month - i64::from(dt.month()))?;
    dt += Duration::days(day - i64::from(dt.day()));
    dt += Duration::hours(hour - i64::from(dt.hour()));
    dt += Duration::minutes(minute - i64::from(dt.minute()));
    dt -= Duration::seconds(i64::from(dt.second()));
    dt = dt.with_nanosecond(0)?;

    Some(RunIdentity {
        device_name,
        timestamp: dt,
    })
}

fn parse_token(s: &str, start: usize, len: usize) -> Option<i64> {
    s.get(start..start + len)?.parse().ok()
}

fn add_months(dt: NaiveDateTime, delta: i64) -> Option<NaiveDateTime> {
    if delta >= 0 {
        dt.checked_add_months(Months::new(u32::try_from(delta).ok()?))
    } else {
        dt.checked_sub_months(Months::new(u32::try_from(-delta).ok()?))
    }
}
