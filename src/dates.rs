//! Date and recurrence validation
//!
//! Stored temporal attributes are raw strings and may be anything,
//! including garbage imported from older databases. Everything here is
//! tolerant: validation yields `Option`, never an error, and callers
//! degrade (omit a label, skip a GC transition) on `None`. The raw
//! string always remains available for display.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, TimeZone, Utc};

/// Validate a stored temporal attribute.
///
/// Stored dates are integer epoch seconds; anything else is a
/// validation gap, not an error.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let secs: i64 = raw.parse().ok()?;
    Utc.timestamp_opt(secs, 0).single()
}

/// Encode a timestamp the way the store expects it.
pub fn to_epoch_string(when: DateTime<Utc>) -> String {
    when.timestamp().to_string()
}

/// Recurrence kind, from the `rtype` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceKind {
    /// New instances are spawned on a fixed schedule from the template's due date.
    Periodic,
    /// A new instance is spawned when the previous one completes.
    Chained,
}

impl RecurrenceKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "periodic" => Some(RecurrenceKind::Periodic),
            "chained" => Some(RecurrenceKind::Chained),
            _ => None,
        }
    }
}

/// A recurrence period. Month-based periods track calendar months
/// rather than a fixed number of seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Fixed(Duration),
    Months(u32),
}

impl Period {
    /// The due date `n` periods after `from`, or None on overflow.
    pub fn advance(&self, from: DateTime<Utc>, n: u32) -> Option<DateTime<Utc>> {
        match self {
            Period::Fixed(step) => {
                let total = step.checked_mul(i32::try_from(n).ok()?)?;
                from.checked_add_signed(total)
            }
            Period::Months(months) => from.checked_add_months(Months::new(months.checked_mul(n)?)),
        }
    }
}

/// A validated recurrence rule: kind plus period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recurrence {
    pub kind: RecurrenceKind,
    pub period: Period,
}

/// Validate the `rtype`/`recur` attribute pair.
///
/// An unrecognized kind or a malformed period string yields None; the
/// raw attribute values stay stored and are shown as-is by reports.
pub fn parse_recurrence(rtype: &str, recur: &str) -> Option<Recurrence> {
    Some(Recurrence {
        kind: RecurrenceKind::parse(rtype)?,
        period: parse_period(recur)?,
    })
}

/// Parse a recurrence period string such as `3d`, `2w`, `monthly`.
pub fn parse_period(raw: &str) -> Option<Period> {
    let raw = raw.trim().to_lowercase();
    if raw.is_empty() {
        return None;
    }

    match raw.as_str() {
        "daily" => return Some(Period::Fixed(Duration::days(1))),
        "weekly" => return Some(Period::Fixed(Duration::weeks(1))),
        "biweekly" | "fortnight" => return Some(Period::Fixed(Duration::weeks(2))),
        "monthly" => return Some(Period::Months(1)),
        "quarterly" => return Some(Period::Months(3)),
        "semiannual" => return Some(Period::Months(6)),
        "annual" | "yearly" | "biannual" => return Some(Period::Months(12)),
        _ => {}
    }

    // Count prefix (default 1) followed by a unit suffix
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (num_str, unit) = raw.split_at(split);
    let count: u32 = if num_str.is_empty() {
        1
    } else {
        num_str.parse().ok()?
    };
    if count == 0 {
        return None;
    }

    match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => {
            Some(Period::Fixed(Duration::seconds(count as i64)))
        }
        "min" | "mins" | "minute" | "minutes" => {
            Some(Period::Fixed(Duration::minutes(count as i64)))
        }
        "h" | "hr" | "hrs" | "hour" | "hours" => Some(Period::Fixed(Duration::hours(count as i64))),
        "d" | "day" | "days" => Some(Period::Fixed(Duration::days(count as i64))),
        "w" | "wk" | "wks" | "week" | "weeks" => Some(Period::Fixed(Duration::weeks(count as i64))),
        "m" | "mo" | "mth" | "mths" | "month" | "months" => Some(Period::Months(count)),
        "q" | "qtr" | "qtrs" | "quarter" | "quarters" => Some(Period::Months(count.checked_mul(3)?)),
        "y" | "yr" | "yrs" | "year" | "years" => Some(Period::Months(count.checked_mul(12)?)),
        _ => None,
    }
}

/// Parse a user-supplied date expression from the command line.
///
/// Unlike stored-value validation this is allowed to be strict: the CLI
/// turns None into a user error before anything reaches the store.
pub fn parse_date_expr(raw: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(parsed) = parse_date(raw) {
        return Some(parsed);
    }

    let midnight = |date: NaiveDate| date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    let today = now.date_naive();

    match raw.to_lowercase().as_str() {
        "now" => Some(now),
        "today" | "sod" => midnight(today),
        "eod" => midnight(today.succ_opt()?),
        "yesterday" => midnight(today.pred_opt()?),
        "tomorrow" => midnight(today.succ_opt()?),
        "eow" => {
            let days_left = 7 - today.weekday().num_days_from_monday() as i64;
            midnight(today.checked_add_signed(Duration::days(days_left))?)
        }
        "eom" => {
            let first = today.with_day(1)?;
            midnight(first.checked_add_months(Months::new(1))?)
        }
        "eoy" => midnight(NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?),
        _ => NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().and_then(midnight),
    }
}

/// Render a timestamp per the `dateformat` configuration.
///
/// Format letters follow the legacy convention: `Y` four-digit year,
/// `y` two-digit year, `M`/`m` month with/without zero padding, `D`/`d`
/// day, `H`/`h` hour, `N`/`n` minute, `S`/`s` second. Any other
/// character is literal.
pub fn format_date(when: DateTime<Utc>, dateformat: &str) -> String {
    let mut fmt = String::with_capacity(dateformat.len() * 2);
    for c in dateformat.chars() {
        match c {
            'Y' => fmt.push_str("%Y"),
            'y' => fmt.push_str("%y"),
            'M' => fmt.push_str("%m"),
            'm' => fmt.push_str("%-m"),
            'D' => fmt.push_str("%d"),
            'd' => fmt.push_str("%-d"),
            'H' => fmt.push_str("%H"),
            'h' => fmt.push_str("%-H"),
            'N' => fmt.push_str("%M"),
            'n' => fmt.push_str("%-M"),
            'S' => fmt.push_str("%S"),
            's' => fmt.push_str("%-S"),
            '%' => fmt.push_str("%%"),
            other => fmt.push(other),
        }
    }
    when.format(&fmt).to_string()
}
