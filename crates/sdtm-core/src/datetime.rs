//! ISO 8601 date/time handling for `--DTC` variables.
//!
//! SDTM stores dates as character values in ISO 8601 extended format with
//! right truncation for partial dates (`2003-12`, `2003`), and a single
//! hyphen for a missing middle component (`2003---15`). Study day
//! arithmetic only uses the date portion of complete dates.

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Precision level for ISO 8601 date/time values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DateTimePrecision {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    FractionalSecond,
}

impl DateTimePrecision {
    pub fn has_complete_date(&self) -> bool {
        *self >= Self::Day
    }

    pub fn has_time(&self) -> bool {
        *self >= Self::Hour
    }
}

/// A parsed ISO 8601 date/time value with the components that were present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Iso8601DateTime {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub second: Option<u32>,
    /// Fractional seconds in nanoseconds.
    pub nanosecond: Option<u32>,
    /// Offset in minutes (`+05:30` = 330).
    pub tz_offset_minutes: Option<i32>,
    pub is_utc: bool,
}

impl Iso8601DateTime {
    /// Most precise component present; `None` when the year is missing.
    pub fn precision(&self) -> Option<DateTimePrecision> {
        self.year?;
        let precision = if self.nanosecond.is_some() {
            DateTimePrecision::FractionalSecond
        } else if self.second.is_some() {
            DateTimePrecision::Second
        } else if self.minute.is_some() {
            DateTimePrecision::Minute
        } else if self.hour.is_some() {
            DateTimePrecision::Hour
        } else if self.day.is_some() {
            DateTimePrecision::Day
        } else if self.month.is_some() {
            DateTimePrecision::Month
        } else {
            DateTimePrecision::Year
        };
        Some(precision)
    }

    pub fn has_complete_date(&self) -> bool {
        self.year.is_some() && self.month.is_some() && self.day.is_some()
    }

    pub fn has_time(&self) -> bool {
        self.hour.is_some()
    }

    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year?, self.month?, self.day?)
    }

    /// Complete date plus whatever time components exist (missing ones are zero).
    pub fn to_naive_datetime(&self) -> Option<NaiveDateTime> {
        let date = self.to_naive_date()?;
        let time = NaiveTime::from_hms_nano_opt(
            self.hour.unwrap_or(0),
            self.minute.unwrap_or(0),
            self.second.unwrap_or(0),
            self.nanosecond.unwrap_or(0),
        )?;
        Some(NaiveDateTime::new(date, time))
    }

    /// Extended-format rendering that keeps the parsed precision.
    pub fn to_iso8601_string(&self) -> String {
        let mut result = match self.year {
            Some(year) => format!("{year:04}"),
            None => "-".to_string(),
        };
        let has_later_date = self.day.is_some() || self.hour.is_some();
        match self.month {
            Some(month) => result.push_str(&format!("-{month:02}")),
            None if has_later_date => result.push_str("--"),
            None => return result,
        }
        match self.day {
            Some(day) => result.push_str(&format!("-{day:02}")),
            None if self.hour.is_some() => result.push_str("--"),
            None => return result,
        }
        let Some(hour) = self.hour else {
            return result;
        };
        result.push_str(&format!("T{hour:02}"));
        if let Some(minute) = self.minute {
            result.push_str(&format!(":{minute:02}"));
            if let Some(second) = self.second {
                result.push_str(&format!(":{second:02}"));
                if let Some(nano) = self.nanosecond {
                    let frac = format!("{nano:09}");
                    let frac = frac.trim_end_matches('0');
                    if !frac.is_empty() {
                        result.push('.');
                        result.push_str(frac);
                    }
                }
            }
        }
        if self.is_utc {
            result.push('Z');
        } else if let Some(offset) = self.tz_offset_minutes {
            let sign = if offset >= 0 { '+' } else { '-' };
            let offset = offset.abs();
            result.push_str(&format!("{sign}{:02}:{:02}", offset / 60, offset % 60));
        }
        result
    }
}

impl fmt::Display for Iso8601DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601_string())
    }
}

/// Reasons a value is not a permitted ISO 8601 date/time.
#[derive(Debug, Clone, PartialEq)]
pub enum DateTimeError {
    Empty,
    /// `20031215` style values; SDTM requires the extended format.
    BasicFormatNotAllowed,
    SpacesNotAllowed,
    InvalidYear,
    InvalidMonth,
    InvalidDay,
    InvalidHour,
    InvalidMinute,
    InvalidSecond,
    InvalidTimezone,
    ParseError(String),
}

impl fmt::Display for DateTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty date/time value"),
            Self::BasicFormatNotAllowed => {
                write!(f, "ISO 8601 basic format is not allowed; use the extended format")
            }
            Self::SpacesNotAllowed => write!(f, "spaces are not allowed in ISO 8601 values"),
            Self::InvalidYear => write!(f, "invalid year component"),
            Self::InvalidMonth => write!(f, "invalid month component (must be 01-12)"),
            Self::InvalidDay => write!(f, "invalid day component"),
            Self::InvalidHour => write!(f, "invalid hour component (must be 00-23)"),
            Self::InvalidMinute => write!(f, "invalid minute component (must be 00-59)"),
            Self::InvalidSecond => write!(f, "invalid second component (must be 00-59)"),
            Self::InvalidTimezone => write!(f, "invalid timezone offset"),
            Self::ParseError(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for DateTimeError {}

/// Parse an ISO 8601 extended-format date/time, allowing partial values.
pub fn parse_iso8601_datetime(value: &str) -> Result<Iso8601DateTime, DateTimeError> {
    if value.is_empty() {
        return Err(DateTimeError::Empty);
    }
    if value.contains(char::is_whitespace) {
        return Err(DateTimeError::SpacesNotAllowed);
    }
    if looks_like_basic_format(value) {
        return Err(DateTimeError::BasicFormatNotAllowed);
    }

    let mut dt = Iso8601DateTime::default();
    let (date_part, time_part) = match value.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (value, None),
    };
    parse_date_part(date_part, &mut dt)?;
    if let Some(time) = time_part {
        if time.is_empty() {
            return Err(DateTimeError::ParseError("empty time after 'T'".to_string()));
        }
        parse_time_part(time, &mut dt)?;
    }
    if dt.year.is_none() && dt.month.is_none() && dt.day.is_none() {
        return Err(DateTimeError::ParseError("no date components".to_string()));
    }

    if let Some(month) = dt.month
        && !(1..=12).contains(&month)
    {
        return Err(DateTimeError::InvalidMonth);
    }
    if let Some(day) = dt.day
        && (day < 1 || day > max_days_in_month(dt.year, dt.month))
    {
        return Err(DateTimeError::InvalidDay);
    }
    if dt.hour.is_some_and(|hour| hour > 23) {
        return Err(DateTimeError::InvalidHour);
    }
    if dt.minute.is_some_and(|minute| minute > 59) {
        return Err(DateTimeError::InvalidMinute);
    }
    if dt.second.is_some_and(|second| second > 59) {
        return Err(DateTimeError::InvalidSecond);
    }
    Ok(dt)
}

/// True when `value` matches the permitted ISO 8601 date/time grammar.
pub fn is_iso8601_datetime(value: &str) -> bool {
    parse_iso8601_datetime(value).is_ok()
}

fn looks_like_basic_format(value: &str) -> bool {
    let date = value.split('T').next().unwrap_or(value);
    date.len() >= 6 && date.chars().all(|ch| ch.is_ascii_digit())
}

fn take_digits(text: &str, width: usize) -> Option<(u32, &str)> {
    let head = text.get(..width)?;
    if !head.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    Some((head.parse().ok()?, &text[width..]))
}

/// Date grammar: `YYYY[-MM[-DD]]`, with `-` standing in for a missing component.
fn parse_date_part(date: &str, dt: &mut Iso8601DateTime) -> Result<(), DateTimeError> {
    let unexpected = || DateTimeError::ParseError(format!("unexpected characters in date: {date}"));
    let rest = if let Some(stripped) = date.strip_prefix('-') {
        stripped
    } else {
        let (year, rest) = take_digits(date, 4).ok_or(DateTimeError::InvalidYear)?;
        dt.year = Some(year as i32);
        rest
    };
    if rest.is_empty() {
        return Ok(());
    }

    let rest = rest.strip_prefix('-').ok_or_else(unexpected)?;
    let rest = match rest.strip_prefix('-') {
        Some(after) if !after.is_empty() => after,
        Some(_) => return Err(unexpected()),
        None => {
            let (month, rest) = take_digits(rest, 2).ok_or(DateTimeError::InvalidMonth)?;
            dt.month = Some(month);
            rest
        }
    };
    if rest.is_empty() {
        return Ok(());
    }

    let rest = rest.strip_prefix('-').ok_or_else(unexpected)?;
    let (day, rest) = take_digits(rest, 2).ok_or(DateTimeError::InvalidDay)?;
    dt.day = Some(day);
    if rest.is_empty() {
        Ok(())
    } else {
        Err(unexpected())
    }
}

fn parse_time_part(time: &str, dt: &mut Iso8601DateTime) -> Result<(), DateTimeError> {
    let (clock, tz) = extract_timezone(time);
    if let Some(tz) = tz {
        if tz == "Z" {
            dt.is_utc = true;
        } else {
            dt.tz_offset_minutes = Some(parse_timezone_offset(tz)?);
        }
    }
    let parts: Vec<&str> = clock.split(':').collect();
    if parts.len() > 3 {
        return Err(DateTimeError::ParseError(format!("too many time components: {time}")));
    }
    if let Some(hour) = parts.first()
        && *hour != "-"
    {
        dt.hour = Some(parse_two_digits(hour).ok_or(DateTimeError::InvalidHour)?);
    }
    if let Some(minute) = parts.get(1)
        && *minute != "-"
    {
        dt.minute = Some(parse_two_digits(minute).ok_or(DateTimeError::InvalidMinute)?);
    }
    if let Some(second) = parts.get(2) {
        let (whole, frac) = match second.split_once('.') {
            Some((whole, frac)) => (whole, Some(frac)),
            None => (*second, None),
        };
        dt.second = Some(parse_two_digits(whole).ok_or(DateTimeError::InvalidSecond)?);
        if let Some(frac) = frac {
            if frac.is_empty() || frac.len() > 9 || !frac.chars().all(|ch| ch.is_ascii_digit()) {
                return Err(DateTimeError::InvalidSecond);
            }
            let padded = format!("{frac:0<9}");
            dt.nanosecond = Some(padded.parse().map_err(|_| DateTimeError::InvalidSecond)?);
        }
    }
    Ok(())
}

fn parse_two_digits(text: &str) -> Option<u32> {
    match take_digits(text, 2) {
        Some((value, "")) => Some(value),
        _ => None,
    }
}

fn extract_timezone(time: &str) -> (&str, Option<&str>) {
    if let Some(stripped) = time.strip_suffix('Z') {
        return (stripped, Some("Z"));
    }
    match time.rfind(['+', '-']) {
        Some(idx) if idx > 0 && time.len() - idx >= 5 => (&time[..idx], Some(&time[idx..])),
        _ => (time, None),
    }
}

fn parse_timezone_offset(tz: &str) -> Result<i32, DateTimeError> {
    let sign = match tz.chars().next() {
        Some('+') => 1,
        Some('-') => -1,
        _ => return Err(DateTimeError::InvalidTimezone),
    };
    let (hours, minutes) = tz[1..]
        .split_once(':')
        .ok_or(DateTimeError::InvalidTimezone)?;
    let hours = parse_two_digits(hours).ok_or(DateTimeError::InvalidTimezone)?;
    let minutes = parse_two_digits(minutes).ok_or(DateTimeError::InvalidTimezone)?;
    if hours > 14 || minutes > 59 {
        return Err(DateTimeError::InvalidTimezone);
    }
    Ok(sign * (hours as i32 * 60 + minutes as i32))
}

fn max_days_in_month(year: Option<i32>, month: Option<u32>) -> u32 {
    match month {
        Some(4 | 6 | 9 | 11) => 30,
        Some(2) => match year {
            Some(year) if !is_leap_year(year) => 28,
            _ => 29,
        },
        _ => 31,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

const UNKNOWN_TOKENS: [&str; 4] = ["UN", "UNK", "NK", "UNKN"];

fn is_unknown_token(token: &str) -> bool {
    UNKNOWN_TOKENS.contains(&token)
}

const NON_ISO_FORMATS: [&str; 5] = ["%Y/%m/%d", "%d-%b-%Y", "%d%b%Y", "%d %b %Y", "%m/%d/%Y"];

/// Normalize a raw date value to ISO 8601.
///
/// Valid ISO values (including date-times) are kept as written. Partial
/// dates with unknown markers (`UN`, `UNK`, `NK`) are truncated at the first
/// unknown component. A handful of common non-ISO layouts are converted to
/// `YYYY-MM-DD`. Anything else is returned trimmed but otherwise unchanged.
pub fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if is_iso8601_datetime(trimmed) {
        return trimmed.to_string();
    }
    let upper = trimmed.to_uppercase();
    if let Some(partial) = truncate_unknown_components(&upper) {
        return partial;
    }
    if let Some((date, time)) = upper.split_once(' ')
        && !time.trim().is_empty()
    {
        let joined = format!("{}T{}", date.trim(), time.trim());
        if is_iso8601_datetime(&joined) {
            return joined;
        }
    }
    if upper.len() == 8
        && upper.chars().all(|ch| ch.is_ascii_digit())
        && let Some(date) = NaiveDate::parse_from_str(&upper, "%Y%m%d").ok()
    {
        return date.format("%Y-%m-%d").to_string();
    }
    for pattern in NON_ISO_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&upper, pattern) {
            return date.format("%Y-%m-%d").to_string();
        }
    }
    trimmed.to_string()
}

/// `2023-UN-UN` -> `2023`, `UN-MAR-2021` -> `2021-03`, `UNK-UNK-UNKN` -> ``.
fn truncate_unknown_components(upper: &str) -> Option<String> {
    let tokens: Vec<&str> = upper
        .split(['-', '/', ' '])
        .filter(|token| !token.is_empty())
        .collect();
    if tokens.is_empty() || tokens.len() > 3 || !tokens.iter().any(|token| is_unknown_token(token))
    {
        return None;
    }
    let is_year = |token: &str| token.len() == 4 && token.chars().all(|ch| ch.is_ascii_digit());
    // year, month, day
    let ordered: Vec<&str> = if is_year(tokens[0]) {
        tokens.clone()
    } else if tokens.last().is_some_and(|token| is_year(token)) {
        match tokens.as_slice() {
            [month, day, year] if upper.contains('/') => vec![*year, *month, *day],
            _ => tokens.iter().rev().copied().collect(),
        }
    } else {
        return Some(String::new());
    };

    let mut result = String::new();
    for (idx, token) in ordered.iter().enumerate() {
        if is_unknown_token(token) {
            break;
        }
        match idx {
            0 => result.push_str(token),
            1 => {
                let month = parse_month_token(token)?;
                result.push_str(&format!("-{month:02}"));
            }
            _ => {
                let day: u32 = token.parse().ok().filter(|day| (1..=31).contains(day))?;
                result.push_str(&format!("-{day:02}"));
            }
        }
    }
    Some(result)
}

fn parse_month_token(token: &str) -> Option<u32> {
    if let Ok(month) = token.parse::<u32>() {
        return (1..=12).contains(&month).then_some(month);
    }
    const MONTHS: [&str; 12] = [
        "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
    ];
    let prefix = token.get(..3)?;
    MONTHS
        .iter()
        .position(|month| *month == prefix)
        .map(|idx| idx as u32 + 1)
}

/// Complete calendar date of a value after normalization; partial dates yield `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_iso8601_datetime(&normalize_date(raw))
        .ok()?
        .to_naive_date()
}

/// SDTM study day of `observation` relative to `baseline`.
///
/// Only the date portion is compared. There is no day zero: the baseline
/// date is day 1 and the day before it is day -1.
pub fn study_day(observation: &str, baseline: &str) -> Option<i64> {
    let observation = parse_date(observation)?;
    let baseline = parse_date(baseline)?;
    let delta = observation.signed_duration_since(baseline).num_days();
    Some(if delta >= 0 { delta + 1 } else { delta })
}

/// Order two values when both carry a complete date.
///
/// Time of day participates only when both sides have one.
pub fn compare_dates(left: &str, right: &str) -> Option<Ordering> {
    let left = parse_iso8601_datetime(&normalize_date(left)).ok()?;
    let right = parse_iso8601_datetime(&normalize_date(right)).ok()?;
    if left.has_time() && right.has_time() {
        return Some(left.to_naive_datetime()?.cmp(&right.to_naive_datetime()?));
    }
    Some(left.to_naive_date()?.cmp(&right.to_naive_date()?))
}
