//! ISO 8601 durations for `--DUR`, `--ELTM` and `--EVLINT` variables.

use std::fmt;

/// A parsed ISO 8601 duration (`PnYnMnDTnHnMnS` or `PnW`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Iso8601Duration {
    pub negative: bool,
    pub years: Option<f64>,
    pub months: Option<f64>,
    pub weeks: Option<f64>,
    pub days: Option<f64>,
    pub hours: Option<f64>,
    pub minutes: Option<f64>,
    pub seconds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DurationError {
    MissingPPrefix,
    Empty,
    /// `PnW` may not be combined with other components.
    WeeksMixed,
    /// Only the lowest-order component may carry a fraction.
    FractionNotLast,
    InvalidComponent(String),
}

impl fmt::Display for DurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPPrefix => write!(f, "duration must start with 'P'"),
            Self::Empty => write!(f, "duration has no components"),
            Self::WeeksMixed => write!(f, "weeks cannot be combined with other components"),
            Self::FractionNotLast => {
                write!(f, "only the lowest-order component may have a fraction")
            }
            Self::InvalidComponent(part) => write!(f, "invalid duration component: {part}"),
        }
    }
}

impl std::error::Error for DurationError {}

/// Parse an ISO 8601 duration.
pub fn parse_iso8601_duration(value: &str) -> Result<Iso8601Duration, DurationError> {
    let (negative, body) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };
    let body = body.strip_prefix('P').ok_or(DurationError::MissingPPrefix)?;
    let (date_part, time_part) = match body.split_once('T') {
        Some((date, time)) => {
            if time.is_empty() {
                return Err(DurationError::InvalidComponent("T".to_string()));
            }
            (date, Some(time))
        }
        None => (body, None),
    };

    let mut duration = Iso8601Duration {
        negative,
        ..Iso8601Duration::default()
    };
    let mut components = Vec::new();
    for (number, designator) in split_components(date_part)? {
        let slot = match designator {
            'Y' => &mut duration.years,
            'M' => &mut duration.months,
            'W' => &mut duration.weeks,
            'D' => &mut duration.days,
            other => return Err(DurationError::InvalidComponent(other.to_string())),
        };
        components.push(assign(slot, &number, designator)?);
    }
    if let Some(time) = time_part {
        for (number, designator) in split_components(time)? {
            let slot = match designator {
                'H' => &mut duration.hours,
                'M' => &mut duration.minutes,
                'S' => &mut duration.seconds,
                other => return Err(DurationError::InvalidComponent(other.to_string())),
            };
            components.push(assign(slot, &number, designator)?);
        }
    }

    if components.is_empty() {
        return Err(DurationError::Empty);
    }
    if duration.weeks.is_some() && components.len() > 1 {
        return Err(DurationError::WeeksMixed);
    }
    let fractional = components.iter().position(|has_fraction| *has_fraction);
    if fractional.is_some_and(|idx| idx + 1 != components.len()) {
        return Err(DurationError::FractionNotLast);
    }
    Ok(duration)
}

/// Components in designator order; each entry is `(number, designator)`.
fn split_components(text: &str) -> Result<Vec<(String, char)>, DurationError> {
    let mut parts = Vec::new();
    let mut number = String::new();
    for ch in text.chars() {
        if ch.is_ascii_digit() || ch == '.' || ch == ',' {
            number.push(ch);
        } else if number.is_empty() {
            return Err(DurationError::InvalidComponent(ch.to_string()));
        } else {
            parts.push((std::mem::take(&mut number), ch));
        }
    }
    if !number.is_empty() {
        return Err(DurationError::InvalidComponent(number));
    }
    Ok(parts)
}

/// Store a component, returning whether it had a fraction.
fn assign(slot: &mut Option<f64>, number: &str, designator: char) -> Result<bool, DurationError> {
    let invalid = || DurationError::InvalidComponent(format!("{number}{designator}"));
    if slot.is_some() {
        return Err(invalid());
    }
    let value: f64 = number.replace(',', ".").parse().map_err(|_| invalid())?;
    *slot = Some(value);
    Ok(number.contains(['.', ',']))
}

/// True when `value` matches the permitted ISO 8601 duration grammar.
pub fn is_iso8601_duration(value: &str) -> bool {
    parse_iso8601_duration(value).is_ok()
}

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

#[derive(Debug, Clone, Copy)]
enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
}

fn unit_for(token: &str) -> Option<Unit> {
    let unit = match token {
        "S" | "SEC" | "SECS" | "SECOND" | "SECONDS" => Unit::Second,
        "M" | "MIN" | "MINS" | "MINUTE" | "MINUTES" => Unit::Minute,
        "H" | "HR" | "HRS" | "HOUR" | "HOURS" => Unit::Hour,
        "D" | "DAY" | "DAYS" => Unit::Day,
        "W" | "WK" | "WKS" | "WEEK" | "WEEKS" => Unit::Week,
        _ => return None,
    };
    Some(unit)
}

/// Normalize free-text durations to `P[nD][T[nH][nM][nS]]`.
///
/// Accepts ISO durations, clock times (`HH:MM[:SS]`), bare numbers
/// (minutes) and number/unit phrases such as `1 hour 30 min` or `2 DAYS`.
/// ISO durations with years, months or a sign have no fixed length and are
/// kept as written (upper-cased); every other input is re-emitted in the
/// canonical form, weeks as days. Input with an unknown unit, or too large
/// to represent, yields an empty string. Hours never roll over into days.
pub fn normalize_duration(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let upper = trimmed.to_uppercase();
    let parsed = match parse_iso8601_duration(&upper) {
        Ok(iso) if iso.negative || iso.years.is_some() || iso.months.is_some() => {
            return upper;
        }
        Ok(iso) => iso_span(&iso),
        Err(_) => clock_millis(&upper)
            .map(|time| Span { days: 0, time })
            .or_else(|| {
                parse_number(&upper)
                    .and_then(|minutes| to_millis(minutes, MS_PER_MINUTE))
                    .map(|time| Span { days: 0, time })
            })
            .or_else(|| phrase_span(&upper)),
    };
    match parsed {
        Some(span) => span.to_iso8601(),
        None => String::new(),
    }
}

/// Whole days plus a time-of-day part in milliseconds (may exceed 24 hours).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Span {
    days: i64,
    time: i64,
}

fn parse_number(text: &str) -> Option<f64> {
    let value: f64 = text.parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// `None` when the result does not fit in an `i64`.
fn to_millis(value: f64, unit_ms: i64) -> Option<i64> {
    let millis = (value * unit_ms as f64).round();
    (millis.is_finite() && millis >= 0.0 && millis < i64::MAX as f64).then_some(millis as i64)
}

fn clock_millis(text: &str) -> Option<i64> {
    let parts: Vec<&str> = text.split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return None;
    }
    let mut numbers = Vec::with_capacity(parts.len());
    for part in &parts {
        if part.is_empty() || !part.chars().all(|ch| ch.is_ascii_digit()) {
            return None;
        }
        numbers.push(part.parse::<i64>().ok()?);
    }
    let (hours, minutes) = (numbers[0], numbers[1]);
    let seconds = numbers.get(2).copied().unwrap_or(0);
    if minutes > 59 || seconds > 59 {
        return None;
    }
    hours
        .checked_mul(MS_PER_HOUR)?
        .checked_add(minutes * MS_PER_MINUTE)?
        .checked_add(seconds * MS_PER_SECOND)
}

/// Split `1.5HOURS, 20 min` into `["1.5", "HOURS", "20", "MIN"]`.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_numeric = false;
    for ch in text.chars() {
        if ch.is_whitespace() || ch == ',' {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            continue;
        }
        let numeric = ch.is_ascii_digit() || ch == '.';
        if !current.is_empty() && numeric != current_numeric {
            tokens.push(std::mem::take(&mut current));
        }
        current_numeric = numeric;
        current.push(ch);
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn phrase_span(text: &str) -> Option<Span> {
    let mut span = Span::default();
    let mut pending: Option<f64> = None;
    let mut saw_unit = false;
    for token in tokenize(text).iter().filter(|token| token.as_str() != "AND") {
        if let Some(value) = parse_number(token) {
            if pending.is_some() {
                return None;
            }
            pending = Some(value);
            continue;
        }
        let value = pending.take()?;
        span.add(unit_for(token)?, value)?;
        saw_unit = true;
    }
    if pending.is_some() || !saw_unit {
        return None;
    }
    Some(span)
}

fn iso_span(iso: &Iso8601Duration) -> Option<Span> {
    let mut span = Span::default();
    let components = [
        (iso.weeks, Unit::Week),
        (iso.days, Unit::Day),
        (iso.hours, Unit::Hour),
        (iso.minutes, Unit::Minute),
        (iso.seconds, Unit::Second),
    ];
    for (value, unit) in components {
        if let Some(value) = value {
            span.add(unit, value)?;
        }
    }
    Some(span)
}

impl Span {
    /// `None` on overflow.
    fn add(&mut self, unit: Unit, value: f64) -> Option<()> {
        match unit {
            Unit::Second => self.add_time(to_millis(value, MS_PER_SECOND)?),
            Unit::Minute => self.add_time(to_millis(value, MS_PER_MINUTE)?),
            Unit::Hour => self.add_time(to_millis(value, MS_PER_HOUR)?),
            Unit::Day => self.add_days(value),
            Unit::Week => self.add_days(value * 7.0),
        }
    }

    fn add_time(&mut self, millis: i64) -> Option<()> {
        self.time = self.time.checked_add(millis)?;
        Some(())
    }

    /// Fractional days spill into the time part.
    fn add_days(&mut self, value: f64) -> Option<()> {
        let whole = value.trunc();
        if !whole.is_finite() || whole >= i64::MAX as f64 {
            return None;
        }
        self.days = self.days.checked_add(whole as i64)?;
        self.add_time(to_millis(value - whole, MS_PER_DAY)?)
    }

    fn to_iso8601(self) -> String {
        if self.days == 0 && self.time == 0 {
            return "PT0M".to_string();
        }
        let hours = self.time / MS_PER_HOUR;
        let minutes = (self.time % MS_PER_HOUR) / MS_PER_MINUTE;
        let rest = self.time % MS_PER_MINUTE;

        let mut result = String::from("P");
        if self.days > 0 {
            result.push_str(&format!("{}D", self.days));
        }
        if self.time > 0 {
            result.push('T');
            if hours > 0 {
                result.push_str(&format!("{hours}H"));
            }
            if minutes > 0 {
                result.push_str(&format!("{minutes}M"));
            }
            if rest > 0 {
                let whole = rest / MS_PER_SECOND;
                let fraction = rest % MS_PER_SECOND;
                if fraction == 0 {
                    result.push_str(&format!("{whole}S"));
                } else {
                    let digits = format!("{fraction:03}");
                    result.push_str(&format!("{whole}.{}S", digits.trim_end_matches('0')));
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_splits_glued_units() {
        assert_eq!(tokenize("1.5HOURS, 20 min"), vec!["1.5", "HOURS", "20", "min"]);
    }

    #[test]
    fn hours_do_not_roll_into_days() {
        let span = |days, time| Span { days, time }.to_iso8601();
        assert_eq!(span(0, 36 * MS_PER_HOUR), "PT36H");
        assert_eq!(span(0, 90 * MS_PER_MINUTE), "PT1H30M");
        assert_eq!(span(2, 1_500), "P2DT1.5S");
    }

    #[test]
    fn oversized_spans_are_rejected() {
        assert_eq!(clock_millis("99999999999999:00"), None);
        assert_eq!(to_millis(f64::MAX, MS_PER_HOUR), None);
        let mut span = Span::default();
        assert_eq!(span.add_days(1e300), None);
    }
}
