use std::fmt;
use std::ops::{Add, Neg, Sub};

/// A signed duration, stored as a total number of seconds.
///
/// Literal syntax is `M:SS` or `H:MM:SS`; rendering always carries seconds
/// and minutes into their canonical 0-59 ranges, so `90:00` displays as
/// `1:30:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time {
    secs: i64,
}

impl Time {
    pub fn from_secs(secs: i64) -> Self {
        Self { secs }
    }

    pub fn from_hms(hours: i64, minutes: i64, seconds: i64) -> Self {
        Self {
            secs: hours * 3600 + minutes * 60 + seconds,
        }
    }

    pub fn total_secs(&self) -> i64 {
        self.secs
    }

    /// Scale by a numeric factor, rounding to the nearest whole second.
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            secs: (self.secs as f64 * factor).round() as i64,
        }
    }
}

impl Add for Time {
    type Output = Time;

    fn add(self, rhs: Time) -> Time {
        Time::from_secs(self.secs + rhs.secs)
    }
}

impl Sub for Time {
    type Output = Time;

    fn sub(self, rhs: Time) -> Time {
        Time::from_secs(self.secs - rhs.secs)
    }
}

impl Neg for Time {
    type Output = Time;

    fn neg(self) -> Time {
        Time::from_secs(-self.secs)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let total = self.secs.unsigned_abs();
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;

        if self.secs < 0 {
            write!(f, "-")?;
        }
        if hours > 0 {
            write!(f, "{}:{:02}:{:02}", hours, minutes, seconds)
        } else {
            write!(f, "{}:{:02}", minutes, seconds)
        }
    }
}

/// Runtime datum of the calculator. The domain tag travels with the value
/// from the lexer through evaluation; it is never re-derived from text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    Double(f64),
    Time(Time),
}

impl Value {
    pub fn is_time(&self) -> bool {
        matches!(self, Value::Time(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) | Value::Double(_) => "number",
            Value::Time(_) => "time",
        }
    }

    /// Collapse an integral floating result to its integer representation.
    /// Times and integers pass through unchanged.
    pub fn trim(self) -> Value {
        match self {
            Value::Double(n) if n.is_finite() && n.fract() == 0.0 => Value::Int(n as i64),
            other => other,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Double(n) => {
                // Always show at least one decimal place for doubles
                if n.fract() == 0.0 {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Time(t) => write!(f, "{}", t),
        }
    }
}
