//! Numeric coercion of incoming sampling parameters.
//!
//! Clients send these as JSON numbers or as strings straight out of form
//! inputs. Parsing mirrors the lenient prefix rules browsers use for
//! `parseFloat`/`parseInt`: leading whitespace is skipped, the longest numeric
//! prefix wins, and anything without one becomes [`Param::Invalid`] rather
//! than an error.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Outcome of coercing one optional parameter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Param<T> {
    #[default]
    Absent,
    Value(T),
    Invalid,
}

impl<T: Copy> Param<T> {
    pub fn is_invalid(&self) -> bool {
        matches!(self, Param::Invalid)
    }

    pub fn value(&self) -> Option<T> {
        match self {
            Param::Value(v) => Some(*v),
            _ => None,
        }
    }
}

/// Parameter bag as received. Fields outside the six numeric ones are kept
/// verbatim in `rest`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawParams {
    pub temperature: Option<Value>,
    pub max_tokens: Option<Value>,
    pub top_p: Option<Value>,
    pub frequency_penalty: Option<Value>,
    pub presence_penalty: Option<Value>,
    pub n: Option<Value>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SanitizedParams {
    pub temperature: Param<f64>,
    pub max_tokens: Param<i64>,
    pub top_p: Param<f64>,
    pub frequency_penalty: Param<f64>,
    pub presence_penalty: Param<f64>,
    pub n: Param<i64>,
    pub rest: Map<String, Value>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("invalid numeric parameter: {0}")]
    Invalid(&'static str),
}

impl SanitizedParams {
    /// Name of the first parameter that failed to parse, if any.
    pub fn first_invalid(&self) -> Option<&'static str> {
        [
            ("temperature", self.temperature.is_invalid()),
            ("max_tokens", self.max_tokens.is_invalid()),
            ("top_p", self.top_p.is_invalid()),
            ("frequency_penalty", self.frequency_penalty.is_invalid()),
            ("presence_penalty", self.presence_penalty.is_invalid()),
            ("n", self.n.is_invalid()),
        ]
        .into_iter()
        .find_map(|(name, invalid)| invalid.then_some(name))
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        match self.first_invalid() {
            Some(name) => Err(ParamError::Invalid(name)),
            None => Ok(()),
        }
    }
}

pub fn sanitize(raw: RawParams) -> SanitizedParams {
    SanitizedParams {
        temperature: coerce_float(raw.temperature.as_ref()),
        max_tokens: coerce_int(raw.max_tokens.as_ref()),
        top_p: coerce_float(raw.top_p.as_ref()),
        frequency_penalty: coerce_float(raw.frequency_penalty.as_ref()),
        presence_penalty: coerce_float(raw.presence_penalty.as_ref()),
        n: coerce_int(raw.n.as_ref()),
        rest: raw.rest,
    }
}

fn coerce_float(value: Option<&Value>) -> Param<f64> {
    match value {
        None | Some(Value::Null) => Param::Absent,
        Some(Value::Number(n)) => n.as_f64().map_or(Param::Invalid, Param::Value),
        Some(Value::String(s)) => parse_float_prefix(s).map_or(Param::Invalid, Param::Value),
        Some(_) => Param::Invalid,
    }
}

fn coerce_int(value: Option<&Value>) -> Param<i64> {
    match value {
        None | Some(Value::Null) => Param::Absent,
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => Param::Value(i),
            None => n
                .as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map_or(Param::Invalid, |f| Param::Value(f.trunc() as i64)),
        },
        Some(Value::String(s)) => parse_int_prefix(s).map_or(Param::Invalid, Param::Value),
        Some(_) => Param::Invalid,
    }
}

/// `deserialize_with` helper for stored float fields. Unparseable input is
/// kept as NaN, matching what the relay forwards for the same value.
pub fn lenient_float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match coerce_float(value.as_ref()) {
        Param::Absent => None,
        Param::Value(v) => Some(v),
        Param::Invalid => Some(f64::NAN),
    })
}

/// `deserialize_with` helper for stored integer fields. Integers have no
/// NaN, so unparseable input is left unset.
pub fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(coerce_int(value.as_ref()).value())
}

/// Longest decimal float prefix of `s`, e.g. `" 0.7abc"` -> `0.7`.
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return s[..end + "Infinity".len()].replace("Infinity", "inf").parse().ok();
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// Longest base-10 integer prefix of `s`, e.g. `"12.9"` -> `12`.
pub fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    s[..end].parse().ok()
}
