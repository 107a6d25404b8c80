//! Lenient field decoders for the service's JSON.
//!
//! The API is inconsistent about scalars: the same field may arrive as a JSON
//! number, a numeric string, or an empty string meaning "unset". These helpers
//! are used through `#[serde(deserialize_with = ...)]` on the domain types.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use tracing::debug;

/// Date-time layouts seen in responses, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Str(s) => s,
        }
    }
}

/// Enumerations that travel as numeric codes.
///
/// The service adds codes over time, so decoding never rejects a number:
/// codes without a named variant are kept through [`Coded::unknown`].
pub trait Coded: Sized + Copy {
    const NAME: &'static str;

    fn code(self) -> u16;

    /// The named variant for `code`, if there is one.
    fn from_code(code: u16) -> Option<Self>;

    /// The catch-all variant carrying an unrecognised code.
    fn unknown(code: u16) -> Self;

    fn from_wire(code: u16) -> Self {
        Self::from_code(code).unwrap_or_else(|| {
            debug!(kind = Self::NAME, code, "unrecognised code kept as unknown");
            Self::unknown(code)
        })
    }
}

fn parse_scalar<T, E>(raw: Scalar) -> Result<Option<T>, E>
where
    T: FromStr,
    T::Err: Display,
    E: de::Error,
{
    let text = raw.into_string();
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse()
        .map(Some)
        .map_err(|e| E::custom(format!("invalid number {text:?}: {e}")))
}

pub(crate) fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Scalar::deserialize(deserializer).map(Scalar::into_string)
}

pub(crate) fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_string))
}

/// Like [`opt_string`], but an empty string is treated as absent.
pub(crate) fn opt_non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_string(deserializer)?.filter(|s| !s.is_empty()))
}

pub(crate) fn number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    parse_scalar(Scalar::deserialize(deserializer)?)?
        .ok_or_else(|| de::Error::custom("expected a number, found an empty string"))
}

pub(crate) fn opt_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        Some(raw) => parse_scalar(raw),
        None => Ok(None),
    }
}

/// Dash-joined numbers such as `"99.98-100-97.5"`.
pub(crate) fn dash_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = Option::<Scalar>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    raw.into_string()
        .split('-')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            part.trim()
                .parse()
                .map_err(|e| de::Error::custom(format!("invalid list item {part:?}: {e}")))
        })
        .collect()
}

pub(crate) fn coded<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Coded,
{
    let code: u16 = number(deserializer)?;
    Ok(T::from_wire(code))
}

/// Codes where `0` or an empty string stands for "not set".
pub(crate) fn opt_coded<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Coded,
{
    Ok(opt_number::<D, u16>(deserializer)?
        .filter(|&code| code != 0)
        .map(T::from_wire))
}

/// Codes where only an empty string stands for "not set"; `0` is a real value.
pub(crate) fn opt_code_or_empty<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Coded,
{
    Ok(opt_number::<D, u16>(deserializer)?.map(T::from_wire))
}

pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

pub(crate) fn datetime<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Scalar::deserialize(deserializer)?.into_string();
    parse_datetime(&raw).ok_or_else(|| de::Error::custom(format!("invalid datetime {raw:?}")))
}
