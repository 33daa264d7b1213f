//! The editable profile and its wire representation.
//!
//! A [`ProfileDraft`] holds exactly what the user sees in the form, as strings. A
//! [`UserRecord`] is what the user directory (or the identity provider's cache) stores.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

pub mod payload;
pub mod validate;

pub use payload::{UpdatePayload, build_update};
pub use validate::{FieldError, ValidationReport, validate};

/// Calendar date format used by the form's birthday field
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Birthday,
    About,
    Picture,
}

impl Field {
    /// Whether the user may edit this field in the form
    pub fn is_editable(&self) -> bool {
        !matches!(self, Field::Email)
    }
}

/// The in-memory, user-editable copy of a profile. An empty string means the field is absent.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    pub name: String,
    pub email: String,
    /// `YYYY-MM-DD`
    pub birthday: String,
    pub about: String,
    pub picture: String,
}

impl ProfileDraft {
    /// Populate a draft from a stored record, converting the birthday timestamp to its UTC
    /// calendar date.
    pub fn from_record(record: &UserRecord) -> Self {
        Self {
            name: record.name.clone().unwrap_or_default(),
            email: record.email.clone().unwrap_or_default(),
            birthday: record
                .birthday_date()
                .map(|date| date.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            about: record.about.clone().unwrap_or_default(),
            picture: record.picture.clone().unwrap_or_default(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Birthday => &self.birthday,
            Field::About => &self.about,
            Field::Picture => &self.picture,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Birthday => &mut self.birthday,
            Field::About => &mut self.about,
            Field::Picture => &mut self.picture,
        };
        *slot = value.into();
    }
}

/// A profile as stored by the user directory. Every field may be missing or `null`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// ISO timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

impl UserRecord {
    pub fn birthday_timestamp(&self) -> Option<DateTime<Utc>> {
        self.birthday.as_deref().and_then(parse_timestamp)
    }

    pub fn birthday_date(&self) -> Option<NaiveDate> {
        self.birthday_timestamp().map(|ts| ts.date_naive())
    }

    /// Value of a string field, treating empty strings as absent
    pub fn get(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Birthday => &self.birthday,
            Field::About => &self.about,
            Field::Picture => &self.picture,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }
}

/// Parse a stored timestamp. Accepts RFC 3339, a naive date-time (taken as UTC) or a bare
/// calendar date (start of day, UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .map(start_of_day_utc)
}

/// Parse the form's birthday field. Full timestamps are accepted too and reduced to their
/// UTC date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .ok()
        .or_else(|| parse_timestamp(raw).map(|ts| ts.date_naive()))
}

pub fn start_of_day_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
