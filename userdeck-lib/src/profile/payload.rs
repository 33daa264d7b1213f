use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::profile::{Field, ProfileDraft, UserRecord, parse_date, start_of_day_utc};

/// Body of the full-replace `PUT /users/{id}` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatePayload {
    pub name: String,
    pub email: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub birthday: Option<DateTime<Utc>>,
    pub about: String,
    pub picture: String,
}

impl UpdatePayload {
    /// The record the server holds once this payload has been accepted
    pub fn to_record(&self) -> UserRecord {
        UserRecord {
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            birthday: self.birthday.as_ref().map(format_timestamp),
            about: Some(self.about.clone()),
            picture: Some(self.picture.clone()),
        }
    }
}

/// Build the update payload from a draft.
///
/// Each field takes the draft value unless it is empty, in which case the first non-empty
/// value among `fallbacks` is used. A cleared field therefore keeps its previous value unless
/// nothing is known about it. The birthday is sent as the start of that day in UTC, or `null`.
pub fn build_update(draft: &ProfileDraft, fallbacks: &[&UserRecord]) -> UpdatePayload {
    let text = |field: Field| -> String {
        let value = draft.get(field);
        if !value.is_empty() {
            return value.to_string();
        }
        fallbacks
            .iter()
            .find_map(|record| record.get(field))
            .unwrap_or_default()
            .to_string()
    };

    let birthday = if draft.birthday.is_empty() {
        fallbacks
            .iter()
            .find_map(|record| record.birthday_timestamp())
    } else {
        parse_date(&draft.birthday).map(start_of_day_utc)
    };

    UpdatePayload {
        name: text(Field::Name),
        email: text(Field::Email),
        birthday,
        about: text(Field::About),
        picture: text(Field::Picture),
    }
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_timestamp<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(ts) => serializer.serialize_str(&format_timestamp(ts)),
        None => serializer.serialize_none(),
    }
}
