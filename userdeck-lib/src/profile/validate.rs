use std::{collections::BTreeMap, sync::LazyLock};

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use thiserror::Error;

use crate::profile::{Field, ProfileDraft, parse_date};

pub const NAME_MIN_CHARS: usize = 2;
pub const ABOUT_MAX_CHARS: usize = 500;
pub const MINIMUM_AGE: i32 = 13;

/// Optional scheme, dotted host name, optional path.
static PICTURE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?([A-Za-z0-9_-]+\.)+[A-Za-z0-9_-]+(/[A-Za-z0-9_\-./?%&=]*)?$")
        .expect("picture URL pattern is valid")
});

/// Why a single field failed validation. The display text is shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Name is required and must be at least 2 characters long")]
    RequiredTooShort,
    #[error("Invalid date format")]
    InvalidDate,
    #[error("Birthday cannot be a future date")]
    FutureDate,
    #[error("You must be at least 13 years old")]
    Underage,
    #[error("About section cannot exceed 500 characters")]
    TooLong,
    #[error("Please enter a valid URL")]
    InvalidUrl,
}

/// Field-level errors found in a draft, at most one per field.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    errors: BTreeMap<Field, FieldError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: Field) -> Option<FieldError> {
        self.errors.get(&field).copied()
    }

    pub fn errors(&self) -> impl Iterator<Item = (Field, FieldError)> + '_ {
        self.errors.iter().map(|(field, err)| (*field, *err))
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Drop the error for one field, leaving the rest untouched
    pub fn clear(&mut self, field: Field) -> Option<FieldError> {
        self.errors.remove(&field)
    }

    fn insert(&mut self, field: Field, err: FieldError) {
        self.errors.insert(field, err);
    }
}

/// Validate every field of `draft` as of `today`.
pub fn validate(draft: &ProfileDraft, today: NaiveDate) -> ValidationReport {
    let mut report = ValidationReport::default();

    if draft.name.trim().chars().count() < NAME_MIN_CHARS {
        report.insert(Field::Name, FieldError::RequiredTooShort);
    }

    if !draft.birthday.is_empty()
        && let Err(err) = check_birthday(&draft.birthday, today)
    {
        report.insert(Field::Birthday, err);
    }

    if draft.about.chars().count() > ABOUT_MAX_CHARS {
        report.insert(Field::About, FieldError::TooLong);
    }

    if !draft.picture.is_empty() && !PICTURE_URL.is_match(&draft.picture) {
        report.insert(Field::Picture, FieldError::InvalidUrl);
    }

    report
}

fn check_birthday(raw: &str, today: NaiveDate) -> Result<(), FieldError> {
    let birthday = parse_date(raw).ok_or(FieldError::InvalidDate)?;

    if birthday > today {
        return Err(FieldError::FutureDate);
    }

    if age_on(birthday, today) < MINIMUM_AGE {
        return Err(FieldError::Underage);
    }

    Ok(())
}

/// Whole years between `birthday` and `today`.
pub fn age_on(birthday: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birthday.year();

    if (today.month(), today.day()) < (birthday.month(), birthday.day()) {
        age -= 1;
    }

    age
}

#[cfg(test)]
mod test {
    use chrono::Days;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn draft() -> ProfileDraft {
        ProfileDraft {
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_draft_is_valid() {
        assert!(validate(&draft(), today()).is_valid());
    }

    #[test]
    fn test_short_names_rejected() {
        for name in ["", " ", "A", "  B  ", "\tx\n"] {
            let report = validate(
                &ProfileDraft {
                    name: name.into(),
                    ..draft()
                },
                today(),
            );

            assert!(!report.is_valid(), "{name:?} should be rejected");
            assert_eq!(report.get(Field::Name), Some(FieldError::RequiredTooShort));
        }

        let report = validate(
            &ProfileDraft {
                name: " Al ".into(),
                ..draft()
            },
            today(),
        );
        assert!(report.is_valid());
    }

    #[test]
    fn test_future_birthday() {
        for days in [1, 30, 4000] {
            let birthday = today().checked_add_days(Days::new(days)).unwrap();
            let report = validate(
                &ProfileDraft {
                    birthday: birthday.format("%Y-%m-%d").to_string(),
                    ..draft()
                },
                today(),
            );

            assert_eq!(report.get(Field::Birthday), Some(FieldError::FutureDate));
        }
    }

    #[test]
    fn test_thirteenth_birthday_boundary() {
        let exactly_13 = ProfileDraft {
            birthday: "2011-06-15".into(),
            ..draft()
        };
        assert!(validate(&exactly_13, today()).is_valid());

        let one_day_short = ProfileDraft {
            birthday: "2011-06-16".into(),
            ..draft()
        };
        assert_eq!(
            validate(&one_day_short, today()).get(Field::Birthday),
            Some(FieldError::Underage)
        );
    }

    #[test]
    fn test_birthday_today_is_underage_not_future() {
        let report = validate(
            &ProfileDraft {
                birthday: "2024-06-15".into(),
                ..draft()
            },
            today(),
        );

        assert_eq!(report.get(Field::Birthday), Some(FieldError::Underage));
    }

    #[test]
    fn test_invalid_birthday() {
        for birthday in ["not a date", "2001-13-01", "2001-02-30"] {
            let report = validate(
                &ProfileDraft {
                    birthday: birthday.into(),
                    ..draft()
                },
                today(),
            );

            assert_eq!(report.get(Field::Birthday), Some(FieldError::InvalidDate));
        }
    }

    #[test]
    fn test_leap_day_birthday() {
        let birthday = NaiveDate::from_ymd_opt(2008, 2, 29).unwrap();

        assert_eq!(age_on(birthday, NaiveDate::from_ymd_opt(2021, 2, 28).unwrap()), 12);
        assert_eq!(age_on(birthday, NaiveDate::from_ymd_opt(2021, 3, 1).unwrap()), 13);
    }

    #[test]
    fn test_about_length() {
        for len in [0, 1, 250, 500] {
            let report = validate(
                &ProfileDraft {
                    about: "x".repeat(len),
                    ..draft()
                },
                today(),
            );
            assert_eq!(report.get(Field::About), None, "length {len}");
        }

        let report = validate(
            &ProfileDraft {
                about: "x".repeat(501),
                ..draft()
            },
            today(),
        );
        assert_eq!(report.get(Field::About), Some(FieldError::TooLong));
    }

    #[test]
    fn test_about_counts_characters() {
        let report = validate(
            &ProfileDraft {
                about: "é".repeat(500),
                ..draft()
            },
            today(),
        );

        assert!(report.is_valid());
    }

    #[test]
    fn test_picture_urls() {
        for picture in [
            "https://example.com/a.jpg",
            "example.com/a.jpg",
            "http://cdn.images.example.org/u/1?size=64&fmt=png",
            "my-host.io",
        ] {
            let report = validate(
                &ProfileDraft {
                    picture: picture.into(),
                    ..draft()
                },
                today(),
            );
            assert!(report.is_valid(), "{picture} should be accepted");
        }

        for picture in ["not a url", "localhost", "ftp://example.com/a.jpg", "https://"] {
            let report = validate(
                &ProfileDraft {
                    picture: picture.into(),
                    ..draft()
                },
                today(),
            );
            assert_eq!(
                report.get(Field::Picture),
                Some(FieldError::InvalidUrl),
                "{picture} should be rejected"
            );
        }
    }

    #[test]
    fn test_reports_every_error_at_once() {
        let report = validate(
            &ProfileDraft {
                name: "".into(),
                email: "".into(),
                birthday: "2030-01-01".into(),
                about: "x".repeat(600),
                picture: "nope".into(),
            },
            today(),
        );

        assert_eq!(report.len(), 4);
        assert_eq!(
            report.errors().map(|(field, _)| field).collect::<Vec<_>>(),
            vec![Field::Name, Field::Birthday, Field::About, Field::Picture]
        );
    }

    #[test]
    fn test_clear_single_field() {
        let mut report = validate(
            &ProfileDraft {
                name: "".into(),
                picture: "nope".into(),
                ..draft()
            },
            today(),
        );

        assert_eq!(report.clear(Field::Name), Some(FieldError::RequiredTooShort));
        assert_eq!(report.get(Field::Picture), Some(FieldError::InvalidUrl));
        assert_eq!(report.len(), 1);
    }
}
