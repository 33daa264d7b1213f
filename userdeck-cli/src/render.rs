use colored::Colorize;
use strum::IntoEnumIterator;
use userdeck_lib::{Field, Notice, ProfileDraft, UserRecord, profile::ValidationReport};

fn label(field: Field) -> &'static str {
    match field {
        Field::Name => "Full Name",
        Field::Email => "Email Address",
        Field::Birthday => "Birthday",
        Field::About => "About",
        Field::Picture => "Profile Picture URL",
    }
}

/// Print every field of the draft, each followed by its error if it has one
pub fn draft(draft: &ProfileDraft, errors: &ValidationReport) {
    for field in Field::iter() {
        let value = draft.get(field);
        let value = if value.is_empty() {
            "-".dimmed().to_string()
        } else {
            value.to_string()
        };

        let suffix = if field.is_editable() { "" } else { " (read-only)" };
        println!(
            "{}: {value}{}",
            format!("{:>20}", label(field)).bold(),
            suffix.dimmed()
        );

        if let Some(err) = errors.get(field) {
            println!("{:>22}{}", "", err.to_string().red());
        }
    }
}

pub fn record(record: &UserRecord) {
    draft(&ProfileDraft::from_record(record), &ValidationReport::default());
}

pub fn notice(notice: &Notice) {
    if notice.is_error() {
        eprintln!("{}", notice.message.red());
    } else {
        println!("{}", notice.message.green());
    }
}
