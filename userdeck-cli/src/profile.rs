use std::io::{self, BufRead, Write};

use clap::Subcommand;
use colored::Colorize;
use sysexits::ExitCode;
use tracing::warn;
use userdeck_lib::{Error, Field, Navigation, Outcome, ProfileFormController, Result};

use crate::render;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show your profile
    Show,
    /// Change profile fields and save them. Pass an empty value to clear a field.
    Edit {
        #[arg(long)]
        name: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        birthday: Option<String>,
        #[arg(long)]
        about: Option<String>,
        #[arg(long)]
        picture: Option<String>,
    },
    /// Permanently deactivate your profile and sign out
    Deactivate {
        /// Don't ask for confirmation
        #[arg(long)]
        yes: bool,
    },
}

pub async fn handle(form: &mut ProfileFormController, cmd: &Command) -> Result<ExitCode> {
    match cmd {
        Command::Show => {
            load(form).await?;
            render::draft(form.draft(), form.errors());
            Ok(ExitCode::Ok)
        }
        Command::Edit {
            name,
            birthday,
            about,
            picture,
        } => {
            load(form).await?;

            let edits = [
                (Field::Name, name),
                (Field::Birthday, birthday),
                (Field::About, about),
                (Field::Picture, picture),
            ];
            for (field, value) in edits {
                if let Some(value) = value {
                    form.set_field(field, value.as_str())?;
                }
            }

            let outcome = form.submit().await?;
            show_notice(form);

            match outcome {
                Outcome::Submitted(navigation) => {
                    navigate(form, navigation);
                    Ok(ExitCode::Ok)
                }
                Outcome::ValidationFailed(_) => {
                    render::draft(form.draft(), form.errors());
                    Ok(ExitCode::DataErr)
                }
                _ => Ok(ExitCode::Unavailable),
            }
        }
        Command::Deactivate { yes } => {
            let outcome = if *yes {
                form.deactivate(&|_: &str| true).await?
            } else {
                form.deactivate(&prompt).await?
            };
            show_notice(form);

            match outcome {
                Outcome::Deactivated(navigation) => {
                    navigate(form, navigation);
                    Ok(ExitCode::Ok)
                }
                Outcome::Cancelled => {
                    println!("Cancelled");
                    Ok(ExitCode::Ok)
                }
                _ => Ok(ExitCode::Unavailable),
            }
        }
    }
}

/// Load the draft. A failed fetch is not fatal: the cached profile is shown with a warning.
async fn load(form: &mut ProfileFormController) -> Result<()> {
    match form.load().await? {
        Outcome::NoSession => Err(Error::NotSignedIn),
        Outcome::LoadFailed(err) => {
            warn!(error = %err, "Showing cached profile");
            show_notice(form);
            Ok(())
        }
        _ => Ok(()),
    }
}

fn show_notice(form: &mut ProfileFormController) {
    if let Some(notice) = form.dismiss_notice() {
        render::notice(&notice);
    }
}

fn navigate(form: &ProfileFormController, navigation: Navigation) {
    match navigation {
        Navigation::ProfileView => render::draft(form.draft(), form.errors()),
        Navigation::SignedOut => println!(
            "Signed out. Run {} to sign in again.",
            "userdeck session login <id>".bold()
        ),
    }
}

/// Ask on the terminal; anything but an explicit yes is a no
fn prompt(question: &str) -> bool {
    print!("{question} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }

    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
