use clap::Subcommand;
use colored::Colorize;
use sysexits::ExitCode;
use userdeck_lib::{IdentityProvider, Result, SessionStore, SessionUser, UserRecord};

use crate::render;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Record who is signed in, with the profile cached at sign-in
    Login {
        id: String,
        /// Session cookie sent with every directory request
        #[arg(long)]
        cookie: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// ISO timestamp or date
        #[arg(long)]
        birthday: Option<String>,
        #[arg(long)]
        about: Option<String>,
        #[arg(long)]
        picture: Option<String>,
    },
    /// Show the signed-in user
    Show,
    /// End the session
    Logout,
}

pub fn handle(store: &SessionStore, cmd: &Command) -> Result<ExitCode> {
    match cmd {
        Command::Login {
            id,
            cookie,
            name,
            email,
            birthday,
            about,
            picture,
        } => {
            let mut user = SessionUser::new(id.as_str()).with_profile(UserRecord {
                name: name.clone(),
                email: email.clone(),
                birthday: birthday.clone(),
                about: about.clone(),
                picture: picture.clone(),
            });
            if let Some(cookie) = cookie {
                user = user.with_cookie(cookie);
            }

            store.login(user)?;
            println!("Signed in as {}", id.bold());
        }
        Command::Show => match store.current_user() {
            Some(user) => {
                println!("{} {}", "User:".bold(), user.id);
                println!("{} {}", "Session file:".bold(), store.path().display());
                render::record(&user.profile);
            }
            None => {
                eprintln!("Not signed in");
                return Ok(ExitCode::NoPerm);
            }
        },
        Command::Logout => {
            store.logout()?;
            println!("Signed out");
        }
    }

    Ok(ExitCode::Ok)
}
