use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use sysexits::ExitCode;
use tracing::{Level, debug};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use userdeck_lib::{
    Error, HttpUserDirectory, IdentityProvider, ProfileFormController, SessionStore,
    config::CoreConfig,
};

mod profile;
mod render;
mod session;

#[derive(Parser, Debug)]
#[command(name = "userdeck")]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Override the configured user directory URL
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Manage the local session
    #[command(subcommand)]
    Session(session::Command),
    /// View and edit your profile
    #[command(subcommand)]
    Profile(profile::Command),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Human friendly panicking in release mode
    human_panic::setup_panic!();

    // Logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set up logging: {err}");
    }

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            exit_code(&err)
        }
    }
}

async fn run(cli: Cli) -> userdeck_lib::Result<ExitCode> {
    let cfg = CoreConfig::load()?.into_handle();
    if let Some(url) = cli.api_url {
        debug!(%url, "Overriding API URL");
        cfg.write().api.base_url = url;
    }

    let store = Arc::new(SessionStore::open()?);

    match &cli.command {
        Command::Session(cmd) => session::handle(&store, cmd),
        Command::Profile(cmd) => {
            let api = cfg.read().api.clone();
            let cookie = store.current_user().and_then(|user| user.cookie);
            let directory = Arc::new(HttpUserDirectory::new(&api, cookie)?);
            let mut form = ProfileFormController::new(directory, store, api.request_timeout());

            profile::handle(&mut form, cmd).await
        }
    }
}

fn exit_code(err: &Error) -> ExitCode {
    match err {
        Error::NotSignedIn => ExitCode::NoPerm,
        Error::ReadOnlyField(_) => ExitCode::Usage,
        Error::InvalidBaseUrl { .. } | Error::TomlDe(_) => ExitCode::Config,
        Error::Directory(_) => ExitCode::Unavailable,
        Error::Session(_) | Error::MissingDir(_) | Error::Io(_) => ExitCode::IoErr,
        Error::TomlSer(_) => ExitCode::Software,
    }
}
