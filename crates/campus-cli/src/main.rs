mod app;
mod render;
mod shutdown;

use anyhow::Result;
use campus_config::ConfigLoader;
use campus_types::TimeRange;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use app::App;

#[derive(Parser, Debug)]
#[command(author, version, about = "Campus energy monitoring client")]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the access token
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "CAMPUS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Remove the stored access token
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Check whether an app path can be opened with the stored session
    Open {
        /// e.g. /app/reports
        path: String,
    },
    /// Poll a view and log every update until Ctrl-C
    Watch {
        #[command(subcommand)]
        view: WatchView,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum WatchView {
    Dashboard,
    Monitoring {
        /// 6H, 24H or 7D
        #[arg(long, default_value = "24H")]
        range: TimeRange,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ConfigLoader::new(&args.config).load()?;
    campus_logging::init(&config.logging)?;
    info!(
        config = %args.config.display(),
        base_url = %config.api.base_url,
        "Starting campus-energy"
    );

    let app = App::build(config)?;

    match args.command {
        Command::Login { email, password } => app.login(&email, &password).await,
        Command::Logout => app.logout().await,
        Command::Whoami => app.whoami().await,
        Command::Open { path } => app.open(&path).await,
        Command::Watch { view: WatchView::Dashboard } => app.watch_dashboard().await,
        Command::Watch {
            view: WatchView::Monitoring { range },
        } => app.watch_monitoring(range).await,
    }
}
