mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    mission::MissionSubcommand, notify::NotifySubcommand, profile::ProfileSubcommand,
    team::TeamSubcommand, OwnerArgs,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "mboard",
    about = "Mission board — track missions, earn points and badges, run teams",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .board/ or .git/)
    #[arg(long, global = true, env = "MBOARD_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a mission board in the current project
    Init {
        /// Mirror writes to a dev data server, e.g. http://localhost:4000
        #[arg(long)]
        remote: Option<String>,
        /// Default port for 'mboard serve'
        #[arg(long)]
        port: Option<u16>,
    },

    /// Manage missions
    Mission {
        #[command(subcommand)]
        subcommand: MissionSubcommand,
    },

    /// Manage profiles and the leaderboard
    Profile {
        #[command(subcommand)]
        subcommand: ProfileSubcommand,
    },

    /// Manage teams
    Team {
        #[command(subcommand)]
        subcommand: TeamSubcommand,
    },

    /// Manage notifications
    Notify {
        #[command(subcommand)]
        subcommand: NotifySubcommand,
    },

    /// Show a user's dashboard
    Dashboard {
        #[command(flatten)]
        owner: OwnerArgs,
    },

    /// Select the signed-in user
    Use { profile_id: String },

    /// Show the signed-in user
    Whoami,

    /// Pull the authoritative document from the remote
    Sync,

    /// Run the dev data server
    Serve {
        /// Port to listen on (default: from config)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);

    let result = match cli.command {
        Commands::Init { remote, port } => cmd::init::run(&root, remote.as_deref(), port),
        Commands::Mission { subcommand } => cmd::mission::run(&root, subcommand, cli.json),
        Commands::Profile { subcommand } => cmd::profile::run(&root, subcommand, cli.json),
        Commands::Team { subcommand } => cmd::team::run(&root, subcommand, cli.json),
        Commands::Notify { subcommand } => cmd::notify::run(&root, subcommand, cli.json),
        Commands::Dashboard { owner } => cmd::dashboard::run(&root, &owner, cli.json),
        Commands::Use { profile_id } => cmd::user::use_profile(&root, &profile_id),
        Commands::Whoami => cmd::user::whoami(&root, cli.json),
        Commands::Sync => cmd::sync::run(&root, cli.json),
        Commands::Serve { port } => cmd::serve::run(&root, port),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
