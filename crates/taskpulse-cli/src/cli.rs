//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use taskpulse_core::models::DEFAULT_UPTIME_HOURS;
use taskpulse_core::navigation::Route;

#[derive(Debug, Parser)]
#[command(
    name = "taskpulse",
    version,
    about = "Task boards and uptime monitors from the terminal"
)]
pub struct Cli {
    /// API server address (overrides config and TASKPULSE_SERVER_URL)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Keep the session in memory only for this invocation
    #[arg(long, global = true)]
    pub no_persist: bool,

    /// Write logs to a daily rolling file in this directory instead of stderr
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session
    Login(LoginArgs),
    /// Create an account
    Register(LoginArgs),
    /// Forget the stored session
    Logout,
    /// Show who is logged in
    Whoami,
    /// Task boards
    #[command(subcommand)]
    Boards(BoardsCommand),
    /// Board columns
    #[command(subcommand)]
    Lists(ListsCommand),
    /// Cards on a board
    #[command(subcommand)]
    Cards(CardsCommand),
    /// Uptime monitors
    #[command(subcommand)]
    Monitors(MonitorsCommand),
    /// Aggregate monitoring metrics
    Dashboard,
    /// Public status page
    Status,
}

impl Command {
    /// View this command renders, `None` for session housekeeping
    pub fn route(&self) -> Option<Route> {
        match self {
            Command::Login(_) | Command::Register(_) => Some(Route::Login),
            Command::Logout | Command::Whoami => None,
            Command::Boards(_) | Command::Lists(_) | Command::Cards(_) => Some(Route::Tasks),
            Command::Monitors(_) => Some(Route::Monitoring),
            Command::Dashboard => Some(Route::Dashboard),
            Command::Status => Some(Route::Status),
        }
    }
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: Option<String>,

    /// Read the password from the first line of stdin
    #[arg(long)]
    pub password_stdin: bool,
}

#[derive(Debug, Subcommand)]
pub enum BoardsCommand {
    List,
    Show {
        id: String,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ListsCommand {
    Create {
        board_id: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 0)]
        position: i32,
    },
}

#[derive(Debug, Subcommand)]
pub enum CardsCommand {
    Create {
        list_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    Move {
        card_id: String,
        /// Destination list
        #[arg(long = "list")]
        list_id: String,
        #[arg(long)]
        position: i32,
    },
}

#[derive(Debug, Subcommand)]
pub enum MonitorsCommand {
    List,
    Show {
        id: String,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
        /// Check interval in seconds
        #[arg(long)]
        interval: Option<u32>,
    },
    Uptime {
        id: String,
        #[arg(long, default_value_t = DEFAULT_UPTIME_HOURS)]
        hours: u32,
    },
    /// Run a check now
    Check {
        id: String,
    },
}
