mod commands;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;

#[derive(Parser)]
#[command(name = "hyttebok")]
#[command(about = "Manage the family's shared cabin reservation calendar")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up your profile on this machine
    Init {
        /// Your display name
        #[arg(short, long)]
        name: Option<String>,

        /// Calendar color for your bookings (e.g. "#f59e0b")
        #[arg(short, long)]
        color: Option<String>,
    },
    /// List every booking
    List,
    /// Book the cabin
    New {
        /// Who is staying
        #[arg(short, long)]
        name: Option<String>,

        /// First day (YYYY-MM-DD, or e.g. "next friday")
        #[arg(short, long)]
        from: Option<String>,

        /// Last day, inclusive (YYYY-MM-DD)
        #[arg(short, long)]
        to: Option<String>,

        /// Number of guests
        #[arg(short, long)]
        guests: Option<u32>,
    },
    /// Cancel a booking by id
    Remove {
        id: i64,

        /// Cancel even if the booking belongs to someone else
        #[arg(long)]
        force: bool,
    },
    /// Show a month of bookings
    Calendar {
        /// Month to show (YYYY-MM), defaults to the current month
        month: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Top-level boundary: every failure becomes a notice, never a crash
    if let Err(err) = run(cli) {
        eprintln!("{}", format!("Error: {err:#}").red());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { name, color } => commands::init::run(name, color),
        Commands::List => commands::list::run(),
        Commands::New {
            name,
            from,
            to,
            guests,
        } => commands::new::run(name, from, to, guests),
        Commands::Remove { id, force } => commands::remove::run(id, force),
        Commands::Calendar { month } => commands::calendar::run(month.as_deref()),
    }
}
