//! Slot booking - application entry point.
//!
//! Serves the booking pages with the booking and auth services embedded in
//! one process, and carries the database maintenance commands.

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use domain::Role;

/// Facility slot booking
#[derive(Parser)]
#[command(name = "slot-booking")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (overrides GATEWAY_HOST)
        #[arg(short = 'H', long)]
        host: Option<String>,
        /// Port to listen on (overrides GATEWAY_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Give an existing account a role, e.g. the first administrator
    GrantRole {
        /// Email the account was registered with
        #[arg(long)]
        email: String,
        /// USER or ADMIN
        #[arg(long, default_value = "ADMIN", value_parser = parse_role)]
        role: Role,
    },
}

#[derive(Subcommand, Clone, Copy)]
enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

impl From<MigrateAction> for booking_service_lib::MigrateAction {
    fn from(action: MigrateAction) -> Self {
        match action {
            MigrateAction::Up => booking_service_lib::MigrateAction::Up,
            MigrateAction::Down => booking_service_lib::MigrateAction::Down,
            MigrateAction::Status => booking_service_lib::MigrateAction::Status,
            MigrateAction::Fresh => booking_service_lib::MigrateAction::Fresh,
        }
    }
}

fn parse_role(raw: &str) -> Result<Role, String> {
    raw.parse::<Role>().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Serve { host, port } => {
            info!("Starting slot booking");
            gateway_lib::run_embedded(host, port).await
        }
        Commands::Migrate { action } => booking_service_lib::run_migrations(action.into()).await,
        Commands::GrantRole { email, role } => booking_service_lib::grant_role(&email, role)
            .await
            .map(|user| println!("{} now holds {}", user.email, role)),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing subscriber (verbose mode sets debug level)
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info,tower_http=debug".into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
