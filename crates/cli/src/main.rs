//! Village Water System CLI.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (prompts for the password on stdin when --password is omitted)
//! vws login jdoe
//!
//! # Who am I, and what may I do?
//! vws whoami
//!
//! # Generate bills for March 2025
//! vws bills generate 2025-03
//!
//! # Would /billing render right now?
//! vws open /billing
//! ```
//!
//! # Environment Variables
//!
//! - `VWS_API_BASE_URL` - Backend base URL (default: `http://localhost:8000/api`)
//! - `VWS_SESSION_FILE` - Where the session is stored
//! - `SENTRY_DSN` - Report errors to Sentry when set
//! - `RUST_LOG` - Log filter (default: `village_water_client=info,village_water_cli=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use village_water_core::PaymentMethod;

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "vws")]
#[command(author, version, about = "Village Water System command-line client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        /// Username
        username: String,

        /// Password (read from stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account and sign in
    Register(commands::auth::RegisterArgs),
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user and their capabilities
    Whoami {
        /// Fetch the profile from the backend instead of the stored copy
        #[arg(long)]
        refresh: bool,
    },
    /// Change the signed-in user's password (old and new read from stdin)
    Passwd,
    /// Households
    Households {
        #[command(subcommand)]
        action: HouseholdAction,
    },
    /// Bills
    Bills {
        #[command(subcommand)]
        action: BillAction,
    },
    /// Payments
    Payments {
        #[command(subcommand)]
        action: PaymentAction,
    },
    /// In-app notifications
    Notifications {
        #[command(subcommand)]
        action: NotificationAction,
    },
    /// SMS delivery log (staff only)
    Sms,
    /// Dashboard statistics
    Dashboard,
    /// Check whether a page would render for the current session
    Open {
        /// Page path, e.g. `/billing`
        path: String,
    },
}

#[derive(Subcommand)]
enum HouseholdAction {
    /// List households
    List {
        /// Search by name, code or national ID
        #[arg(short, long)]
        search: Option<String>,
    },
}

#[derive(Subcommand)]
enum BillAction {
    /// List bills
    List {
        /// Only bills with this status (`Pending`, `Paid`, `Overdue`, `Cancelled`)
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Generate bills for a billing period
    Generate {
        /// Billing period (`YYYY-MM`); defaults to the current month
        period: Option<String>,

        /// Only this household
        #[arg(long)]
        household: Option<i32>,
    },
}

#[derive(Subcommand)]
enum PaymentAction {
    /// List payments
    List {
        /// Only payments made this way (`cash`, `mobile-money`, `bank-transfer`)
        #[arg(short, long)]
        method: Option<PaymentMethod>,
    },
}

#[derive(Subcommand)]
enum NotificationAction {
    /// List notifications
    List,
    /// Show the number of unread notifications
    Unread,
    /// Mark every notification as read
    ReadAll,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok().filter(|dsn| !dsn.is_empty())?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: std::env::var("SENTRY_ENVIRONMENT")
                .ok()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "village_water_client=info,village_water_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();

    let _sentry_guard = init_sentry();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let ctx = commands::Context::from_env()?;

    match cli.command {
        Commands::Login { username, password } => {
            commands::auth::login(&ctx, &username, password).await?;
        }
        Commands::Register(args) => commands::auth::register(&ctx, args).await?,
        Commands::Logout => commands::auth::logout(&ctx).await,
        Commands::Whoami { refresh } => commands::auth::whoami(&ctx, refresh).await?,
        Commands::Passwd => commands::auth::change_password(&ctx).await?,
        Commands::Households { action } => match action {
            HouseholdAction::List { search } => {
                commands::resources::list_households(&ctx, search).await?;
            }
        },
        Commands::Bills { action } => match action {
            BillAction::List { status } => commands::resources::list_bills(&ctx, status).await?,
            BillAction::Generate { period, household } => {
                commands::resources::generate_bills(&ctx, period, household).await?;
            }
        },
        Commands::Payments { action } => match action {
            PaymentAction::List { method } => {
                commands::resources::list_payments(&ctx, method).await?;
            }
        },
        Commands::Notifications { action } => match action {
            NotificationAction::List => commands::resources::list_notifications(&ctx).await?,
            NotificationAction::Unread => commands::resources::unread_notifications(&ctx).await?,
            NotificationAction::ReadAll => commands::resources::read_all_notifications(&ctx).await?,
        },
        Commands::Sms => commands::resources::list_sms(&ctx).await?,
        Commands::Dashboard => commands::resources::dashboard(&ctx).await?,
        Commands::Open { path } => commands::open::open(&ctx, &path).await,
    }
    Ok(())
}
