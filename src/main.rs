use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use productive_suite::config::{Backend, Config};
use productive_suite::services::ServiceRegistry;
use productive_suite::{api, mcp, Error};

#[derive(Parser)]
#[command(name = "psuite")]
#[command(about = "Reminders, Notes and Calendar for AI agents over MCP")]
struct Cli {
    /// Host backend (overrides PSUITE_BACKEND)
    #[arg(long, global = true, value_enum)]
    backend: Option<BackendArg>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Osascript,
    Memory,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Osascript => Backend::Osascript,
            BackendArg::Memory => Backend::Memory,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server via stdio (the default)
    Mcp,
    /// Start the HTTP API
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Check automation access to each application
    Check,
}

/// Initialize tracing with output to stderr (for MCP mode) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "productive_suite=info,tower_http=debug".into()),
    );

    if use_stderr {
        // stdout carries the protocol
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn describe(result: Result<usize, Error>, noun: &str) -> String {
    match result {
        Ok(count) => format!("ok ({} {})", count, noun),
        Err(Error::Permission(msg)) => format!("permission denied: {}", msg),
        Err(e) => format!("error: {}", e),
    }
}

async fn check(registry: &ServiceRegistry) -> bool {
    let reminders = registry
        .reminders()
        .list_reminders(None)
        .await
        .map(|r| r.len());
    let notes = registry.notes().list_folders().await.map(|f| f.len());
    let calendar = registry.calendar().list_calendars().await.map(|c| c.len());
    let all_ok = reminders.is_ok() && notes.is_ok() && calendar.is_ok();

    println!("Reminders: {}", describe(reminders, "reminders"));
    println!("Notes:     {}", describe(notes, "folders"));
    println!("Calendar:  {}", describe(calendar, "calendars"));
    all_ok
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let use_stderr = matches!(cli.command, None | Some(Commands::Mcp));
    init_tracing(use_stderr);

    let config = Config::from_env()?.with_backend(cli.backend.map(Backend::from));
    let registry = Arc::new(ServiceRegistry::new(config.build_bridge()));

    match cli.command {
        Some(Commands::Serve { port }) => {
            tracing::info!("Starting productive-suite API on port {}", port);

            let app = api::create_router(registry);

            let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
            tracing::info!("API listening on http://127.0.0.1:{}", port);

            axum::serve(listener, app).await?;
        }
        Some(Commands::Check) => {
            if !check(&registry).await {
                std::process::exit(1);
            }
        }
        Some(Commands::Mcp) | None => {
            mcp::run_stdio_server(registry).await?;
        }
    }

    Ok(())
}
