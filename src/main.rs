//! ticketdesk - Support ticket desk with AI-assisted triage
//!
//! This is the main entry point for the ticketdesk CLI application.
//! It handles command-line argument parsing and dispatches to the appropriate
//! command handlers.

use clap::Parser;
use std::process;
use ticketdesk::cli::handlers::{
    HandlerContext, NewTicketParams, handle_classify, handle_list, handle_new, handle_show,
    handle_stats, handle_status,
};
use ticketdesk::cli::{Cli, Commands, OutputFormatter};
use ticketdesk::error::{Result, TicketDeskError};
use tracing_subscriber::EnvFilter;

/// Main entry point for the ticketdesk CLI
///
/// The desk's components assume one cooperative scheduler, so the runtime is
/// single-threaded.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let formatter = OutputFormatter::new(cli.json, cli.no_color);

    if let Err(e) = run(cli, &formatter).await {
        handle_error(&e, &formatter);
        process::exit(1);
    }
}

/// `--verbose` forces debug output; otherwise `RUST_LOG` applies, defaulting
/// to warnings only
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI application with the parsed arguments
async fn run(cli: Cli, formatter: &OutputFormatter) -> Result<()> {
    let ctx = HandlerContext::new(cli.config.as_deref(), cli.api_url.as_deref())?;
    dispatch_command(cli.command, &ctx, formatter).await
}

async fn dispatch_command(
    command: Commands,
    ctx: &HandlerContext,
    formatter: &OutputFormatter,
) -> Result<()> {
    let filters = command.filter_criteria();
    match command {
        Commands::List { .. } => handle_list(ctx, filters, formatter).await,
        Commands::Show { id } => handle_show(ctx, id, formatter).await,
        Commands::New {
            title,
            description,
            category,
            priority,
            no_ai,
        } => {
            let params = NewTicketParams {
                title,
                description,
                category,
                priority,
                no_ai,
            };
            handle_new(ctx, params, formatter).await
        },
        Commands::Status { id, status } => handle_status(ctx, id, status, formatter).await,
        Commands::Stats { watch } => handle_stats(ctx, watch, formatter).await,
        Commands::Classify { description } => handle_classify(ctx, &description, formatter).await,
    }
}

/// Handle errors with user-friendly messages and suggestions
fn handle_error(error: &TicketDeskError, formatter: &OutputFormatter) {
    formatter.error(&error.user_message());

    let suggestions = error.suggestions();
    if !suggestions.is_empty() {
        eprintln!("\nSuggestions:");
        for suggestion in &suggestions {
            eprintln!("  • {suggestion}");
        }
    }

    // In JSON mode, output error as JSON
    if formatter.is_json() {
        let _ = formatter.print_json(&serde_json::json!({
            "status": "error",
            "error": error.to_string(),
            "error_type": format!("{:?}", error),
            "suggestions": suggestions,
            "recoverable": error.is_recoverable(),
            "is_config_error": error.is_config_error(),
        }));
    }

    // In verbose mode, show the full error chain
    if tracing::enabled!(tracing::Level::DEBUG) {
        eprintln!("\nDebug information:");
        eprintln!("{error:?}");
    }
}
