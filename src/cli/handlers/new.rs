//! Drafting handler for the new command
//!
//! Runs the same draft pipeline an interactive form would: field edits feed
//! the debounced classifier, explicit flags override its suggestion, and the
//! draft is submitted once classification has settled.

use super::common::HandlerContext;
use crate::cli::output::{OutputFormatter, priority_label};
use crate::core::{Category, DraftField, Priority};
use crate::error::Result;
use crate::integration::TicketDesk;
use dialoguer::{Input, theme::ColorfulTheme};
use std::time::Duration;

/// Parameters for creating a ticket
#[derive(Debug, Default)]
pub struct NewTicketParams {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub no_ai: bool,
}

/// Handle the new command
pub async fn handle_new(
    ctx: &HandlerContext,
    params: NewTicketParams,
    output: &OutputFormatter,
) -> Result<()> {
    let desk = ctx.desk();
    let theme = ColorfulTheme::default();

    let title = match params.title {
        Some(title) => title,
        None => Input::<String>::with_theme(&theme)
            .with_prompt("Title")
            .interact_text()?,
    };
    desk.draft.update_field(DraftField::Title(title));

    let description = match params.description {
        Some(description) => description,
        None => Input::<String>::with_theme(&theme)
            .with_prompt("Description")
            .interact_text()?,
    };
    desk.draft.update_field(DraftField::Description(description));

    if params.no_ai {
        desk.draft.debouncer().cancel();
    } else {
        await_suggestion(ctx, &desk, output).await;
    }

    if let Some(category) = params.category {
        desk.draft.update_field(DraftField::Category(category));
    }
    if let Some(priority) = params.priority {
        desk.draft.update_field(DraftField::Priority(priority));
    }

    let spinner = output.spinner("Submitting ticket...");
    let result = desk.draft.submit().await;
    spinner.finish_and_clear();
    let ticket = result?;

    if output.is_json() {
        return output.print_json(&serde_json::json!({
            "status": "success",
            "ticket": ticket,
        }));
    }
    if let Some(message) = desk.draft.submit_state().message {
        output.success(message.text());
    }
    output.info(&format!(
        "#{} {} [{} / {}]",
        ticket.id,
        ticket.title,
        ticket.category.label(),
        priority_label(ticket.priority)
    ));
    Ok(())
}

/// Wait for the debouncer to go idle, bounded by the debounce delay plus the
/// request timeout
async fn await_suggestion(ctx: &HandlerContext, desk: &TicketDesk, output: &OutputFormatter) {
    let limit = ctx.config.classification.debounce()
        + ctx.config.api.timeout()
        + Duration::from_millis(100);
    let spinner = output.spinner("Analysing description...");
    let settled = tokio::time::timeout(limit, desk.draft.debouncer().wait_until_idle()).await;
    spinner.finish_and_clear();

    if settled.is_err() {
        tracing::warn!("Classification did not finish in time; using current values");
        return;
    }
    let draft = desk.draft.draft();
    if draft.ai_suggested {
        output.info(&format!(
            "Suggested: {} / {}",
            draft.category.label(),
            priority_label(draft.priority)
        ));
    }
}
