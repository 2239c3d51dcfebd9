use super::common::HandlerContext;
use crate::api::Classifier;
use crate::cli::output::{OutputFormatter, priority_label};
use crate::error::{Result, TicketDeskError};

/// Handle the classify command
pub async fn handle_classify(
    ctx: &HandlerContext,
    description: &str,
    output: &OutputFormatter,
) -> Result<()> {
    if description.trim().is_empty() {
        return Err(TicketDeskError::InvalidInput(
            "Description must not be empty".to_string(),
        ));
    }

    let spinner = output.spinner("Classifying...");
    let result = ctx.store.classify(description).await;
    spinner.finish_and_clear();
    let suggestion = result?;

    if output.is_json() {
        return output.print_json(&suggestion);
    }
    output.info(&format!("Category: {}", suggestion.category.label()));
    output.info(&format!("Priority: {}", priority_label(suggestion.priority)));
    Ok(())
}
