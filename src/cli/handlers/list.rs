use super::common::{HandlerContext, ticket_line};
use crate::cli::output::OutputFormatter;
use crate::core::FilterCriteria;
use crate::error::Result;

/// Handle the list command
pub async fn handle_list(
    ctx: &HandlerContext,
    filters: FilterCriteria,
    output: &OutputFormatter,
) -> Result<()> {
    let desk = ctx.desk();
    desk.tickets.set_filters(filters).await?;
    let view = desk.tickets.view();

    if output.is_json() {
        return output.print_json(&serde_json::json!({
            "tickets": view.tickets,
            "count": view.tickets.len(),
        }));
    }

    if view.tickets.is_empty() {
        output.info("No tickets found");
        return Ok(());
    }

    output.info(&format!("Tickets ({}):", view.tickets.len()));
    for ticket in &view.tickets {
        output.info(&ticket_line(ticket));
    }
    Ok(())
}
