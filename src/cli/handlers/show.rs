use super::common::HandlerContext;
use crate::cli::output::{OutputFormatter, priority_label, status_label};
use crate::core::TicketId;
use crate::error::Result;

/// Handle the show command
pub async fn handle_show(ctx: &HandlerContext, id: TicketId, output: &OutputFormatter) -> Result<()> {
    let desk = ctx.desk();
    let ticket = desk.tickets.fetch_ticket(id).await?;

    if output.is_json() {
        return output.print_json(&ticket);
    }

    output.info(&format!("#{} {}", ticket.id, ticket.title));
    output.info(&format!("  Status:   {}", status_label(ticket.status)));
    output.info(&format!("  Priority: {}", priority_label(ticket.priority)));
    output.info(&format!("  Category: {}", ticket.category.label()));
    output.info(&format!(
        "  Created:  {}",
        ticket.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    if let Some(updated_at) = ticket.updated_at {
        output.info(&format!("  Updated:  {}", updated_at.format("%Y-%m-%d %H:%M UTC")));
    }
    output.info("");
    output.info(&ticket.description);
    Ok(())
}
