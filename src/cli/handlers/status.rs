use super::common::HandlerContext;
use crate::cli::output::{OutputFormatter, status_label};
use crate::core::{Status, TicketId};
use crate::error::Result;

/// Handle the status command
///
/// The ticket is loaded on its own, so it need not be on the first page of
/// the list. The change is applied to the collection first and rolled back
/// if the service rejects it.
pub async fn handle_status(
    ctx: &HandlerContext,
    id: TicketId,
    status: Status,
    output: &OutputFormatter,
) -> Result<()> {
    let desk = ctx.desk();
    let previous = desk.tickets.ensure_loaded(id).await?.status;

    match desk.tickets.update_status(id, status).await {
        Ok(ticket) => {
            if output.is_json() {
                return output.print_json(&serde_json::json!({
                    "status": "success",
                    "ticket": ticket,
                    "previous_status": previous,
                }));
            }
            output.success(&format!(
                "Ticket #{id}: {} -> {}",
                status_label(previous),
                status_label(ticket.status)
            ));
            Ok(())
        },
        Err(e) => {
            if let Some(restored) = desk.tickets.view().ticket(id).map(|t| t.status) {
                output.warning(&format!(
                    "Status change rolled back; ticket #{id} is still {}",
                    status_label(restored)
                ));
            }
            Err(e)
        },
    }
}
