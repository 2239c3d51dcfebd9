use super::common::HandlerContext;
use crate::cli::output::OutputFormatter;
use crate::core::{Category, Priority, StatsSnapshot};
use crate::error::{Result, TicketDeskError};
use crate::sync::{PollOutcome, StatsView};

/// Handle the stats command
///
/// Without `watch` a single fetch is made. With it the poller runs until
/// Ctrl-C and is stopped before returning.
pub async fn handle_stats(ctx: &HandlerContext, watch: bool, output: &OutputFormatter) -> Result<()> {
    let desk = ctx.desk();

    if !watch {
        let outcome = desk.stats.refresh_now().await;
        let view = desk.stats.view();
        return match (outcome, view.snapshot) {
            (PollOutcome::Refreshed, Some(snapshot)) => render(&snapshot, output),
            _ => Err(TicketDeskError::custom(
                view.error
                    .unwrap_or_else(|| "Statistics unavailable".to_string()),
            )),
        };
    }

    let mut updates = desk.stats.subscribe();
    desk.stats.start();
    output.info("Watching statistics (Ctrl-C to stop)");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = updates.borrow_and_update().clone();
                render_view(&view, output)?;
            },
        }
    }
    desk.stats.stop();
    Ok(())
}

fn render_view(view: &StatsView, output: &OutputFormatter) -> Result<()> {
    if view.loading {
        return Ok(());
    }
    if let Some(error) = &view.error {
        output.warning(error);
    }
    match &view.snapshot {
        Some(snapshot) => render(snapshot, output),
        None => Ok(()),
    }
}

fn render(snapshot: &StatsSnapshot, output: &OutputFormatter) -> Result<()> {
    if output.is_json() {
        return output.print_json(snapshot);
    }

    output.info(&format!(
        "Total: {}  Open: {} ({:.0}%)  Avg/day: {:.1}",
        snapshot.total_tickets,
        snapshot.open_tickets,
        snapshot.open_ratio() * 100.0,
        snapshot.avg_tickets_per_day
    ));
    let priorities: Vec<String> = Priority::ALL
        .iter()
        .map(|p| format!("{}: {}", p.label(), snapshot.priority_count(*p)))
        .collect();
    output.info(&format!("  By priority: {}", priorities.join(", ")));
    let categories: Vec<String> = Category::ALL
        .iter()
        .map(|c| format!("{}: {}", c.label(), snapshot.category_count(*c)))
        .collect();
    output.info(&format!("  By category: {}", categories.join(", ")));
    Ok(())
}
