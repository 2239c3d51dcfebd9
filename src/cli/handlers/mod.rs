//! Command handlers
//!
//! Each handler builds what it needs from a [`HandlerContext`], performs one
//! command and renders the result.

mod classify;
mod common;
mod list;
mod new;
mod show;
mod stats;
mod status;

pub use classify::handle_classify;
pub use common::{HandlerContext, ticket_line};
pub use list::handle_list;
pub use new::{NewTicketParams, handle_new};
pub use show::handle_show;
pub use stats::handle_stats;
pub use status::handle_status;
