//! Events command implementation.

use super::parse_id;
use crate::cli::EventsArgs;
use crate::error::Result;
use crate::output::Formatter;
use crate::LocalRegistry;
use testament_domain::{Clock, RecordedEvent};

/// Execute the events command.
pub fn execute_events<C: Clock>(
    args: EventsArgs,
    registry: &LocalRegistry<C>,
    formatter: &Formatter,
) -> Result<String> {
    let events: Vec<RecordedEvent> = registry
        .events_after(parse_id(&args.id)?, args.after)?
        .collect();
    formatter.format_events(&events)
}
