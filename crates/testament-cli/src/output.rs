//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use serde_json::json;
use testament_domain::{Address, RecordedEvent, Role, Testament, TestamentEvent, TestamentId};
use testament_router::handlers::{EventView, TestamentView};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a single testament.
    pub fn format_testament(&self, testament: &Testament) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let view = TestamentView::from(testament.clone());
                Ok(serde_json::to_string_pretty(&view)?)
            }
            OutputFormat::Table => Ok(self.format_testament_table(testament)),
        }
    }

    fn format_testament_table(&self, t: &Testament) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        builder.push_record(["ID".to_string(), t.id.to_string()]);
        builder.push_record(["Lifecycle".to_string(), self.lifecycle(t)]);
        builder.push_record(["Owner".to_string(), t.owner.to_string()]);
        builder.push_record(["Heir".to_string(), t.heir.to_string()]);
        builder.push_record(["Notary".to_string(), t.notary.to_string()]);
        builder.push_record(["Document".to_string(), t.document_hash.clone()]);
        builder.push_record(["Created".to_string(), t.created_at.to_string()]);
        builder.push_record(["Unlock time".to_string(), t.unlock_time.to_string()]);
        builder.push_record(["Death confirmed".to_string(), optional_time(t.death_confirmed_at)]);
        builder.push_record(["Unlocked".to_string(), optional_time(t.unlocked_at)]);

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format a list of testament ids.
    pub fn format_ids(&self, ids: &[TestamentId]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
                Ok(serde_json::to_string_pretty(&ids)?)
            }
            OutputFormat::Table => {
                if ids.is_empty() {
                    return Ok(self.colorize("No testaments found.", "yellow"));
                }
                let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
                Ok(ids.join("\n"))
            }
        }
    }

    /// Format an event log.
    pub fn format_events(&self, events: &[RecordedEvent]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let views: Vec<EventView> = events.iter().cloned().map(EventView::from).collect();
                Ok(serde_json::to_string_pretty(&views)?)
            }
            OutputFormat::Table => {
                if events.is_empty() {
                    return Ok(self.colorize("No events found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Seq", "Recorded", "Event", "Details"]);
                for recorded in events {
                    builder.push_record([
                        recorded.sequence.to_string(),
                        recorded.recorded_at.to_string(),
                        recorded.event.name().to_string(),
                        describe(&recorded.event),
                    ]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
            }
        }
    }

    /// Format the roles an address holds.
    pub fn format_roles(&self, address: &Address, roles: &[Role]) -> Result<String> {
        let names: Vec<&str> = roles.iter().map(Role::as_str).collect();
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "address": address.to_string(),
                "roles": names,
            }))?),
            OutputFormat::Table if names.is_empty() => {
                Ok(self.info(&format!("{} holds no role", address)))
            }
            OutputFormat::Table => Ok(format!("{}: {}", address, names.join(", "))),
        }
    }

    /// Format a newly created testament.
    pub fn format_created(&self, id: &TestamentId, unlock_time: u64) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "id": id.to_string(),
                "unlock_time": unlock_time,
            }))?),
            OutputFormat::Table => Ok(self.success(&format!(
                "Testament created: {} (unlocks at {})",
                id, unlock_time
            ))),
        }
    }

    /// Format the document hash released by an unlock.
    pub fn format_document(&self, document_hash: &str) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "document_hash": document_hash,
            }))?),
            OutputFormat::Table => Ok(self.success(&format!("Document hash: {}", document_hash))),
        }
    }

    /// Format an issued token.
    pub fn format_token(&self, address: &Address, token: &str) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "address": address.to_string(),
                "token": token,
            }))?),
            OutputFormat::Table => Ok(token.to_string()),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    fn lifecycle(&self, t: &Testament) -> String {
        let stage = t.lifecycle().as_str();
        if t.is_unlocked() {
            self.colorize(stage, "magenta")
        } else if t.is_deceased {
            self.colorize(stage, "yellow")
        } else {
            self.colorize(stage, "cyan")
        }
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

fn optional_time(time: Option<u64>) -> String {
    time.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string())
}

/// One-line summary of an event's fields.
fn describe(event: &TestamentEvent) -> String {
    match event {
        TestamentEvent::TestamentCreated {
            owner,
            heir,
            notary,
            unlock_time,
        } => format!(
            "owner {}, heir {}, notary {}, unlocks at {}",
            owner, heir, notary, unlock_time
        ),
        TestamentEvent::DeathConfirmed { notary } => format!("notary {}", notary),
        TestamentEvent::TestamentUnlocked {
            heir,
            document_hash,
        } => format!("heir {} received {}", heir, document_hash),
        TestamentEvent::HeirUpdated { previous, new }
        | TestamentEvent::NotaryUpdated { previous, new } => format!("{} -> {}", previous, new),
    }
}
