#![warn(missing_docs)]
//! Test surfaces for inventory code: event recording, JSONL event logs,
//! item fixtures and scratch directories.

mod fixtures;
mod recorder;

use anyhow::Result;
use satchel_core::ItemStack;
use satchel_inventory::InventoryEvent;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

pub use fixtures::*;
pub use recorder::*;

/// One line of a JSONL event log.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a> {
    /// Position of the event in the recording.
    pub step: u64,
    /// Event label (`InventoryEvent::kind`).
    pub kind: &'a str,
    /// Slot index for slot updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// New slot content for slot updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<&'a ItemStack>,
}

impl<'a> EventRecord<'a> {
    /// Build the record for `event` at position `step`.
    pub fn from_event(step: u64, event: &'a InventoryEvent) -> Self {
        let (index, item) = match event {
            InventoryEvent::ItemUpdated { index, item } => (Some(*index), item.as_ref()),
            _ => (None, None),
        };
        Self {
            step,
            kind: event.kind(),
            index,
            item,
        }
    }
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    file: File,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Self { file })
    }

    /// Append an event to the log.
    pub fn write(&mut self, event: &EventRecord<'_>) -> Result<()> {
        let line = serde_json::to_string(event)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        Ok(())
    }

    /// Append every event in order, numbering them from zero.
    pub fn write_all(&mut self, events: &[InventoryEvent]) -> Result<()> {
        for (step, event) in events.iter().enumerate() {
            self.write(&EventRecord::from_event(step as u64, event))?;
        }
        Ok(())
    }
}
