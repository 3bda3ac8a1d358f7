//! Structured pipeline events and the sinks that receive them.
//!
//! The pipeline never decides on its own whether to report progress; the
//! caller passes a [`TraceSink`] and every stage reports what it did through
//! it. [`TracingSink`] forwards events to the `tracing` ecosystem,
//! [`RecordingSink`] keeps them in memory.

use std::cell::RefCell;

use crate::config::ColumnPolicy;
use crate::error::TableKind;
use crate::pipeline::Preset;

#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    Started { preset: Preset },
    Validated { table: TableKind, rows: usize, columns: usize },
    Normalized { table: TableKind, rows: usize, dropped: usize },
    HeaderLocated { table: TableKind, row: usize },
    FunctionColumns { policy: ColumnPolicy, labels: Vec<String> },
    NumericRoles { quantity: String, total: String, candidates: usize },
    RowsFiltered { table: TableKind, kept: usize, dropped: usize },
    LeavesIndexed { leaves: usize, subsections: usize, tags: usize, orphans: usize },
    Joined { rows: usize, matched: usize, unmatched: usize, duplicate_keys: usize },
    Exploded { input: usize, output: usize },
}

pub trait TraceSink {
    fn record(&self, event: &TraceEvent);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn record(&self, _event: &TraceEvent) {}
}

/// Emits each event as a `tracing` event with structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn record(&self, event: &TraceEvent) {
        match event {
            TraceEvent::Started { preset } => {
                tracing::debug!(%preset, "pipeline start");
            }
            TraceEvent::Validated { table, rows, columns } => {
                tracing::debug!(table = %table, rows, columns, "input validated");
            }
            TraceEvent::Normalized { table, rows, dropped } => {
                tracing::debug!(table = %table, rows, dropped, "blank rows removed");
            }
            TraceEvent::HeaderLocated { table, row } => {
                tracing::debug!(table = %table, row, "header row located");
            }
            TraceEvent::FunctionColumns { policy, labels } => {
                tracing::info!(policy = %policy, count = labels.len(), ?labels, "function columns classified");
            }
            TraceEvent::NumericRoles { quantity, total, candidates } => {
                tracing::debug!(%quantity, %total, candidates, "numeric roles selected");
            }
            TraceEvent::RowsFiltered { table, kept, dropped } => {
                tracing::debug!(table = %table, kept, dropped, "rows filtered");
            }
            TraceEvent::LeavesIndexed { leaves, subsections, tags, orphans } => {
                if *orphans > 0 {
                    tracing::warn!(orphans, "leaf items without a subsection or tag ancestor");
                }
                tracing::debug!(leaves, subsections, tags, "hierarchy indexed");
            }
            TraceEvent::Joined { rows, matched, unmatched, duplicate_keys } => {
                if *duplicate_keys > 0 {
                    tracing::warn!(duplicate_keys, "duplicate FAC descriptions ignored, first row kept");
                }
                tracing::info!(rows, matched, unmatched, "FAC joined onto EAP leaves");
            }
            TraceEvent::Exploded { input, output } => {
                tracing::debug!(input, output, "multi-tag rows exploded");
            }
        }
    }
}

/// Collects events in order; handy for tests and for hosts that want to show
/// a run log after the fact.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: RefCell<Vec<TraceEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.borrow().clone()
    }
}

impl TraceSink for RecordingSink {
    fn record(&self, event: &TraceEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
