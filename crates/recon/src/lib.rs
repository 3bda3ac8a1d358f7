//! `faceap-recon`: FAC/EAP reconciliation core.
//!
//! Pure engine crate: receives tables already read from the RD workbook,
//! returns the processed FAC, the processed EAP and the consolidated table.
//! No file I/O and no CLI dependencies.

pub mod coerce;
pub mod config;
pub mod eap;
pub mod error;
pub mod explode;
pub mod fac;
pub mod hierarchy;
pub mod join;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod schema;
pub mod trace;
pub mod validate;

pub use config::{ColumnPolicy, ReconConfig};
pub use error::{InvalidInput, ReconError, TableKind};
pub use model::{Cell, Consolidation, Table};
pub use pipeline::{Pipeline, PipelineInput, PipelineOutput, Preset};
pub use trace::{NullSink, RecordingSink, TraceEvent, TraceSink, TracingSink};
