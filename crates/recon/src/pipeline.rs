use crate::config::{ReconConfig, TAG_RAW};
use crate::eap::{process_eap, EapOutcome};
use crate::error::ReconError;
use crate::explode::explode_tags;
use crate::fac::{process_fac, to_long, FacOutcome};
use crate::hierarchy::{index_leaves, HierarchyIndex};
use crate::join::{left_join, order_columns};
use crate::model::{Consolidation, Table};
use crate::trace::{TraceEvent, TraceSink, TracingSink};

/// Named pipeline variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// FAC descriptions with one column per discipline.
    FacOnly,
    /// FAC as `(description, function, value)` rows.
    FacLong,
    /// FAC joined onto the EAP leaves.
    Consolidation,
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FacOnly => write!(f, "fac-only"),
            Self::FacLong => write!(f, "fac-long"),
            Self::Consolidation => write!(f, "consolidation"),
        }
    }
}

/// Tables handed over by the host. Presets that only read FAC ignore `eap`.
#[derive(Debug, Clone, Default)]
pub struct PipelineInput {
    pub fac: Option<Table>,
    pub eap: Option<Table>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutput {
    Fac(Table),
    FacLong(Table),
    Consolidation(Consolidation),
}

impl PipelineOutput {
    /// Output tables paired with the sheet names hosts export them under.
    pub fn sheets(&self) -> Vec<(&'static str, &Table)> {
        match self {
            Self::Fac(table) => vec![("FAC_PROCESSADO", table)],
            Self::FacLong(table) => vec![("FAC_LONGO", table)],
            Self::Consolidation(c) => vec![
                ("FAC_PROCESSADO", &c.fac),
                ("EAP_PROCESSADA", &c.eap),
                ("FAC_EAP_CONSOLIDADO", &c.consolidated),
            ],
        }
    }
}

/// Configured pipeline with an injected trace sink.
///
/// Holds no state between runs; every call works on owned copies of its
/// input, so the same tables can be run any number of times.
pub struct Pipeline<'a> {
    config: ReconConfig,
    sink: &'a dyn TraceSink,
}

impl Default for Pipeline<'static> {
    fn default() -> Self {
        Self::new(ReconConfig::default(), &TracingSink)
    }
}

impl<'a> Pipeline<'a> {
    pub fn new(config: ReconConfig, sink: &'a dyn TraceSink) -> Self {
        Self { config, sink }
    }

    pub fn run(&self, preset: Preset, input: &PipelineInput) -> Result<PipelineOutput, ReconError> {
        self.sink.record(&TraceEvent::Started { preset });
        match preset {
            Preset::FacOnly => self.fac_only(input.fac.as_ref()).map(PipelineOutput::Fac),
            Preset::FacLong => self.fac_long(input.fac.as_ref()).map(PipelineOutput::FacLong),
            Preset::Consolidation => self
                .consolidate(input.fac.as_ref(), input.eap.as_ref())
                .map(PipelineOutput::Consolidation),
        }
    }

    pub fn fac(&self, fac: Option<&Table>) -> Result<FacOutcome, ReconError> {
        process_fac(fac, &self.config, self.sink)
    }

    pub fn eap(&self, eap: Option<&Table>) -> Result<EapOutcome, ReconError> {
        process_eap(eap, &self.config, self.sink)
    }

    pub fn fac_only(&self, fac: Option<&Table>) -> Result<Table, ReconError> {
        Ok(self.fac(fac)?.table)
    }

    pub fn fac_long(&self, fac: Option<&Table>) -> Result<Table, ReconError> {
        Ok(to_long(&self.fac(fac)?))
    }

    /// FAC + EAP consolidation: index the EAP leaves, join the FAC functions
    /// onto them, explode multi-tag rows and drop the audit column.
    pub fn consolidate(
        &self,
        fac: Option<&Table>,
        eap: Option<&Table>,
    ) -> Result<Consolidation, ReconError> {
        let fac = self.fac(fac)?;
        let eap = self.eap(eap)?;

        let index = HierarchyIndex::build(eap.outline_pairs());
        let leaves = index_leaves(&eap.table, &index);
        self.sink.record(&TraceEvent::LeavesIndexed {
            leaves: leaves.table.height(),
            subsections: index.subsection_count(),
            tags: index.tag_count(),
            orphans: leaves.orphans,
        });

        let joined = left_join(&leaves.table, &fac.table, &fac.key, &self.config)?;
        self.sink.record(&TraceEvent::Joined {
            rows: joined.table.height(),
            matched: joined.matched,
            unmatched: joined.unmatched,
            duplicate_keys: joined.duplicate_keys,
        });

        let exploded = explode_tags(&joined.table);
        self.sink.record(&TraceEvent::Exploded {
            input: joined.table.height(),
            output: exploded.height(),
        });

        let consolidated = order_columns(&exploded.drop_columns_where(|label| label == TAG_RAW));

        Ok(Consolidation {
            fac: fac.table,
            eap: eap.table,
            consolidated,
        })
    }
}
