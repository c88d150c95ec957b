use crate::core::record_builder::{BuilderOptions, RecordBuilder};
use crate::core::validator::validate_record;
use crate::domain::model::{CleaningSummary, RawRow, SalesRecord, ValidationVerdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Processing,
    Complete,
}

/// Everything a finished run exposes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleaningOutcome {
    pub records: Vec<SalesRecord>,
    pub verdicts: Vec<ValidationVerdict>,
    pub valid_records: Vec<SalesRecord>,
    pub summary: CleaningSummary,
}

impl CleaningOutcome {
    /// Whether downstream stages have anything to work with.
    pub fn has_valid_records(&self) -> bool {
        !self.valid_records.is_empty()
    }
}

/// Build → validate → filter over one batch of data rows.
///
/// Row problems never abort a run; the worst case is a record marked invalid.
#[derive(Debug)]
pub struct CleaningRun {
    builder: RecordBuilder,
    state: RunState,
    outcome: Option<CleaningOutcome>,
}

impl CleaningRun {
    pub fn new(options: BuilderOptions) -> Self {
        Self {
            builder: RecordBuilder::new(options),
            state: RunState::Idle,
            outcome: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn outcome(&self) -> Option<&CleaningOutcome> {
        self.outcome.as_ref()
    }

    /// `rows` must already exclude the header.
    pub fn process(&mut self, rows: &[RawRow]) -> &CleaningOutcome {
        self.state = RunState::Processing;
        tracing::debug!("Cleaning {} rows", rows.len());

        let records = self.builder.build_all(rows);
        let verdicts: Vec<ValidationVerdict> = records.iter().map(validate_record).collect();

        let valid_records: Vec<SalesRecord> = records
            .iter()
            .zip(verdicts.iter())
            .filter(|(_, verdict)| verdict.is_valid)
            .map(|(record, _)| record.clone())
            .collect();

        for (index, verdict) in verdicts.iter().enumerate().filter(|(_, v)| !v.is_valid) {
            tracing::debug!(
                "Row {} rejected ({}): {}",
                index + 1,
                records[index].transaction_id,
                verdict.reasons().join("; ")
            );
        }

        let summary = summarize(rows.len(), &records, valid_records.len());
        tracing::info!(
            "🧹 Cleaned {} rows: {} valid, {} invalid ({:.1}% valid)",
            summary.total,
            summary.valid,
            summary.invalid,
            summary.validity_rate
        );
        if valid_records.is_empty() {
            tracing::warn!("No valid records after cleaning; nothing to aggregate");
        }

        self.state = RunState::Complete;
        self.outcome.insert(CleaningOutcome {
            records,
            verdicts,
            valid_records,
            summary,
        })
    }
}

impl Default for CleaningRun {
    fn default() -> Self {
        Self::new(BuilderOptions::default())
    }
}

fn summarize(total: usize, records: &[SalesRecord], valid: usize) -> CleaningSummary {
    let validity_rate = if total > 0 {
        valid as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    CleaningSummary {
        total,
        valid,
        invalid: records.len() - valid,
        cleaned: records.len(),
        validity_rate,
    }
}

/// One-shot helper for callers that do not care about run state.
pub fn clean_rows(rows: &[RawRow], options: BuilderOptions) -> CleaningOutcome {
    let mut run = CleaningRun::new(options);
    run.process(rows).clone()
}
