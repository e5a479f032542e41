//! Grouping of validated observations by access point identity

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use crate::core::{AccessPointIdentity, Observation};
use crate::processing::parser::{parse_record, ParsedRecord, RawRecord, RecordOutcome, SkipReason};

/// All observations gathered for one access point
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationGroup {
    pub identity: AccessPointIdentity,
    pub display_name: Option<String>,
    pub observations: Vec<Observation>,
}

/// Per-reason counters for dropped records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipTally {
    pub missing_identity: usize,
    pub missing_coordinate: usize,
    pub malformed_number: usize,
    pub no_fix: usize,
    pub unreadable: usize,
}

impl SkipTally {
    pub fn record(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::MissingIdentity => self.missing_identity += 1,
            SkipReason::MissingCoordinate { .. } => self.missing_coordinate += 1,
            SkipReason::MalformedNumber { .. } => self.malformed_number += 1,
            SkipReason::NoFix => self.no_fix += 1,
            SkipReason::Unreadable { .. } => self.unreadable += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.missing_identity
            + self.missing_coordinate
            + self.malformed_number
            + self.no_fix
            + self.unreadable
    }
}

/// Result of folding a record stream
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    /// Groups in first-seen order of identity
    pub groups: Vec<ObservationGroup>,
    pub records_read: usize,
    pub skipped: SkipTally,
}

impl Aggregation {
    pub fn observation_count(&self) -> usize {
        self.groups.iter().map(|g| g.observations.len()).sum()
    }
}

/// Keep the first non-empty display name; a later one only fills an empty slot
pub fn resolve_display_name(current: Option<String>, candidate: Option<&str>) -> Option<String> {
    match (current, candidate) {
        (Some(existing), _) if !existing.is_empty() => Some(existing),
        (_, Some(name)) if !name.is_empty() => Some(name.to_string()),
        (existing, _) => existing,
    }
}

/// Incremental fold of raw records into per-identity observation lists
#[derive(Debug, Default)]
pub struct ObservationAggregator {
    index: HashMap<AccessPointIdentity, usize>,
    groups: Vec<ObservationGroup>,
    records_read: usize,
    skipped: SkipTally,
}

impl ObservationAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and absorb one raw record
    pub fn push_record(&mut self, record: &RawRecord) {
        self.records_read += 1;
        match parse_record(record) {
            RecordOutcome::Accepted(parsed) => self.absorb(parsed),
            RecordOutcome::Skipped(reason) => self.skip(reason),
        }
    }

    /// Count a row the source could not decode
    pub fn push_unreadable(&mut self, details: impl Into<String>) {
        self.records_read += 1;
        self.skip(SkipReason::Unreadable {
            details: details.into(),
        });
    }

    fn skip(&mut self, reason: SkipReason) {
        warn!(record = self.records_read, %reason, "Skipping record");
        self.skipped.record(&reason);
    }

    fn absorb(&mut self, parsed: ParsedRecord) {
        let ParsedRecord {
            identity,
            display_name,
            observation,
        } = parsed;

        let slot = match self.index.get(&identity) {
            Some(&slot) => slot,
            None => {
                let slot = self.groups.len();
                self.index.insert(identity.clone(), slot);
                self.groups.push(ObservationGroup {
                    identity,
                    display_name: None,
                    observations: Vec::new(),
                });
                slot
            }
        };

        let group = &mut self.groups[slot];
        group.display_name = resolve_display_name(group.display_name.take(), display_name.as_deref());
        group.observations.push(observation);
    }

    pub fn finish(self) -> Aggregation {
        Aggregation {
            groups: self.groups,
            records_read: self.records_read,
            skipped: self.skipped,
        }
    }
}

/// Fold a complete record sequence
pub fn aggregate<I>(records: I) -> Aggregation
where
    I: IntoIterator<Item = RawRecord>,
{
    let mut aggregator = ObservationAggregator::new();
    for record in records {
        aggregator.push_record(&record);
    }
    aggregator.finish()
}
