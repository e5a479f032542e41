//! Pipeline driver: aggregation, threshold filter, estimation, statistics

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::algorithms::estimator::estimate_position;
use crate::core::LocatedAccessPoint;
use crate::processing::aggregator::{Aggregation, ObservationAggregator, SkipTally};
use crate::processing::parser::RawRecord;
use crate::processing::source::SourceError;
use crate::utils::config::PipelineConfig;
use crate::validation::Result;

/// Run statistics, always available whether or not anything qualified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub records_read: usize,
    pub records_skipped: usize,
    pub skipped: SkipTally,
    pub identities_seen: usize,
    pub below_threshold: usize,
    pub located: usize,
    /// Mean uncertainty radius across located access points (m)
    pub mean_uncertainty_m: Option<f64>,
    pub max_observation_count: Option<usize>,
}

/// Located access points plus run statistics
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub access_points: Vec<LocatedAccessPoint>,
    pub summary: RunSummary,
}

impl PipelineOutcome {
    /// True when no access point met the observation threshold
    pub fn is_empty(&self) -> bool {
        self.access_points.is_empty()
    }
}

/// Batch triangulation over one record stream
#[derive(Debug, Clone)]
pub struct TriangulationPipeline {
    config: PipelineConfig,
}

impl TriangulationPipeline {
    /// Fails when the configuration is unusable (e.g. `min_observations == 0`)
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn min_observations(&self) -> usize {
        self.config.min_observations
    }

    /// Run over records from a source that may fail row by row
    pub fn run<I>(&self, records: I) -> Result<PipelineOutcome>
    where
        I: IntoIterator<Item = std::result::Result<RawRecord, SourceError>>,
    {
        let mut aggregator = ObservationAggregator::new();
        for record in records {
            match record {
                Ok(record) => aggregator.push_record(&record),
                Err(e) => aggregator.push_unreadable(e.to_string()),
            }
        }
        self.locate(aggregator.finish())
    }

    /// Run over an in-memory record sequence
    pub fn run_records<I>(&self, records: I) -> Result<PipelineOutcome>
    where
        I: IntoIterator<Item = RawRecord>,
    {
        self.run(records.into_iter().map(Ok))
    }

    /// Filter by threshold and estimate every qualifying group
    pub fn locate(&self, aggregation: Aggregation) -> Result<PipelineOutcome> {
        let identities_seen = aggregation.groups.len();
        let mut access_points = Vec::new();

        for group in aggregation.groups {
            let count = group.observations.len();
            if count < self.config.min_observations {
                debug!(mac = %group.identity, observations = count, "Below observation threshold");
                continue;
            }

            let estimate = estimate_position(&group.observations)?;
            access_points.push(LocatedAccessPoint {
                identity: group.identity,
                display_name: group.display_name,
                latitude: estimate.latitude,
                longitude: estimate.longitude,
                uncertainty_radius_m: estimate.uncertainty_radius_m,
                observation_count: count,
            });
        }

        let summary = summarize(
            &access_points,
            aggregation.records_read,
            aggregation.skipped,
            identities_seen,
        );

        info!(
            records = summary.records_read,
            skipped = summary.records_skipped,
            identities = summary.identities_seen,
            located = summary.located,
            "Triangulation complete"
        );

        Ok(PipelineOutcome {
            access_points,
            summary,
        })
    }
}

fn summarize(
    access_points: &[LocatedAccessPoint],
    records_read: usize,
    skipped: SkipTally,
    identities_seen: usize,
) -> RunSummary {
    let located = access_points.len();
    let mean_uncertainty_m = if located == 0 {
        None
    } else {
        Some(access_points.iter().map(|ap| ap.uncertainty_radius_m).sum::<f64>() / located as f64)
    };

    RunSummary {
        records_read,
        records_skipped: skipped.total(),
        skipped,
        identities_seen,
        below_threshold: identities_seen - located,
        located,
        mean_uncertainty_m,
        max_observation_count: access_points.iter().map(|ap| ap.observation_count).max(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::TriangulationError;
    use approx::assert_relative_eq;

    fn record(mac: &str, lat: f64, lon: f64, rssi: i32, accuracy: f64) -> RawRecord {
        [
            ("MAC", mac.to_string()),
            ("CurrentLatitude", lat.to_string()),
            ("CurrentLongitude", lon.to_string()),
            ("RSSI", rssi.to_string()),
            ("AccuracyMeters", accuracy.to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    fn pipeline(min_observations: usize) -> TriangulationPipeline {
        TriangulationPipeline::new(PipelineConfig::default().with_min_observations(min_observations))
            .unwrap()
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let result = TriangulationPipeline::new(PipelineConfig::default().with_min_observations(0));
        assert!(matches!(result, Err(TriangulationError::Config(_))));
    }

    #[test]
    fn test_threshold_filters_identities() {
        let mut records = Vec::new();
        for i in 0..4 {
            records.push(record("AA:AA:AA:AA:AA:AA", 10.0 + i as f64 * 1e-4, 20.0, -60, 5.0));
        }
        for i in 0..2 {
            records.push(record("BB:BB:BB:BB:BB:BB", 11.0 + i as f64 * 1e-4, 21.0, -60, 5.0));
        }

        for threshold in 1..=5 {
            let outcome = pipeline(threshold).run_records(records.clone()).unwrap();
            for ap in &outcome.access_points {
                assert!(ap.observation_count >= threshold);
            }
            let expected = [4usize, 2].iter().filter(|&&n| n >= threshold).count();
            assert_eq!(outcome.access_points.len(), expected);
            assert_eq!(outcome.summary.below_threshold, 2 - expected);
        }
    }

    #[test]
    fn test_summary_statistics() {
        let mut records = Vec::new();
        for _ in 0..3 {
            records.push(record("AA:AA:AA:AA:AA:AA", 10.0, 20.0, -60, 4.0));
        }
        for _ in 0..5 {
            records.push(record("BB:BB:BB:BB:BB:BB", 11.0, 21.0, -60, 8.0));
        }
        records.push(record("CC:CC:CC:CC:CC:CC", 0.0, 0.0, -60, 8.0));

        let outcome = pipeline(3).run_records(records).unwrap();
        let summary = &outcome.summary;

        assert_eq!(summary.records_read, 9);
        assert_eq!(summary.records_skipped, 1);
        assert_eq!(summary.skipped.no_fix, 1);
        assert_eq!(summary.identities_seen, 2);
        assert_eq!(summary.located, 2);
        assert_eq!(summary.max_observation_count, Some(5));
        // Co-located sightings: uncertainty is just the mean accuracy
        assert_relative_eq!(summary.mean_uncertainty_m.unwrap(), 6.0, epsilon = 1e-6);
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let records = vec![record("AA:AA:AA:AA:AA:AA", 10.0, 20.0, -60, 4.0)];
        let outcome = pipeline(3).run_records(records).unwrap();

        assert!(outcome.is_empty());
        assert_eq!(outcome.summary.located, 0);
        assert_eq!(outcome.summary.mean_uncertainty_m, None);
        assert_eq!(outcome.summary.max_observation_count, None);
    }

    #[test]
    fn test_unreadable_rows_do_not_abort() {
        let rows: Vec<std::result::Result<RawRecord, SourceError>> = vec![
            Ok(record("AA:AA:AA:AA:AA:AA", 10.0, 20.0, -60, 4.0)),
            Err(SourceError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "stream did not contain valid UTF-8",
            ))),
            Ok(record("AA:AA:AA:AA:AA:AA", 10.0, 20.0, -60, 4.0)),
        ];

        let outcome = pipeline(2).run(rows).unwrap();
        assert_eq!(outcome.access_points.len(), 1);
        assert_eq!(outcome.summary.skipped.unreadable, 1);
        assert_eq!(outcome.summary.records_read, 3);
    }

    #[test]
    fn test_output_follows_first_seen_order() {
        let records = vec![
            record("CC:CC:CC:CC:CC:CC", 1.0, 1.0, -60, 4.0),
            record("AA:AA:AA:AA:AA:AA", 2.0, 2.0, -60, 4.0),
            record("CC:CC:CC:CC:CC:CC", 1.0, 1.0, -60, 4.0),
        ];
        let outcome = pipeline(1).run_records(records).unwrap();
        let macs: Vec<&str> = outcome
            .access_points
            .iter()
            .map(|ap| ap.identity.as_str())
            .collect();
        assert_eq!(macs, vec!["CC:CC:CC:CC:CC:CC", "AA:AA:AA:AA:AA:AA"]);
        assert_eq!(outcome.access_points[0].observation_count, 2);
    }
}
