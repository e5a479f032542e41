//! Wigle CSV record source
//!
//! A Wigle export starts with one metadata line (`WigleWifi-1.4,appRelease=...`)
//! ahead of the real CSV header. The source strips it and hands out each data
//! row as a [`RawRecord`] keyed by column name.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::processing::parser::RawRecord;

/// Prefix of the Wigle metadata preamble line
pub const WIGLE_PREAMBLE_PREFIX: &str = "WigleWifi";

/// Errors that prevent the source from producing any records at all
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
}

type Preamble<R> = io::Chain<Cursor<Vec<u8>>, BufReader<R>>;

/// Reader over the rows of a Wigle CSV export
pub struct WigleCsvSource<R: Read> {
    reader: csv::Reader<Preamble<R>>,
    preamble: Option<String>,
}

impl WigleCsvSource<File> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let file = File::open(&path).map_err(|source| SourceError::Open {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        Self::from_reader(file)
    }
}

impl<R: Read> WigleCsvSource<R> {
    pub fn from_reader(reader: R) -> Result<Self, SourceError> {
        let mut buffered = BufReader::new(reader);
        let mut first_line = String::new();
        buffered.read_line(&mut first_line)?;

        // A first line that is not a preamble is the header; feed it back
        let is_preamble = first_line
            .trim_start_matches('\u{feff}')
            .starts_with(WIGLE_PREAMBLE_PREFIX);
        let (preamble, replay) = if is_preamble {
            debug!(preamble = first_line.trim_end(), "Skipping Wigle metadata line");
            (Some(first_line.trim_end().to_string()), Vec::new())
        } else {
            (None, first_line.into_bytes())
        };

        let reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(Cursor::new(replay).chain(buffered));

        Ok(Self { reader, preamble })
    }

    /// The metadata line that was skipped, if any
    pub fn preamble(&self) -> Option<&str> {
        self.preamble.as_deref()
    }

    /// Iterate over data rows.
    ///
    /// Failing to read the header is fatal; a bad row only yields an error item.
    pub fn into_records(
        mut self,
    ) -> Result<impl Iterator<Item = Result<RawRecord, SourceError>>, SourceError> {
        let headers = self.reader.headers()?.clone();

        Ok(self.reader.into_records().map(move |row| -> Result<RawRecord, SourceError> {
            let row = row?;
            Ok(headers
                .iter()
                .zip(row.iter())
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect())
        }))
    }
}
