//! Corpus sources: finite, restartable sequences of `{reference, text}` records.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::error::{IngestError, IngestResult};

/// One corpus item before embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusRecord {
    pub reference: String,
    pub text: String,
}

impl CorpusRecord {
    pub fn new(reference: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            text: text.into(),
        }
    }
}

/// Accepted JSON record shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRecord {
    Labelled {
        reference: String,
        text: String,
    },
    Verse {
        book: String,
        chapter: u32,
        verse: u32,
        text: String,
    },
}

impl From<RawRecord> for CorpusRecord {
    fn from(raw: RawRecord) -> Self {
        match raw {
            RawRecord::Labelled { reference, text } => CorpusRecord { reference, text },
            RawRecord::Verse {
                book,
                chapter,
                verse,
                text,
            } => CorpusRecord {
                reference: format!("{} {}:{}", book, chapter, verse),
                text,
            },
        }
    }
}

pub type RecordIter<'a> = Box<dyn Iterator<Item = IngestResult<CorpusRecord>> + Send + 'a>;

/// A corpus that can be read from the start any number of times.
pub trait CorpusSource: Send + Sync {
    /// Human-readable name for logs and errors.
    fn name(&self) -> String;

    /// Starts a fresh pass over the records.
    fn open(&self) -> IngestResult<RecordIter<'_>>;

    /// Record count if known without reading the corpus.
    fn len_hint(&self) -> Option<usize> {
        None
    }
}

/// In-memory corpus.
#[derive(Debug, Clone, Default)]
pub struct VecCorpus {
    records: Vec<CorpusRecord>,
}

impl VecCorpus {
    pub fn new(records: Vec<CorpusRecord>) -> Self {
        Self { records }
    }

    pub fn from_pairs<R, T>(pairs: impl IntoIterator<Item = (R, T)>) -> Self
    where
        R: Into<String>,
        T: Into<String>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(r, t)| CorpusRecord::new(r, t))
                .collect(),
        )
    }
}

impl CorpusSource for VecCorpus {
    fn name(&self) -> String {
        "<memory>".to_string()
    }

    fn open(&self) -> IngestResult<RecordIter<'_>> {
        Ok(Box::new(self.records.iter().cloned().map(Ok)))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.records.len())
    }
}

/// A JSON file holding an array of records.
#[derive(Debug, Clone)]
pub struct JsonCorpus {
    path: PathBuf,
}

impl JsonCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CorpusSource for JsonCorpus {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn open(&self) -> IngestResult<RecordIter<'_>> {
        let bytes = fs::read(&self.path).map_err(|e| IngestError::Corpus {
            source_name: self.name(),
            reason: e.to_string(),
        })?;
        let records: Vec<RawRecord> =
            serde_json::from_slice(&bytes).map_err(|e| IngestError::Corpus {
                source_name: self.name(),
                reason: e.to_string(),
            })?;

        Ok(Box::new(
            records.into_iter().map(|r| Ok(CorpusRecord::from(r))),
        ))
    }
}

/// A file with one JSON record per line. Blank lines are ignored. Read lazily.
#[derive(Debug, Clone)]
pub struct JsonLinesCorpus {
    path: PathBuf,
}

impl JsonLinesCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CorpusSource for JsonLinesCorpus {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn open(&self) -> IngestResult<RecordIter<'_>> {
        let file = File::open(&self.path).map_err(|e| IngestError::Corpus {
            source_name: self.name(),
            reason: e.to_string(),
        })?;
        let name = self.name();

        let iter = BufReader::new(file)
            .lines()
            .enumerate()
            .filter_map(move |(n, line)| {
                let line_no = n + 1;
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        return Some(Err(IngestError::Corpus {
                            source_name: format!("{}:{}", name, line_no),
                            reason: e.to_string(),
                        }));
                    }
                };
                if line.trim().is_empty() {
                    return None;
                }
                Some(
                    serde_json::from_str::<RawRecord>(&line)
                        .map(CorpusRecord::from)
                        .map_err(|e| IngestError::Corpus {
                            source_name: format!("{}:{}", name, line_no),
                            reason: e.to_string(),
                        }),
                )
            });

        Ok(Box::new(iter))
    }
}

/// Picks [`JsonLinesCorpus`] for `.jsonl`/`.ndjson` files and [`JsonCorpus`] otherwise.
pub fn corpus_from_path(path: impl Into<PathBuf>) -> Box<dyn CorpusSource> {
    let path = path.into();
    match path.extension().and_then(|e| e.to_str()) {
        Some("jsonl") | Some("ndjson") => Box::new(JsonLinesCorpus::new(path)),
        _ => Box::new(JsonCorpus::new(path)),
    }
}
