//! Per-item outcomes for best-effort batches.
//!
//! Every batch in this crate keeps going when a single file fails. Instead of
//! only logging, each file's result is recorded here so callers (and tests)
//! can see exactly what happened.

use std::path::PathBuf;
use thiserror::Error;

/// Why a single file could not be processed.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read modification time of {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug)]
pub enum Outcome {
    Done,
    Skipped(String),
    Failed(ItemError),
}

#[derive(Debug)]
pub struct ItemReport {
    pub name: String,
    pub outcome: Outcome,
}

/// Ordered results of one batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub items: Vec<ItemReport>,
}

impl BatchReport {
    pub fn push(&mut self, name: impl Into<String>, outcome: Outcome) {
        self.items.push(ItemReport {
            name: name.into(),
            outcome,
        });
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Done))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    pub fn get(&self, name: &str) -> Option<&Outcome> {
        self.items
            .iter()
            .find(|i| i.name == name)
            .map(|i| &i.outcome)
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.items.iter().filter(|i| pred(&i.outcome)).count()
    }
}
