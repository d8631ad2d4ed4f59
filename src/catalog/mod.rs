//! Static JSON question-pack catalogue.
//!
//! Packs are read-only: a pack file maps each act to an ordered list of
//! question records. The catalogue is loaded once at startup; the dev-only
//! reload endpoint re-reads the directory in place.

use crate::game::acts::ActId;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// One multiple-choice question as authored in a pack file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: String,
    pub prompt: String,
    pub choices: Vec<String>,
    pub correct_index: usize,
    /// Base score value before act multipliers
    pub value: u64,
    #[serde(default)]
    pub hard: bool,
    #[serde(default)]
    pub category: String,
    /// Revealed during the wager hint stage
    #[serde(default)]
    pub hint: Option<String>,
    /// Privately delivered to BOLD-and-up wagers at redline
    #[serde(default)]
    pub extra_hint: Option<String>,
}

/// A question pack file: id, display title, and questions grouped by act.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionPack {
    pub id: String,
    pub title: String,
    pub acts: HashMap<ActId, Vec<QuestionRecord>>,
}

/// Listing entry for the `/packs` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PackSummary {
    pub id: String,
    pub title: String,
    pub question_counts: HashMap<ActId, usize>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read pack directory {dir}: {source}")]
    ReadDir {
        dir: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read pack file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse pack file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("pack file {path} failed validation: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// Process-wide read-only map from `(pack_id, act_id)` to questions.
#[derive(Debug)]
pub struct Catalog {
    packs: DashMap<String, Arc<QuestionPack>>,
    packs_dir: PathBuf,
}

impl Catalog {
    /// Load every `*.json` file under `dir`. Files that fail to parse or
    /// validate are skipped with a warning so one bad pack cannot take the
    /// server down.
    pub fn load_from_dir(dir: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let catalog = Self {
            packs: DashMap::new(),
            packs_dir: dir.into(),
        };
        catalog.reload()?;
        Ok(catalog)
    }

    /// Empty catalogue for tests and programmatic seeding.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            packs: DashMap::new(),
            packs_dir: PathBuf::new(),
        }
    }

    /// Re-read the pack directory, replacing the in-memory set.
    /// Returns the number of packs loaded.
    pub fn reload(&self) -> Result<usize, CatalogError> {
        let entries =
            std::fs::read_dir(&self.packs_dir).map_err(|source| CatalogError::ReadDir {
                dir: self.packs_dir.clone(),
                source,
            })?;

        let mut loaded = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match load_pack_file(&path) {
                Ok(pack) => loaded.push(pack),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "Skipping invalid pack file");
                }
            }
        }

        self.packs.clear();
        let count = loaded.len();
        for pack in loaded {
            self.packs.insert(pack.id.clone(), Arc::new(pack));
        }
        tracing::info!(count, dir = %self.packs_dir.display(), "Question packs loaded");
        Ok(count)
    }

    /// Insert a pack directly (tests, tooling).
    pub fn insert_pack(&self, pack: QuestionPack) {
        self.packs.insert(pack.id.clone(), Arc::new(pack));
    }

    #[must_use]
    pub fn pack(&self, id: &str) -> Option<Arc<QuestionPack>> {
        self.packs.get(id).map(|entry| Arc::clone(entry.value()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }

    /// Deterministic default pack: lexicographically first id.
    #[must_use]
    pub fn default_pack_id(&self) -> Option<String> {
        self.packs
            .iter()
            .map(|entry| entry.key().clone())
            .min()
    }

    /// Questions for one act of one pack, in authored order.
    #[must_use]
    pub fn questions(&self, pack_id: &str, act: ActId) -> Option<Vec<QuestionRecord>> {
        let pack = self.pack(pack_id)?;
        pack.acts.get(&act).cloned()
    }

    #[must_use]
    pub fn pack_summaries(&self) -> Vec<PackSummary> {
        let mut summaries: Vec<PackSummary> = self
            .packs
            .iter()
            .map(|entry| {
                let pack = entry.value();
                PackSummary {
                    id: pack.id.clone(),
                    title: pack.title.clone(),
                    question_counts: pack
                        .acts
                        .iter()
                        .map(|(act, questions)| (*act, questions.len()))
                        .collect(),
                }
            })
            .collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }
}

fn load_pack_file(path: &Path) -> Result<QuestionPack, CatalogError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let pack: QuestionPack =
        serde_json::from_str(&contents).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    validate_pack(&pack).map_err(|reason| CatalogError::Invalid {
        path: path.to_path_buf(),
        reason,
    })?;
    Ok(pack)
}

fn validate_pack(pack: &QuestionPack) -> Result<(), String> {
    if pack.id.trim().is_empty() {
        return Err("pack id is empty".to_string());
    }
    for (act, questions) in &pack.acts {
        for q in questions {
            if q.choices.len() < 2 {
                return Err(format!("question {} in {act} has fewer than 2 choices", q.id));
            }
            if q.correct_index >= q.choices.len() {
                return Err(format!(
                    "question {} in {act} has correct_index out of range",
                    q.id
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str) -> QuestionRecord {
        QuestionRecord {
            id: id.to_string(),
            prompt: "What is 2 + 2?".to_string(),
            choices: vec!["3".into(), "4".into(), "5".into(), "22".into()],
            correct_index: 1,
            value: 100,
            hard: false,
            category: "Math".to_string(),
            hint: Some("More than 3".to_string()),
            extra_hint: None,
        }
    }

    fn pack(id: &str) -> QuestionPack {
        QuestionPack {
            id: id.to_string(),
            title: "Test Pack".to_string(),
            acts: HashMap::from([(ActId::Homeroom, vec![question("q1"), question("q2")])]),
        }
    }

    #[test]
    fn insert_and_lookup() {
        let catalog = Catalog::empty();
        catalog.insert_pack(pack("classic"));

        assert!(catalog.pack("classic").is_some());
        assert!(catalog.pack("missing").is_none());
        let questions = catalog.questions("classic", ActId::Homeroom).unwrap();
        assert_eq!(questions.len(), 2);
        assert!(catalog.questions("classic", ActId::BossFight).is_none());
    }

    #[test]
    fn default_pack_is_lexicographically_first() {
        let catalog = Catalog::empty();
        catalog.insert_pack(pack("zebra"));
        catalog.insert_pack(pack("alpha"));
        assert_eq!(catalog.default_pack_id().as_deref(), Some("alpha"));
    }

    #[test]
    fn validation_rejects_bad_correct_index() {
        let mut bad = pack("bad");
        if let Some(questions) = bad.acts.get_mut(&ActId::Homeroom) {
            questions[0].correct_index = 9;
        }
        assert!(validate_pack(&bad).is_err());
    }

    #[test]
    fn summaries_count_questions_per_act() {
        let catalog = Catalog::empty();
        catalog.insert_pack(pack("classic"));
        let summaries = catalog.pack_summaries();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].question_counts[&ActId::Homeroom], 2);
    }
}
