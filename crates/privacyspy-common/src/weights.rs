/// Keyword coefficient table used by the sentence scorer.
///
/// The resource is a flat JSON object mapping a lemma to its weight, e.g.
/// `{"privacy": 2.0, "share": 1.0}`. Keys are lowercased once at load so lookups
/// never have to fold case.
use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::CommonError;

/// Location of the weights resource when none is configured.
pub const DEFAULT_WEIGHTS_PATH: &str = "./data/keyword_coefficients.json";

/// Immutable lemma → weight mapping. Built once at startup and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct KeywordWeights {
    weights: HashMap<String, f64>,
}

impl KeywordWeights {
    /// Load the weights resource from a JSON file.
    ///
    /// Any failure here (missing file, malformed JSON, non-numeric values,
    /// conflicting case-folded keys) is meant to abort startup.
    pub fn load(path: &Path) -> Result<Self, CommonError> {
        let content = std::fs::read_to_string(path).map_err(|source| CommonError::WeightsIo {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: HashMap<String, f64> =
            serde_json::from_str(&content).map_err(|source| CommonError::WeightsJson {
                path: path.to_path_buf(),
                source,
            })?;
        let weights = Self::from_map(raw)?;
        debug!(path = %path.display(), keywords = weights.len(), "keyword weights loaded");
        Ok(weights)
    }

    /// Build from an in-memory mapping, lowercasing every key.
    pub fn from_map<I, K>(entries: I) -> Result<Self, CommonError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut weights: HashMap<String, f64> = HashMap::new();
        for (key, weight) in entries {
            let lemma = key.as_ref().trim().to_lowercase();
            if !weight.is_finite() {
                return Err(CommonError::NonFiniteWeight { lemma });
            }
            match weights.get(&lemma) {
                Some(existing) if *existing != weight => {
                    return Err(CommonError::DuplicateLemma { lemma });
                }
                _ => {
                    weights.insert(lemma, weight);
                }
            }
        }
        Ok(Self { weights })
    }

    /// Weight for an already-lowercased lemma.
    pub fn get(&self, lemma: &str) -> Option<f64> {
        self.weights.get(lemma).copied()
    }

    pub fn contains(&self, lemma: &str) -> bool {
        self.weights.contains_key(lemma)
    }

    /// All known lemmas, in no particular order.
    pub fn lemmas(&self) -> impl Iterator<Item = &str> + '_ {
        self.weights.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
