//! Model Loader Module
//! Finds the serialized booster on disk and loads it.

use crate::config::ModelConfig;
use crate::model::booster::{Booster, ModelError};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions recognized when scanning the search directory.
pub const MODEL_EXTENSIONS: &[&str] = &["json"];

/// Resolves the model path: pinned location first, then the search directory.
pub struct ModelLocator {
    pinned: PathBuf,
    search_dir: PathBuf,
}

impl ModelLocator {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            pinned: config.pinned_path.clone(),
            search_dir: config.search_dir.clone(),
        }
    }

    pub fn resolve(&self) -> Result<PathBuf, ModelError> {
        if self.pinned.is_file() {
            return Ok(self.pinned.clone());
        }

        match first_model_file(&self.search_dir) {
            Some(path) => {
                info!(
                    "Pinned model {} not found, using {}",
                    self.pinned.display(),
                    path.display()
                );
                Ok(path)
            }
            None => Err(ModelError::NotFound(format!(
                "{} and *.{} in {}",
                self.pinned.display(),
                MODEL_EXTENSIONS.join(", *."),
                self.search_dir.display()
            ))),
        }
    }
}

fn has_model_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| MODEL_EXTENSIONS.iter().any(|m| e.eq_ignore_ascii_case(m)))
        .unwrap_or(false)
}

/// First matching file by name, so the choice does not depend on directory order.
fn first_model_file(dir: &Path) -> Option<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot scan {} for models: {}", dir.display(), e);
            return None;
        }
    };

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && has_model_extension(path))
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

/// Resolve and parse the booster described by `config`.
pub fn load_model(config: &ModelConfig) -> Result<Booster, ModelError> {
    let path = ModelLocator::new(config).resolve()?;
    Booster::load(&path, config.dump_base_score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::booster::tests::NATIVE_MODEL;
    use tempfile::TempDir;

    fn config(pinned: PathBuf, dir: &Path) -> ModelConfig {
        ModelConfig {
            pinned_path: pinned,
            search_dir: dir.to_path_buf(),
            ..ModelConfig::default()
        }
    }

    #[test]
    fn pinned_path_wins() {
        let dir = TempDir::new().unwrap();
        let pinned = dir.path().join("pinned.json");
        fs::write(&pinned, "{}").unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();

        let locator = ModelLocator::new(&config(pinned.clone(), dir.path()));
        assert_eq!(locator.resolve().unwrap(), pinned);
    }

    #[test]
    fn falls_back_to_first_sorted_candidate() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("zeta.json"), "{}").unwrap();
        fs::write(dir.path().join("alpha.JSON"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let locator = ModelLocator::new(&config(dir.path().join("missing.json"), dir.path()));
        assert_eq!(locator.resolve().unwrap(), dir.path().join("alpha.JSON"));
    }

    #[test]
    fn nothing_found() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("train.csv"), "").unwrap();

        let locator = ModelLocator::new(&config(dir.path().join("missing.json"), dir.path()));
        assert!(matches!(locator.resolve(), Err(ModelError::NotFound(_))));
    }

    #[test]
    fn loads_resolved_model() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("xgboost_model.json"), NATIVE_MODEL).unwrap();

        let booster = load_model(&config(dir.path().join("missing.json"), dir.path())).unwrap();
        assert_eq!(booster.tree_count(), 2);
        assert_eq!(
            booster.source(),
            Some(dir.path().join("xgboost_model.json").as_path())
        );
    }
}
