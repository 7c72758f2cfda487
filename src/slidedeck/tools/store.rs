use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::slidedeck::tools::error::{Result, ToolError};
use crate::slidedeck::tools::model::DeckConfig;

const CONFIG_FILE: &str = "config.json";
const ASSETS_DIR: &str = "assets";
const OUTPUT_DIR: &str = "output";

/// Filesystem-backed collection of deck directories under a single root.
///
/// Each deck is `<root>/<name>/` holding `assets/`, `output/`, and a
/// `config.json` descriptor. The store does no locking; callers mutating
/// the same deck must serialise themselves.
#[derive(Debug, Clone)]
pub struct DeckStore {
    root: PathBuf,
}

impl DeckStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonical directory of a deck. Does not check that it exists.
    pub fn locate(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Directory of a deck that must already exist.
    pub fn existing(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        let path = self.locate(name);
        if !path.is_dir() {
            return Err(ToolError::DeckNotFound(name.to_string()));
        }
        Ok(path)
    }

    pub fn assets_dir(&self, name: &str) -> PathBuf {
        self.locate(name).join(ASSETS_DIR)
    }

    /// Location of the generated artifact with the given extension,
    /// e.g. `output/<name>.pptx`.
    pub fn output_path(&self, name: &str, extension: &str) -> PathBuf {
        self.locate(name)
            .join(OUTPUT_DIR)
            .join(format!("{name}.{extension}"))
    }

    /// Creates a new deck with empty `assets/` and `output/` folders.
    #[instrument(level = "info", skip(self, metadata), fields(root = %self.root.display()))]
    pub fn create(&self, name: &str, metadata: Map<String, Value>) -> Result<PathBuf> {
        validate_name(name)?;
        let path = self.locate(name);
        if path.exists() {
            return Err(ToolError::DeckExists(name.to_string()));
        }
        fs::create_dir_all(path.join(ASSETS_DIR))?;
        fs::create_dir_all(path.join(OUTPUT_DIR))?;
        write_config(&path, &DeckConfig::new(name, metadata))?;
        info!(path = %path.display(), "deck created");
        Ok(path)
    }

    /// Names of all deck directories, sorted. A missing root yields no decks.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        debug!(deck_count = names.len(), "listed decks");
        Ok(names)
    }

    /// Reads a deck's `config.json`.
    pub fn config(&self, name: &str) -> Result<DeckConfig> {
        let path = self.existing(name)?;
        let source = fs::read_to_string(path.join(CONFIG_FILE))?;
        Ok(serde_json::from_str(&source)?)
    }

    /// Rewrites the status field of a deck's descriptor, if it has one.
    /// Every other key is left untouched.
    pub fn set_status(&self, name: &str, status: &str) -> Result<()> {
        let path = self.existing(name)?;
        if !path.join(CONFIG_FILE).is_file() {
            return Ok(());
        }
        let mut config = read_raw_config(&path)?;
        config.insert("status".into(), Value::from(status));
        write_config(&path, &config)
    }

    /// Copies the whole `source` deck to `target` and records the provenance.
    #[instrument(level = "info", skip(self), fields(root = %self.root.display()))]
    pub fn clone_deck(&self, source: &str, target: &str) -> Result<PathBuf> {
        let source_path = self.existing(source)?;
        validate_name(target)?;
        let target_path = self.locate(target);
        if target_path.exists() {
            return Err(ToolError::DeckExists(target.to_string()));
        }

        let copied = copy_tree(&source_path, &target_path)?;
        debug!(file_count = copied, "deck tree copied");

        if target_path.join(CONFIG_FILE).is_file() {
            let mut config = read_raw_config(&target_path)?;
            config.insert("name".into(), Value::from(target));
            config.insert("cloned_from".into(), Value::from(source));
            write_config(&target_path, &config)?;
        }
        info!(path = %target_path.display(), "deck cloned");
        Ok(target_path)
    }

    /// Removes a deck and everything inside it.
    #[instrument(level = "info", skip(self), fields(root = %self.root.display()))]
    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.existing(name)?;
        fs::remove_dir_all(&path)?;
        info!("deck deleted");
        Ok(())
    }
}

/// Rejects names that would not map onto exactly one directory in the root.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    let invalid = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.contains('\0');
    if invalid {
        return Err(ToolError::InvalidDeckName(name.to_string()));
    }
    Ok(())
}

/// Descriptor as an untyped JSON object, for edits that must keep every key.
fn read_raw_config(deck_dir: &Path) -> Result<Map<String, Value>> {
    let source = fs::read_to_string(deck_dir.join(CONFIG_FILE))?;
    Ok(serde_json::from_str(&source)?)
}

/// Pretty-prints the descriptor with four-space indentation.
fn write_config<T: Serialize>(deck_dir: &Path, config: &T) -> Result<()> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    config.serialize(&mut serializer)?;
    fs::write(deck_dir.join(CONFIG_FILE), buffer)?;
    Ok(())
}

/// Recursively copies `source` into `target`, returning the number of files copied.
pub(crate) fn copy_tree(source: &Path, target: &Path) -> Result<usize> {
    fs::create_dir_all(target)?;
    let mut copied = 0;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let destination = target.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copied += copy_tree(&entry.path(), &destination)?;
        } else {
            fs::copy(entry.path(), &destination)?;
            copied += 1;
        }
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slidedeck::tools::error::ErrorKind;
    use crate::slidedeck::tools::model::STATUS_INITIALIZED;
    use tempfile::tempdir;

    #[test]
    fn create_writes_layout_and_config() {
        let dir = tempdir().unwrap();
        let store = DeckStore::new(dir.path());
        let mut metadata = Map::new();
        metadata.insert("purpose".into(), Value::from("quarterly review"));

        let path = store.create("q3", metadata).unwrap();
        assert!(path.join("assets").is_dir());
        assert!(path.join("output").is_dir());

        let config = store.config("q3").unwrap();
        assert_eq!(config.name, "q3");
        assert_eq!(config.status, STATUS_INITIALIZED);
        assert!(config.created_at.is_some());
        assert_eq!(config.metadata["purpose"], "quarterly review");

        let raw = fs::read_to_string(path.join("config.json")).unwrap();
        assert!(raw.contains("\n    \"name\": \"q3\""));
    }

    #[test]
    fn list_is_sorted_and_tolerates_missing_root() {
        let dir = tempdir().unwrap();
        let store = DeckStore::new(dir.path().join("not-yet"));
        assert!(store.list().unwrap().is_empty());

        let store = DeckStore::new(dir.path());
        store.create("zeta", Map::new()).unwrap();
        store.create("alpha", Map::new()).unwrap();
        fs::write(dir.path().join("stray.txt"), "x").unwrap();
        assert_eq!(store.list().unwrap(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn names_must_be_single_directories() {
        let dir = tempdir().unwrap();
        let store = DeckStore::new(dir.path());
        for name in ["", "  ", ".", "..", "a/b", "a\\b"] {
            let err = store.create(name, Map::new()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "{name:?}");
        }
    }

    #[test]
    fn set_status_rewrites_descriptor() {
        let dir = tempdir().unwrap();
        let store = DeckStore::new(dir.path());
        store.create("deck", Map::new()).unwrap();
        let before = store.config("deck").unwrap();

        store.set_status("deck", "generated").unwrap();
        let after = store.config("deck").unwrap();
        assert_eq!(after.status, "generated");
        assert_eq!(after.created_at, before.created_at);
    }

    #[test]
    fn edits_keep_foreign_keys() {
        let dir = tempdir().unwrap();
        let store = DeckStore::new(dir.path());
        fs::create_dir_all(dir.path().join("legacy")).unwrap();
        fs::write(
            dir.path().join("legacy/config.json"),
            r#"{"name": "legacy", "theme": "dark", "created_at": "last week"}"#,
        )
        .unwrap();

        store.set_status("legacy", "generated").unwrap();
        store.clone_deck("legacy", "copy").unwrap();

        let raw: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("copy/config.json")).unwrap())
                .unwrap();
        assert_eq!(raw["name"], "copy");
        assert_eq!(raw["cloned_from"], "legacy");
        assert_eq!(raw["status"], "generated");
        assert_eq!(raw["theme"], "dark");
        assert_eq!(raw["created_at"], "last week");
    }

    #[test]
    fn clone_without_config_still_copies() {
        let dir = tempdir().unwrap();
        let store = DeckStore::new(dir.path());
        fs::create_dir_all(dir.path().join("legacy/assets/nested")).unwrap();
        fs::write(dir.path().join("legacy/assets/nested/a.bin"), [1u8, 2, 3]).unwrap();

        let path = store.clone_deck("legacy", "copy").unwrap();
        assert_eq!(fs::read(path.join("assets/nested/a.bin")).unwrap(), vec![1, 2, 3]);
        assert!(!path.join("config.json").exists());
    }
}
