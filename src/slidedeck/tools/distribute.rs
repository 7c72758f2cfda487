use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::slidedeck::tools::error::{Result, ToolError};
use crate::slidedeck::tools::store::{DeckStore, copy_tree};

/// Content of the stand-in file written by [`export_to_pdf`].
pub const PDF_PLACEHOLDER: &str = "%PDF-1.4 (Placeholder for generated content)";

/// Copies the generated presentation and the deck's assets into
/// `<target_dir>/<name>_dist`, replacing any earlier bundle.
#[instrument(level = "info", skip(store), fields(target = %target_dir.display()))]
pub fn package_assets(store: &DeckStore, name: &str, target_dir: &Path) -> Result<PathBuf> {
    let deck_dir = store.existing(name)?;
    let presentation = store.output_path(name, "pptx");
    if !presentation.is_file() {
        return Err(ToolError::OutputNotFound(name.to_string()));
    }

    let dist = target_dir.join(format!("{name}_dist"));
    if dist.exists() {
        debug!(path = %dist.display(), "removing previous bundle");
        fs::remove_dir_all(&dist)?;
    }
    fs::create_dir_all(&dist)?;
    fs::copy(&presentation, dist.join(format!("{name}.pptx")))?;

    let assets = deck_dir.join("assets");
    if assets.is_dir() {
        let copied = copy_tree(&assets, &dist.join("assets"))?;
        debug!(file_count = copied, "assets copied");
    }

    info!(path = %dist.display(), "deck packaged");
    Ok(dist)
}

/// Writes `output/<name>.pdf`.
///
/// No conversion happens: the file is a fixed placeholder and is not a
/// readable PDF document.
#[instrument(level = "info", skip(store))]
pub fn export_to_pdf(store: &DeckStore, name: &str) -> Result<PathBuf> {
    store.existing(name)?;
    let pdf = store.output_path(name, "pdf");
    if let Some(parent) = pdf.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&pdf, PDF_PLACEHOLDER)?;
    warn!(path = %pdf.display(), "wrote placeholder PDF, no conversion performed");
    Ok(pdf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use tempfile::tempdir;

    #[test]
    fn package_replaces_previous_bundle() {
        let dir = tempdir().unwrap();
        let store = DeckStore::new(dir.path().join("decks"));
        store.create("deck", Map::new()).unwrap();
        fs::write(store.output_path("deck", "pptx"), b"pptx").unwrap();

        let target = dir.path().join("dist");
        let bundle = package_assets(&store, "deck", &target).unwrap();
        fs::write(bundle.join("stale.txt"), "old").unwrap();

        let bundle = package_assets(&store, "deck", &target).unwrap();
        assert!(!bundle.join("stale.txt").exists());
        assert_eq!(fs::read(bundle.join("deck.pptx")).unwrap(), b"pptx");
        assert!(bundle.join("assets").is_dir());
    }

    #[test]
    fn pdf_export_writes_stub() {
        let dir = tempdir().unwrap();
        let store = DeckStore::new(dir.path());
        store.create("deck", Map::new()).unwrap();
        let pdf = export_to_pdf(&store, "deck").unwrap();
        assert_eq!(fs::read_to_string(pdf).unwrap(), PDF_PLACEHOLDER);
    }
}
