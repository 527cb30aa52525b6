//! JSON file store rooted at the configured data directory.
//!
//! Layout:
//! - `mines/<owner>.json`: one [`MineData`] per mine
//! - `pregen.json`: the pregenerated queue
//! - `cursor.json`: the allocator's next grid cell

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::types::{IVec2, PlayerId};
use crate::core::Result;
use crate::mine::MineData;
use crate::placement::PregenMine;
use crate::storage::atomic::atomic_write;

const MINES_DIR: &str = "mines";
const PREGEN_FILENAME: &str = "pregen.json";
const CURSOR_FILENAME: &str = "cursor.json";

#[derive(Debug, Serialize, Deserialize)]
struct PregenFile {
    records: Vec<PregenMine>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CursorFile {
    cursor: IVec2,
}

/// Reads and writes every persisted document
#[derive(Debug, Clone)]
pub struct MineStore {
    root: PathBuf,
}

impl MineStore {
    /// Open (creating if needed) a store at `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(root.join(MINES_DIR))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn mine_path(&self, owner: PlayerId) -> PathBuf {
        self.root.join(MINES_DIR).join(format!("{}.json", owner))
    }

    pub fn save_mine(&self, data: &MineData) -> Result<()> {
        let json = serde_json::to_vec_pretty(data)?;
        atomic_write(&self.mine_path(data.owner), &json)?;
        Ok(())
    }

    /// Load one mine; `None` when it was never saved
    pub fn load_mine(&self, owner: PlayerId) -> Result<Option<MineData>> {
        let path = self.mine_path(owner);
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read(&path)?;
        Ok(Some(serde_json::from_slice(&json)?))
    }

    /// Load every saved mine. Unreadable records are logged and skipped.
    pub fn load_mines(&self) -> Result<Vec<MineData>> {
        let mut mines = Vec::new();
        for entry in std::fs::read_dir(self.root.join(MINES_DIR))? {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let loaded = std::fs::read(&path)
                .map_err(crate::core::Error::from)
                .and_then(|json| Ok(serde_json::from_slice::<MineData>(&json)?));
            match loaded {
                Ok(data) => mines.push(data),
                Err(e) => log::warn!("Skipping mine record {}: {}", path.display(), e),
            }
        }
        Ok(mines)
    }

    /// Remove a saved mine, returning whether a record existed
    pub fn delete_mine(&self, owner: PlayerId) -> Result<bool> {
        match std::fs::remove_file(self.mine_path(owner)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_pregen(&self, records: &[PregenMine]) -> Result<()> {
        let file = PregenFile { records: records.to_vec() };
        let json = serde_json::to_vec_pretty(&file)?;
        atomic_write(&self.root.join(PREGEN_FILENAME), &json)?;
        Ok(())
    }

    /// Saved pregenerated queue, empty when none was saved
    pub fn load_pregen(&self) -> Result<Vec<PregenMine>> {
        let path = self.root.join(PREGEN_FILENAME);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file: PregenFile = serde_json::from_slice(&std::fs::read(&path)?)?;
        Ok(file.records)
    }

    pub fn save_cursor(&self, cursor: IVec2) -> Result<()> {
        let json = serde_json::to_vec(&CursorFile { cursor })?;
        atomic_write(&self.root.join(CURSOR_FILENAME), &json)?;
        Ok(())
    }

    pub fn load_cursor(&self) -> Result<Option<IVec2>> {
        let path = self.root.join(CURSOR_FILENAME);
        if !path.exists() {
            return Ok(None);
        }
        let file: CursorFile = serde_json::from_slice(&std::fs::read(&path)?)?;
        Ok(Some(file.cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::IVec3;
    use crate::math::Region;
    use crate::mine::data::tests::sample_data;
    use tempfile::TempDir;

    #[test]
    fn test_mine_round_trip_and_delete() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let store = MineStore::open(temp_dir.path()).expect("open");
        let owner = PlayerId::new_v4();
        let data = sample_data(owner);

        store.save_mine(&data).expect("save");
        assert_eq!(store.load_mine(owner).expect("load"), Some(data.clone()));
        assert_eq!(store.load_mines().expect("load all"), vec![data]);

        assert!(store.delete_mine(owner).expect("delete"));
        assert!(!store.delete_mine(owner).expect("second delete"));
        assert_eq!(store.load_mine(owner).expect("load"), None);
    }

    #[test]
    fn test_corrupt_record_skipped() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let store = MineStore::open(temp_dir.path()).expect("open");
        store.save_mine(&sample_data(PlayerId::new_v4())).expect("save");
        std::fs::write(temp_dir.path().join("mines").join("broken.json"), "{").expect("write");

        assert_eq!(store.load_mines().expect("load all").len(), 1);
    }

    #[test]
    fn test_pregen_and_cursor() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let store = MineStore::open(temp_dir.path()).expect("open");
        assert!(store.load_pregen().expect("empty queue").is_empty());
        assert_eq!(store.load_cursor().expect("no cursor"), None);

        let record = PregenMine {
            location: IVec3::new(150, 50, 0),
            spawn: IVec3::new(150, 50, 1),
            lower_rails: IVec3::new(137, 48, 5),
            upper_rails: IVec3::new(163, 48, -5),
            full: Region::new(IVec3::new(138, 47, -6), IVec3::new(164, 50, 5)),
        };
        store.save_pregen(std::slice::from_ref(&record)).expect("save queue");
        store.save_cursor(IVec2::new(1, 1)).expect("save cursor");

        let reopened = MineStore::open(temp_dir.path()).expect("reopen");
        assert_eq!(reopened.load_pregen().expect("queue"), vec![record]);
        assert_eq!(reopened.load_cursor().expect("cursor"), Some(IVec2::new(1, 1)));
    }
}
