/// JSON file storage: the local, single-file medium
///
/// The collection lives in `<dir>/habits.json` as a JSON array of stored
/// habits. Writes go to a temporary file in the same directory that is
/// then renamed over the old one, so a crash never leaves half a file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::domain::Habit;
use crate::storage::{habits_from_stored, HabitStorage, StorageError, StoredHabit, HABITS_KEY};

pub struct JsonFileStorage {
    dir: PathBuf,
    path: PathBuf,
}

impl JsonFileStorage {
    /// Use `dir` as the data directory, creating it if needed
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.json", HABITS_KEY));

        Ok(Self { dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HabitStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<Vec<Habit>>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)?;
        let stored: Vec<StoredHabit> = serde_json::from_str(&contents)?;
        Ok(Some(habits_from_stored(stored)))
    }

    fn save(&self, habits: &[Habit]) -> Result<(), StorageError> {
        let stored: Vec<StoredHabit> = habits.iter().map(StoredHabit::from).collect();
        let json = serde_json::to_string(&stored)?;

        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(json.as_bytes())?;
        temp.flush()?;
        temp.persist(&self.path)?;

        tracing::debug!("Saved {} habits to {}", habits.len(), self.path.display());
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
