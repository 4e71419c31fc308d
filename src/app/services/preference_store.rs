use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::app::domain::config::config_dir;
use crate::app::domain::preferences::{PreferenceUpdate, Preferences};
use crate::app::infrastructure::error::AppError;

/// Raw storage for one JSON blob (preferences, account).
pub trait StorageBackend {
    /// The stored blob, `None` when nothing has been stored yet.
    fn read(&self) -> io::Result<Option<String>>;

    fn write(&self, contents: &str) -> io::Result<()>;
}

/// A JSON blob on disk. Defaults to `guide.json` in the app config directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> PathBuf {
        let mut path = config_dir();
        path.push("guide.json");
        path
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileBackend {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

impl StorageBackend for FileBackend {
    fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, contents)
    }
}

/// In-process storage, for headless runs and tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    contents: RefCell<Option<String>>,
}

impl MemoryBackend {
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: RefCell::new(Some(contents.into())),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.contents.borrow().clone())
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        *self.contents.borrow_mut() = Some(contents.to_string());
        Ok(())
    }
}

pub struct PreferenceStore<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> PreferenceStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Current preferences. Empty, unreadable or corrupt storage yields the
    /// defaults; nothing is propagated past this point.
    pub fn load(&self) -> Preferences {
        match self.backend.read() {
            Ok(Some(raw)) => match Preferences::from_stored(&raw) {
                Ok(prefs) => prefs,
                Err(e) => {
                    warn!("Failed to load guide preferences: {}", e);
                    Preferences::default()
                }
            },
            Ok(None) => Preferences::default(),
            Err(e) => {
                warn!("Guide preferences are not accessible: {}", e);
                Preferences::default()
            }
        }
    }

    /// Merge `update` into the stored preferences and write them back before
    /// returning. Returns the merged result.
    pub fn save(&self, update: PreferenceUpdate) -> Result<Preferences, AppError> {
        let mut prefs = self.load();
        prefs.apply(update);

        let json = serde_json::to_string(&prefs)?;
        self.backend.write(&json)?;
        debug!(lang = ?prefs.language_id, theme = prefs.theme.as_str(), "saved guide preferences");

        Ok(prefs)
    }
}
