//! # Profile Store
//!
//! Where the user's record and stage preferences live between sessions.
//!
//! The game only needs two operations: read the profile at startup and
//! write it back when a stage beats the record. Saves go through a
//! temporary file and a rename, so a crash mid-write leaves the previous
//! profile intact.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use mirrorplay_shared::UserProfile;

use crate::error::{SessionError, SessionResult};

/// Persistent storage for one user profile.
pub trait ProfileStore: Send {
    /// Reads the stored profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read or parsed.
    fn load(&self) -> SessionResult<UserProfile>;

    /// Replaces the stored profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, profile: &UserProfile) -> SessionResult<()>;
}

/// In-memory store. Clones share the same profile.
#[derive(Clone, Debug)]
pub struct MemoryProfileStore {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug)]
struct MemoryInner {
    profile: UserProfile,
    saves: u32,
}

impl MemoryProfileStore {
    /// Creates a store holding `profile`.
    #[must_use]
    pub fn new(profile: UserProfile) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryInner { profile, saves: 0 })),
        }
    }

    /// Current stored profile.
    #[must_use]
    pub fn snapshot(&self) -> UserProfile {
        self.inner.lock().profile.clone()
    }

    /// Number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> u32 {
        self.inner.lock().saves
    }
}

impl Default for MemoryProfileStore {
    fn default() -> Self {
        Self::new(UserProfile::new("player"))
    }
}

impl ProfileStore for MemoryProfileStore {
    fn load(&self) -> SessionResult<UserProfile> {
        Ok(self.snapshot())
    }

    fn save(&self, profile: &UserProfile) -> SessionResult<()> {
        let mut inner = self.inner.lock();
        inner.profile = profile.clone();
        inner.saves += 1;
        Ok(())
    }
}

/// One TOML file per profile.
#[derive(Clone, Debug)]
pub struct TomlProfileStore {
    path: PathBuf,
    default_name: String,
}

impl TomlProfileStore {
    /// Store backed by `path`. A missing file loads as a fresh profile named
    /// `default_name`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, default_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            default_name: default_name.into(),
        }
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> SessionError {
        SessionError::ProfileIo { path: path.to_path_buf(), source }
    }
}

impl ProfileStore for TomlProfileStore {
    fn load(&self) -> SessionResult<UserProfile> {
        match fs::read_to_string(&self.path) {
            Ok(text) => {
                let mut profile: UserProfile = toml::from_str(&text)?;
                if profile.name.trim().is_empty() {
                    profile.name.clone_from(&self.default_name);
                }
                Ok(profile)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No profile at {}, starting fresh", self.path.display());
                Ok(UserProfile::new(self.default_name.clone()))
            }
            Err(e) => Err(self.io_error(&self.path, e)),
        }
    }

    fn save(&self, profile: &UserProfile) -> SessionResult<()> {
        let text = toml::to_string_pretty(profile)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| self.io_error(dir, e))?;
        }
        let temp = self.temp_path();
        fs::write(&temp, text).map_err(|e| self.io_error(&temp, e))?;
        fs::rename(&temp, &self.path).map_err(|e| self.io_error(&self.path, e))?;
        tracing::debug!("Profile saved to {}", self.path.display());
        Ok(())
    }
}
