use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
    sync::{
        Arc,
        Mutex,
    },
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::core::LanguageToolsError;

const APP_NAME: &str = "languagetools";
pub const CONFIG_FILENAME: &str = "config.json";

pub fn get_app_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        let app_dir = data_dir.join(APP_NAME);
        let _ = fs::create_dir_all(&app_dir);
        app_dir
    } else {
        PathBuf::from(".")
    }
}

pub fn get_data_file_path(filename: &str) -> PathBuf {
    get_app_data_dir().join(filename)
}

pub fn save_json<T: Serialize>(data: &T, file_path: &Path) -> Result<(), LanguageToolsError> {
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(data)?;
    fs::write(file_path, json)?;
    tracing::debug!(path = %file_path.display(), "Data saved");
    Ok(())
}

pub fn load_json<T: for<'de> Deserialize<'de> + Default>(
    file_path: &Path,
) -> Result<T, LanguageToolsError> {
    if !file_path.exists() {
        return Ok(T::default());
    }

    let json = fs::read_to_string(file_path)?;
    let data: T = serde_json::from_str(&json)?;
    tracing::debug!(path = %file_path.display(), "Data loaded");
    Ok(data)
}

/// Where a configuration value lives between runs. Every `write` is
/// synchronous: the value is on disk (or in memory) when it returns.
pub trait ConfigStore<T>: Send {
    fn load(&self) -> Result<T, LanguageToolsError>;
    fn write(&mut self, data: &T) -> Result<(), LanguageToolsError>;
}

/// Pretty JSON on disk. A missing file loads as the default value.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `config.json` in the per-user data directory.
    pub fn default_location() -> Self {
        Self::new(get_data_file_path(CONFIG_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T> ConfigStore<T> for JsonFileStore
where
    T: Serialize + for<'de> Deserialize<'de> + Default,
{
    fn load(&self) -> Result<T, LanguageToolsError> {
        load_json(&self.path)
    }

    fn write(&mut self, data: &T) -> Result<(), LanguageToolsError> {
        save_json(data, &self.path)
    }
}

/// Keeps the last written value. Clones share state, so a test can hold one
/// handle and give the other away.
#[derive(Debug, Clone)]
pub struct MemoryStore<T> {
    inner: Arc<Mutex<MemoryStoreState<T>>>,
}

#[derive(Debug)]
struct MemoryStoreState<T> {
    data: T,
    writes: usize,
}

impl<T: Clone + Default> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone> MemoryStore<T> {
    pub fn new(data: T) -> Self {
        Self { inner: Arc::new(Mutex::new(MemoryStoreState { data, writes: 0 })) }
    }

    pub fn write_count(&self) -> usize {
        self.inner.lock().map(|state| state.writes).unwrap_or_default()
    }

    pub fn snapshot(&self) -> Option<T> {
        self.inner.lock().ok().map(|state| state.data.clone())
    }
}

impl<T: Clone + Send> ConfigStore<T> for MemoryStore<T> {
    fn load(&self) -> Result<T, LanguageToolsError> {
        self.inner
            .lock()
            .map(|state| state.data.clone())
            .map_err(|e| LanguageToolsError::Custom(format!("Memory store poisoned: {e}")))
    }

    fn write(&mut self, data: &T) -> Result<(), LanguageToolsError> {
        let mut state = self
            .inner
            .lock()
            .map_err(|e| LanguageToolsError::Custom(format!("Memory store poisoned: {e}")))?;
        state.data = data.clone();
        state.writes += 1;
        Ok(())
    }
}
