use crate::{ConfigFile, VertexConfig, VertexError, VertexResult};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

const DEFAULT_CONFIG_DIR: &str = "config";

/// JSON config files in a single directory.
///
/// There is no locking: two writers to the same file race and the last one
/// wins.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_DIR)
    }
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `{unix_timestamp}_{prefix}.json`
    #[must_use]
    pub fn timestamped_name(prefix: &str) -> String {
        format!("{}_{prefix}.json", chrono::Utc::now().timestamp())
    }

    /// `vertex_config_{unix_timestamp}.json`
    #[must_use]
    pub fn generated_vertex_config_name() -> String {
        format!("vertex_config_{}.json", chrono::Utc::now().timestamp())
    }

    /// Resolve `name` inside the config directory. Absolute names are used
    /// as-is so a path echoed back from [`ConfigStore::save`] loads again.
    pub fn path_of(&self, name: &str) -> VertexResult<PathBuf> {
        let name = name.trim();
        if name.is_empty() {
            return Err(VertexError::InvalidInput(
                "Config file name must not be empty".to_string(),
            ));
        }
        let path = Path::new(name);
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(self.dir.join(path))
        }
    }

    /// Read a config file. A missing file is an empty config.
    pub fn load(&self, name: &str) -> VertexResult<ConfigFile> {
        let path = self.path_of(name)?;
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file not found");
                return Ok(ConfigFile::default());
            }
            Err(error) => return Err(error.into()),
        };

        let config: ConfigFile = serde_json::from_str(&contents)
            .map_err(|e| VertexError::ConfigParse(path.display().to_string(), e.to_string()))?;
        if let Some(generation_config) = &config.generation_config {
            generation_config.validate().map_err(|e| {
                VertexError::ConfigParse(path.display().to_string(), e.to_string())
            })?;
        }
        Ok(config)
    }

    /// Write `data` as pretty-printed JSON, replacing any existing file.
    /// Returns the absolute path written.
    pub fn save(&self, name: &str, data: &ConfigFile) -> VertexResult<PathBuf> {
        let path = self.path_of(name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(data)
            .map_err(|e| VertexError::InvalidInput(format!("Failed to serialize config: {e}")))?;
        fs::write(&path, contents)?;

        let path = fs::canonicalize(&path).unwrap_or(path);
        tracing::info!(path = %path.display(), "saved config file");
        Ok(path)
    }

    /// Replace the `vertex_config` section of a file, keeping everything
    /// else it holds.
    pub fn update_vertex_config(
        &self,
        name: &str,
        vertex_config: &VertexConfig,
    ) -> VertexResult<PathBuf> {
        let mut data = self.load(name)?;
        data.vertex_config = Some(vertex_config.clone());
        self.save(name, &data)
    }

    /// Names of all `*.json` files in the directory, symlinks included,
    /// sorted descending. Names usually start with a timestamp, so this is
    /// newest first.
    pub fn list(&self) -> VertexResult<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(error.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.path().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(".json") {
                    names.push(name.to_string());
                }
            }
        }
        names.sort_unstable_by(|a, b| b.cmp(a));
        Ok(names)
    }
}
