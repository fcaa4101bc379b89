//! Settings resolution from the process environment and a `.env` file.
//!
//! Values are held in an explicit [`Settings`] object rather than being
//! exported into the process environment. Whatever was read from the settings
//! file is handed to child processes explicitly (see
//! [`Settings::file_values`]).

use std::collections::HashMap;
use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, info};

use crate::error::{Error, Result};

/// File name looked up in the current directory and its ancestors when no
/// explicit settings file is given.
pub const DEFAULT_ENV_FILE: &str = ".env";

#[derive(Debug, Clone, Default)]
pub struct Settings {
    process_values: HashMap<String, String>,
    file_values: IndexMap<String, String>,
    searched: Option<PathBuf>,
}

impl Settings {
    /// Settings backed only by a snapshot of the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are left out, so they
    /// read as unset.
    #[must_use]
    pub fn from_process_env() -> Self {
        let process_values = env::vars_os()
            .filter_map(|(key, value)| {
                let pair = key.into_string().ok().zip(value.into_string().ok());
                if pair.is_none() {
                    debug!("Ignoring an environment variable that is not valid UTF-8");
                }
                pair
            })
            .collect();

        Self {
            process_values,
            ..Self::default()
        }
    }

    /// Settings made of the given pairs, as if they had been read from a file.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            file_values: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
            ..Self::default()
        }
    }

    /// Loads settings from the process environment overlaid with a settings file.
    ///
    /// With an explicit `env_file`, that file must exist. Without one, `.env` is
    /// searched for from the current directory upwards and silently skipped if
    /// none is found. Values in the file always win over the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit file does not exist or any settings file
    /// cannot be parsed.
    pub fn load(env_file: Option<&Path>) -> Result<Self> {
        let mut settings = Self::from_process_env();

        match env_file {
            Some(path) => {
                let iter = dotenvy::from_path_iter(path).map_err(|e| {
                    if e.not_found() {
                        Error::SettingsFileNotFound(path.to_path_buf())
                    } else {
                        settings_file_error(&path.display().to_string(), e)
                    }
                })?;
                settings.overlay(iter, &path.display().to_string())?;
                settings.searched = Some(path.to_path_buf());
                info!("Loaded settings from `{}`", path.display());
            }
            None => match dotenvy::from_filename_iter(DEFAULT_ENV_FILE) {
                Ok(iter) => {
                    settings.overlay(iter, DEFAULT_ENV_FILE)?;
                    info!("Loaded settings from `{DEFAULT_ENV_FILE}`");
                }
                Err(e) if e.not_found() => {
                    debug!("No `{DEFAULT_ENV_FILE}` found, using the process environment only");
                }
                Err(e) => return Err(settings_file_error(DEFAULT_ENV_FILE, e)),
            },
        }

        Ok(settings)
    }

    fn overlay(&mut self, iter: dotenvy::Iter<File>, path: &str) -> Result<()> {
        for item in iter {
            let (key, value) = item.map_err(|e| settings_file_error(path, e))?;
            debug!("Settings file defines `{key}`");
            self.file_values.insert(key, value);
        }

        Ok(())
    }

    /// Returns the trimmed value of `name`, or `None` if it is unset or blank.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.file_values
            .get(name)
            .or_else(|| self.process_values.get(name))
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Resolves every required name, failing with all missing names at once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSettings`] listing, in request order, each name
    /// that is absent or blank.
    pub fn require<S: AsRef<str>>(&self, names: &[S]) -> Result<IndexMap<String, String>> {
        let mut values = IndexMap::new();
        let mut missing = Vec::new();

        for name in names {
            let name = name.as_ref();
            match self.get(name) {
                Some(value) => {
                    values.insert(name.to_string(), value.to_string());
                }
                None => missing.push(name.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(Error::missing_settings(missing, self.searched.clone()));
        }

        Ok(values)
    }

    /// Values read from the settings file, in file order.
    #[must_use]
    pub fn file_values(&self) -> &IndexMap<String, String> {
        &self.file_values
    }

    /// The explicit settings file that was read, if any.
    #[must_use]
    pub fn searched(&self) -> Option<&Path> {
        self.searched.as_deref()
    }
}

fn settings_file_error(path: &str, original: dotenvy::Error) -> Error {
    Error::SettingsFile {
        path: path.to_string(),
        original,
    }
}
