//! Per-session context.
//!
//! A `SessionContext` carries everything a command needs across invocations:
//! the resolved settings and the ids of the last uploaded file and last created
//! job. The CLI builds one only for the `files` and `jobs` commands.

use crate::config::Settings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use tuner_abstraction::normalize_id;

/// Errors that can occur while resolving session state.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No API key configured. Run `tuner settings set --api-key <KEY>` or set OPENAI_API_KEY.")]
    MissingApiKey,

    #[error("No training file id given and no file has been uploaded in this session. Run `tuner files upload` first.")]
    NoTrainingFile,

    #[error("No job id given and no job has been created in this session.")]
    NoJob,

    #[error("Failed to access session state {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse session state {path}: {message}")]
    Parse { path: String, message: String },
}

/// Result type for session operations.
pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Ids remembered between invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_job_id: Option<String>,
}

impl SessionState {
    /// Read saved state. A missing file is a fresh session; an unreadable or
    /// corrupt one is logged and replaced on the next save.
    fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable session state");
                return Self::default();
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Ignoring corrupt session state");
            Self::default()
        })
    }

    fn save(&self, path: &Path) -> SessionResult<()> {
        let io_err = |e: std::io::Error| SessionError::Io { path: path.display().to_string(), message: e.to_string() };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SessionError::Parse { path: path.display().to_string(), message: e.to_string() })?;
        std::fs::write(path, json).map_err(io_err)
    }
}

/// Settings plus remembered ids for one user session.
#[derive(Debug, Clone)]
pub struct SessionContext {
    settings: Settings,
    state: SessionState,
    state_path: PathBuf,
}

impl SessionContext {
    /// Default location of the session state file, relative to the working directory.
    pub fn default_state_path() -> PathBuf {
        PathBuf::from(".tuner").join("session.json")
    }

    /// Build a context, loading any state saved at `state_path`.
    pub fn new(settings: Settings, state_path: PathBuf) -> Self {
        let state = SessionState::load(&state_path);
        debug!(
            path = %state_path.display(),
            has_file = state.last_file_id.is_some(),
            has_job = state.last_job_id.is_some(),
            "Loaded session state"
        );
        Self { settings, state, state_path }
    }

    /// Build a context from `settings` and the default state file.
    pub fn open(settings: Settings) -> Self {
        Self::new(settings, Self::default_state_path())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Dataset file, preferring an explicit path over the configured one.
    pub fn dataset_path(&self, explicit: Option<&Path>) -> PathBuf {
        explicit.map_or_else(|| self.settings.dataset_path(), Path::to_path_buf)
    }

    /// Remember the id of a freshly uploaded training file.
    pub fn record_upload(&mut self, file_id: &str) -> SessionResult<()> {
        self.state.last_file_id = Some(normalize_id(file_id));
        self.state.save(&self.state_path)
    }

    /// Remember the id of a freshly created job.
    pub fn record_job(&mut self, job_id: &str) -> SessionResult<()> {
        self.state.last_job_id = Some(normalize_id(job_id));
        self.state.save(&self.state_path)
    }

    /// Training file for a new job: the explicit id, else the last upload.
    pub fn resolve_training_file(&self, explicit: Option<&str>) -> SessionResult<String> {
        Self::resolve(explicit, self.state.last_file_id.as_deref()).ok_or(SessionError::NoTrainingFile)
    }

    /// Job to act on: the explicit id, else the last created job.
    pub fn resolve_job_id(&self, explicit: Option<&str>) -> SessionResult<String> {
        Self::resolve(explicit, self.state.last_job_id.as_deref()).ok_or(SessionError::NoJob)
    }

    fn resolve(explicit: Option<&str>, remembered: Option<&str>) -> Option<String> {
        explicit
            .map(normalize_id)
            .filter(|id| !id.is_empty())
            .or_else(|| remembered.map(normalize_id).filter(|id| !id.is_empty()))
    }
}
