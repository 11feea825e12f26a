//! Configuration for Tuner.

pub mod settings;

pub use settings::{Settings, SettingsError, SettingsResult, SettingsStore, DEFAULT_DATASET_PATH};
