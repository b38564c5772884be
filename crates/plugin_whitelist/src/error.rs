//! Error types for the whitelist gate

use std::{io::Error as IoError, path::PathBuf};
use thiserror::Error;

/// Backing store errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read file {0}: {1}")]
    FileRead(PathBuf, IoError),

    #[error("Failed to create file {0}: {1}")]
    FileCreate(PathBuf, IoError),

    #[error("Failed to write to file {0}: {1}")]
    FileWrite(PathBuf, IoError),

    #[error("Failed to sync file {0}: {1}")]
    FileSync(PathBuf, IoError),

    #[error("Failed to rename file from {0} to {1}: {2}")]
    FileRename(PathBuf, PathBuf, IoError),

    #[error("Failed to create directory {0}: {1}")]
    DirectoryCreate(PathBuf, IoError),
}

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown gate mode {0} (expected 1 = allow-list or 2 = deny-list)")]
    UnknownMode(u8),

    #[error("Required setting `{0}` is empty")]
    MissingField(&'static str),

    #[error("Command name `{0}` is used by more than one command")]
    CommandNameClash(String),

    #[error("Failed to read configuration {0}: {1}")]
    Read(PathBuf, IoError),

    #[error("Failed to write configuration {0}: {1}")]
    Write(PathBuf, IoError),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Top-level gate error
#[derive(Debug, Error)]
pub enum GateError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type StorageResult<T> = Result<T, StorageError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type GateResult<T> = Result<T, GateError>;
