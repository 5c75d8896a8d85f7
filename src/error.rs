use std::io::Error as IoError;
use std::path::PathBuf;

use thiserror::Error;

/// A hook sink failed to take a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("hook sink failed: {reason}")]
pub struct HookError {
    reason: String,
}

impl HookError {
    pub fn new(reason: impl Into<String>) -> Self {
        HookError {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no file path set")]
    NoFilePath,

    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("cannot read {}: {source}", path.display())]
    FileError {
        path: PathBuf,
        #[source]
        source: IoError,
    },

    #[error("not an ELF image: {0}")]
    NotElf(String),

    #[error("{} is not a shared object", .0.display())]
    NotSharedObject(PathBuf),

    #[error("unsupported architecture (e_machine 0x{0:x})")]
    UnsupportedArch(u16),

    #[error("missing exported symbol `{0}`")]
    MissingSymbol(String),

    #[error("dynamic loader: {0}")]
    Dl(#[from] libloading::Error),

    #[error("{} is already loaded in this process", .0.display())]
    AlreadyLoaded(PathBuf),

    #[error("`hook` was not resolvable when the unit initialized")]
    HookUnresolved,

    #[error("unit initializer did not run")]
    InitNotRun,

    #[error("unit reported unknown init status {0}")]
    UnknownInitStatus(i32),

    #[error("init() failed: {0}")]
    InitFailed(#[source] HookError),

    #[error("run() failed: {0}")]
    RunFailed(#[source] HookError),

    #[error("cannot read process maps: {0}")]
    ProcessMaps(#[source] IoError),

    #[error("{} is not mapped in this process", .0.display())]
    ModuleNotMapped(PathBuf),
}
