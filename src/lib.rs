#[macro_use]
extern crate log;

pub mod abi;
pub mod elf;
pub mod error;
pub mod hook;
mod macros;
pub mod proc;
pub mod sink;
pub mod unit;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::os::unix;
use libloading::Library;

use crate::abi::{InitStatus, InitStatusFn, RunFn};
use crate::elf::UnitImage;
use crate::error::LoadError;
use crate::proc::maps::Mapping;
use crate::proc::Proc;
use crate::sink::HookSink;

pub use crate::error::HookError;
pub use crate::sink::{LogSink, RecordingSink};
pub use crate::unit::LoadableUnit;

/// Loads a unit shared library into this process.
///
/// The unit's initializer runs inside `dlopen` and calls back into the host's
/// exported `hook` (see [`export_hook!`]), which routes to the sink passed to
/// [`Host::load`]. Each loaded unit keeps its own sink.
#[derive(Debug)]
pub struct Host {
    file_path: Option<PathBuf>,
    verify: bool,
}

impl Host {
    pub fn new() -> Host {
        Host {
            file_path: None,
            verify: true,
        }
    }

    pub fn set_file_path(&mut self, file_path: impl Into<PathBuf>) -> Result<&mut Self, LoadError> {
        let file_path = file_path.into();
        if !file_path.is_file() {
            error!("File not found: {}", file_path.display());
            return Err(LoadError::FileNotFound(file_path));
        }

        self.file_path = Some(file_path);
        Ok(self)
    }

    /// Loads without inspecting the ELF image first.
    pub fn skip_verification(&mut self) -> &mut Self {
        self.verify = false;
        self
    }

    /// Loads the unit with `sink` receiving its messages.
    ///
    /// The load fails if the unit is already loaded in this process (its
    /// initializer would not run again), if the initializer could not resolve
    /// `hook` or did not run, or if `sink` failed on the init message. On
    /// failure the unit is unloaded again.
    pub fn load<S: HookSink + 'static>(&self, sink: S) -> Result<LoadedUnit, LoadError> {
        let file_path = self.file_path.as_deref().ok_or(LoadError::NoFilePath)?;
        info!("[HOST][LOAD] {}", file_path.display());

        if self.verify {
            let image = UnitImage::inspect(file_path)?;
            image.require(&[abi::RUN_SYMBOL, abi::INIT_STATUS_SYMBOL])?;
            debug!("[HOST][LOAD] soname: {:?}", image.soname());
        } else {
            warn!("skipping ELF verification");
        }

        if already_loaded(file_path) {
            error!("{} is already loaded", file_path.display());
            return Err(LoadError::AlreadyLoaded(file_path.to_path_buf()));
        }

        let sink: Arc<dyn HookSink> = Arc::new(sink);
        Self::open(file_path, sink)
    }

    fn open(file_path: &Path, sink: Arc<dyn HookSink>) -> Result<LoadedUnit, LoadError> {
        let (library, failure) = hook::with_sink(&sink, || {
            hook::take_failure();
            // init() runs here
            let library = unsafe { Library::new(file_path) };
            (library, hook::take_failure())
        });
        let library = library?;

        if let Some(failure) = failure {
            return Err(LoadError::InitFailed(failure));
        }

        let init_status: InitStatusFn =
            unsafe { *library.get::<InitStatusFn>(abi::INIT_STATUS_SYMBOL.as_bytes())? };
        let raw = unsafe { init_status() };
        match InitStatus::from_raw(raw) {
            Some(InitStatus::Delivered) => {}
            Some(InitStatus::HookMissing) => return Err(LoadError::HookUnresolved),
            Some(InitStatus::Pending) => return Err(LoadError::InitNotRun),
            None => return Err(LoadError::UnknownInitStatus(raw)),
        }

        let run: RunFn = unsafe { *library.get::<RunFn>(abi::RUN_SYMBOL.as_bytes())? };

        let mapping = match Proc::current().maps().and_then(|maps| maps.find(file_path)) {
            Ok(mapping) => {
                info!("[HOST][LOAD] mapped at 0x{:x} (0x{:x} bytes)", mapping.base, mapping.size);
                Some(mapping)
            }
            Err(e) => {
                warn!("cannot locate mapping: {}", e);
                None
            }
        };

        info!("[HOST][LOAD] done.");
        Ok(LoadedUnit {
            path: file_path.to_path_buf(),
            mapping,
            run,
            sink,
            _library: library,
        })
    }
}

/// Whether `file_path` is already mapped by the dynamic loader.
fn already_loaded(file_path: &Path) -> bool {
    let flags = libc::RTLD_NOLOAD | libc::RTLD_LAZY;
    // Succeeds only for an already loaded image; the handle is closed on drop.
    unsafe { unix::Library::open(Some(file_path), flags) }.is_ok()
}

impl Default for Host {
    fn default() -> Self {
        Host::new()
    }
}

/// A unit whose initializer has delivered its message.
///
/// Its `run` always reports to the sink it was loaded with. Dropping it
/// unloads the library.
pub struct LoadedUnit {
    path: PathBuf,
    mapping: Option<Mapping>,
    run: RunFn,
    sink: Arc<dyn HookSink>,
    _library: Library,
}

impl LoadedUnit {
    /// Calls the unit's `run`, surfacing a sink failure on this thread.
    pub fn run(&self) -> Result<(), LoadError> {
        let failure = hook::with_sink(&self.sink, || {
            hook::take_failure();
            unsafe { (self.run)() };
            hook::take_failure()
        });

        match failure {
            Some(failure) => Err(LoadError::RunFailed(failure)),
            None => Ok(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mapping(&self) -> Option<&Mapping> {
        self.mapping.as_ref()
    }
}

impl Drop for LoadedUnit {
    fn drop(&mut self) {
        debug!("[HOST][UNLOAD] {}", self.path.display());
    }
}

impl std::fmt::Debug for LoadedUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedUnit")
            .field("path", &self.path)
            .field("mapping", &self.mapping)
            .finish()
    }
}
