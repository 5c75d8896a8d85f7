use std::path::PathBuf;
use std::process::Command;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use dlhook::sink::HookSink;
use dlhook::{HookError, RecordingSink};

/// Builds the `blort` unit for this test profile and returns its path.
pub fn unit_library() -> PathBuf {
    static LIBRARY: OnceLock<PathBuf> = OnceLock::new();

    LIBRARY
        .get_or_init(|| {
            let mut cargo = Command::new(env!("CARGO"));
            cargo
                .current_dir(env!("CARGO_MANIFEST_DIR"))
                .args(["build", "--quiet", "-p", "blort"]);
            if !cfg!(debug_assertions) {
                cargo.arg("--release");
            }

            let status = cargo.status().expect("cannot run cargo");
            assert!(status.success(), "building the blort unit failed");

            // target/<profile>/deps/<test> -> target/<profile>
            let exe = std::env::current_exe().unwrap();
            let profile_dir = exe.parent().and_then(|deps| deps.parent()).unwrap();
            profile_dir.join(format!(
                "{}blort{}",
                std::env::consts::DLL_PREFIX,
                std::env::consts::DLL_SUFFIX
            ))
        })
        .clone()
}

/// Serializes tests that load the unit.
#[allow(dead_code)]
pub fn serial() -> MutexGuard<'static, ()> {
    static SERIAL: Mutex<()> = Mutex::new(());
    SERIAL.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A recording sink plus a handle that can be given to `Host::load`.
#[allow(dead_code)]
pub fn recording() -> (Arc<RecordingSink>, impl HookSink + 'static) {
    let sink = Arc::new(RecordingSink::new());
    let handle = Arc::clone(&sink);
    (sink, move |message: &str| -> Result<(), HookError> {
        handle.hook(message)
    })
}
