//! C ABI shared between a host and a loadable unit.

use std::ffi::{c_char, c_int, CStr};

/// Symbol the host exports and the unit calls.
pub const HOOK_SYMBOL: &str = "hook";
/// Symbol the unit exports for on-demand invocation.
pub const RUN_SYMBOL: &str = "run";
/// Symbol the unit exports to report what its initializer did.
pub const INIT_STATUS_SYMBOL: &str = "blort_init_status";

pub const INIT_MESSAGE: &str = "init() called inside blort.";
pub const RUN_MESSAGE: &str = "run() called inside blort.";

pub const INIT_MESSAGE_C: &CStr = c"init() called inside blort.";
pub const RUN_MESSAGE_C: &CStr = c"run() called inside blort.";

/// `void hook(const char *)`
pub type HookFn = unsafe extern "C" fn(*const c_char);
/// `void run(void)`
pub type RunFn = unsafe extern "C" fn();
/// `int blort_init_status(void)`
pub type InitStatusFn = unsafe extern "C" fn() -> c_int;

/// Outcome of a unit's load-time initializer.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStatus {
    /// The initializer has not run.
    Pending = 0,
    /// The init message was handed to `hook`.
    Delivered = 1,
    /// `hook` could not be resolved when the initializer ran.
    HookMissing = 2,
}

impl InitStatus {
    pub fn from_raw(raw: c_int) -> Option<Self> {
        match raw {
            0 => Some(InitStatus::Pending),
            1 => Some(InitStatus::Delivered),
            2 => Some(InitStatus::HookMissing),
            _ => None,
        }
    }

    pub fn as_raw(self) -> c_int {
        self as c_int
    }
}
