//! A unit that calls its host's `hook` once when loaded and once per `run()`.
//!
//! The host must export `void hook(const char *)` into the global symbol
//! scope (an executable linked with `-rdynamic`, or a library loaded with
//! `RTLD_GLOBAL`). If it cannot be resolved, the initializer records
//! `InitStatus::HookMissing` and every message is dropped.

use std::ffi::{c_char, c_int, CStr};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::OnceLock;

use dlhook::abi::{self, HookFn, InitStatus};
use libloading::os::unix::Library;

static HOOK: OnceLock<Option<HookFn>> = OnceLock::new();
static INIT_STATUS: AtomicI32 = AtomicI32::new(InitStatus::Pending as i32);

fn resolve_hook() -> Option<HookFn> {
    *HOOK.get_or_init(|| {
        let this = Library::this();
        let hook = unsafe { this.get::<HookFn>(abi::HOOK_SYMBOL.as_bytes()) };
        hook.ok().map(|hook| *hook)
    })
}

fn deliver(message: &CStr) -> bool {
    match resolve_hook() {
        Some(hook) => {
            unsafe { hook(message.as_ptr()) };
            true
        }
        None => false,
    }
}

extern "C" fn init(_argc: c_int, _argv: *const *const c_char, _envp: *const *const c_char) {
    let status = if deliver(abi::INIT_MESSAGE_C) {
        InitStatus::Delivered
    } else {
        InitStatus::HookMissing
    };
    INIT_STATUS.store(status.as_raw(), Ordering::SeqCst);
}

#[used]
#[cfg_attr(any(target_os = "linux", target_os = "android"), link_section = ".init_array")]
#[cfg_attr(target_vendor = "apple", link_section = "__DATA,__mod_init_func")]
static INITIALIZE: extern "C" fn(c_int, *const *const c_char, *const *const c_char) = init;

#[no_mangle]
pub extern "C" fn run() {
    deliver(abi::RUN_MESSAGE_C);
}

#[no_mangle]
pub extern "C" fn blort_init_status() -> c_int {
    INIT_STATUS.load(Ordering::SeqCst)
}
