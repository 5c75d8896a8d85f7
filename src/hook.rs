//! Host-side end of the `hook` symbol.
//!
//! A unit calls the host's exported `hook` with a C string; the host forwards
//! it here. A unit's initializer and its `run` execute synchronously on the
//! thread that loads or calls it, so the sink is bound per thread for the
//! duration of that call with [`with_sink`]. Sink failures cannot cross the
//! C ABI and are parked for the same thread.

use std::cell::RefCell;
use std::ffi::{c_char, CStr};
use std::sync::Arc;

use crate::error::HookError;
use crate::sink::HookSink;

thread_local! {
    static ACTIVE: RefCell<Option<Arc<dyn HookSink>>> = const { RefCell::new(None) };
    static LAST_FAILURE: RefCell<Option<HookError>> = const { RefCell::new(None) };
}

/// Restores the previously active sink, also on unwind.
struct Restore(Option<Arc<dyn HookSink>>);

impl Drop for Restore {
    fn drop(&mut self) {
        let previous = self.0.take();
        ACTIVE.with(|active| *active.borrow_mut() = previous);
    }
}

/// Runs `f` with `sink` receiving every message dispatched on this thread.
///
/// Calls nest: the outer sink is active again once `f` returns.
pub fn with_sink<T>(sink: &Arc<dyn HookSink>, f: impl FnOnce() -> T) -> T {
    let previous = ACTIVE.with(|active| active.replace(Some(Arc::clone(sink))));
    let _restore = Restore(previous);
    f()
}

/// Whether a sink is bound on this thread.
pub fn active() -> bool {
    ACTIVE.with(|active| active.borrow().is_some())
}

/// Takes the last sink failure seen on this thread, clearing it.
pub fn take_failure() -> Option<HookError> {
    LAST_FAILURE.with(|failure| failure.borrow_mut().take())
}

fn park(failure: HookError) {
    LAST_FAILURE.with(|slot| *slot.borrow_mut() = Some(failure));
}

/// Hands a unit's message to the sink bound on this thread.
///
/// With no sink bound the message is dropped and a failure parked, so the
/// caller of `run` learns it went nowhere.
///
/// # Safety
/// `message` must be null or point to a NUL-terminated string that stays
/// valid for the duration of the call.
pub unsafe fn dispatch(message: *const c_char) {
    if message.is_null() {
        warn!("[HOOK] called with a null message, ignoring");
        return;
    }

    let message = CStr::from_ptr(message).to_string_lossy();
    let sink = ACTIVE.with(|active| active.borrow().clone());

    let Some(sink) = sink else {
        warn!("[HOOK] no sink on this thread, dropping: {}", message);
        park(HookError::new(format!("no sink to receive {:?}", message)));
        return;
    };

    debug!("[HOOK] {}", message);
    if let Err(e) = sink.hook(&message) {
        error!("[HOOK] sink failed on {:?}: {}", message, e);
        park(e);
    }
}
