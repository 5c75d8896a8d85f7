//! In-process loadable unit with an explicit initialization contract.
//!
//! [`LoadableUnit::load`] is the one and only initializer: a `LoadableUnit`
//! value exists only once the init message has been delivered, so `run`
//! cannot be reached before init.

use crate::abi::{INIT_MESSAGE, RUN_MESSAGE};
use crate::error::HookError;
use crate::sink::HookSink;

#[derive(Debug)]
pub struct LoadableUnit<S: HookSink> {
    sink: S,
}

impl<S: HookSink> LoadableUnit<S> {
    /// Loads the unit, handing the init message to `sink`.
    ///
    /// A sink failure fails the load and is returned unchanged.
    pub fn load(sink: S) -> Result<Self, HookError> {
        debug!("[UNIT][LOAD] delivering init message");
        sink.hook(INIT_MESSAGE)?;
        Ok(LoadableUnit { sink })
    }

    pub fn run(&self) -> Result<(), HookError> {
        self.sink.hook(RUN_MESSAGE)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Unloads the unit. No teardown message is sent.
    pub fn into_sink(self) -> S {
        self.sink
    }
}
