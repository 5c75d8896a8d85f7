pub mod maps;

use crate::error::LoadError;
use maps::Maps;

/// A newtype that references the [`/proc/<id>`](https://man7.org/linux/man-pages/man5/proc.5.html) directory.
#[derive(Debug, Clone, Copy)]
pub struct Proc {
    pub pid: i32,
}

impl Proc {
    /// Creates a new [`Proc`] that references the host process.
    pub fn current() -> Self {
        Proc {
            pid: std::process::id() as i32,
        }
    }

    /// Reads `/proc/<id>/maps` of the current [`Proc`].
    pub fn maps(&self) -> Result<Maps, LoadError> {
        Maps::new(self.pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_is_this_process() {
        assert_eq!(Proc::current().pid as u32, std::process::id());
    }
}
