use std::path::{Path, PathBuf};

use goblin::elf::header::{self, ET_DYN};
use goblin::elf::Elf;

use crate::error::LoadError;

/// What a unit's ELF image says about itself, read from disk before loading.
#[derive(Debug)]
pub struct UnitImage {
    path: PathBuf,
    machine: u16,
    soname: Option<String>,
    exports: Vec<String>,
}

impl UnitImage {
    /// Reads and parses `path`, rejecting anything this process cannot `dlopen`.
    pub fn inspect(path: &Path) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path).map_err(|source| LoadError::FileError {
            path: path.to_path_buf(),
            source,
        })?;

        let elf = Elf::parse(&bytes).map_err(|e| LoadError::NotElf(e.to_string()))?;

        if elf.header.e_type != ET_DYN {
            return Err(LoadError::NotSharedObject(path.to_path_buf()));
        }

        let machine = elf.header.e_machine;
        if !host_machine(machine) {
            return Err(LoadError::UnsupportedArch(machine));
        }

        let exports = elf
            .dynsyms
            .iter()
            .filter(|sym| sym.st_value != 0)
            .filter_map(|sym| elf.dynstrtab.get_at(sym.st_name))
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect::<Vec<_>>();

        debug!(
            "[ELF] {}: machine 0x{:x}, {} exports",
            path.display(),
            machine,
            exports.len()
        );

        Ok(UnitImage {
            path: path.to_path_buf(),
            machine,
            soname: elf.soname.map(String::from),
            exports,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn machine(&self) -> u16 {
        self.machine
    }

    pub fn soname(&self) -> Option<&str> {
        self.soname.as_deref()
    }

    pub fn exports(&self, name: &str) -> bool {
        self.exports.iter().any(|export| export == name)
    }

    /// Fails on the first name the image does not export.
    pub fn require(&self, names: &[&str]) -> Result<(), LoadError> {
        match names.iter().find(|name| !self.exports(name)) {
            Some(missing) => Err(LoadError::MissingSymbol(missing.to_string())),
            None => Ok(()),
        }
    }
}

/// Whether an image built for `machine` can be loaded into this process.
fn host_machine(machine: u16) -> bool {
    match machine {
        #[cfg(target_arch = "x86_64")]
        header::EM_X86_64 => true,
        #[cfg(target_arch = "x86")]
        header::EM_386 => true,
        #[cfg(target_arch = "aarch64")]
        header::EM_AARCH64 => true,
        #[cfg(target_arch = "arm")]
        header::EM_ARM => true,
        _ => false,
    }
}
