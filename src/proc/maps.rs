use std::path::{Path, PathBuf};

use proc_maps::{get_process_maps, MapRange, Pid};

use crate::error::LoadError;

/// Where a loaded image sits in a process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub path: PathBuf,
    pub base: usize,
    pub size: usize,
}

pub struct Maps {
    ranges: Vec<MapRange>,
}

impl Maps {
    pub fn new(pid: i32) -> Result<Self, LoadError> {
        let ranges = get_process_maps(pid as Pid).map_err(LoadError::ProcessMaps)?;
        debug!("[MAPS] pid {}: {} ranges", pid, ranges.len());
        Ok(Self { ranges })
    }

    /// Finds the image loaded from `path`.
    pub fn find(&self, path: &Path) -> Result<Mapping, LoadError> {
        let wanted = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.collect(|filename| {
            filename == wanted || filename.canonicalize().is_ok_and(|f| f == wanted)
        })
        .ok_or_else(|| LoadError::ModuleNotMapped(path.to_path_buf()))
    }

    /// Finds the first image whose file name starts with `name`.
    pub fn find_by_name(&self, name: &str) -> Result<Mapping, LoadError> {
        let first = self
            .ranges
            .iter()
            .filter_map(MapRange::filename)
            .find(|filename| {
                filename
                    .file_name()
                    .and_then(|f| f.to_str())
                    .is_some_and(|f| f.starts_with(name))
            })
            .map(Path::to_path_buf)
            .ok_or_else(|| LoadError::ModuleNotMapped(PathBuf::from(name)))?;

        self.find(&first)
    }

    fn collect(&self, matches: impl Fn(&Path) -> bool) -> Option<Mapping> {
        let mut mapping: Option<Mapping> = None;

        for range in &self.ranges {
            let Some(filename) = range.filename() else {
                continue;
            };
            if !matches(filename) {
                continue;
            }

            let start = range.start();
            let end = start + range.size();
            match mapping.as_mut() {
                None => {
                    mapping = Some(Mapping {
                        path: filename.to_path_buf(),
                        base: start,
                        size: range.size(),
                    })
                }
                Some(m) => {
                    let top = (m.base + m.size).max(end);
                    m.base = m.base.min(start);
                    m.size = top - m.base;
                }
            }
        }

        mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proc::Proc;

    #[cfg(target_os = "linux")]
    #[test]
    fn finds_this_executable() {
        let exe = std::env::current_exe().unwrap();
        let maps = Proc::current().maps().unwrap();

        let mapping = maps.find(&exe).unwrap();
        assert!(mapping.base > 0);
        assert!(mapping.size > 0);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn unknown_images_are_not_mapped() {
        let maps = Proc::current().maps().unwrap();

        let err = maps.find(Path::new("/nonexistent/libnothing.so")).unwrap_err();
        assert!(matches!(err, LoadError::ModuleNotMapped(_)));
        assert!(maps.find_by_name("libnothing-at-all.so").is_err());
    }
}
