//! One JSON file per cache key under a cache directory.
//!
//! File names are `<escaped identity>.<count>.json`. The identity is escaped
//! byte-wise (`~XX` for anything outside `[A-Za-z0-9_-]`), so distinct keys
//! always map to distinct files. The payload is a JSON array of `[x, y]`
//! pairs. Writes go to a temporary file in the same directory that is then
//! renamed over the target, so readers see either the old or the new entry.

use std::fmt::Write as _;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use geo::Coord;
use tempfile::NamedTempFile;

use super::{CacheKey, PointStore};
use crate::error::StoreError;
use crate::geometry::Point;

#[derive(Debug, Clone)]
pub struct FsPointStore {
    dir: PathBuf,
}

impl FsPointStore {
    /// Open (and create if needed) a cache directory
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir
            .join(format!("{}.{}.json", escape_id(key.id.as_str()), key.count))
    }
}

fn escape_id(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(byte as char);
        } else {
            let _ = write!(out, "~{:02X}", byte);
        }
    }
    out
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl PointStore for FsPointStore {
    fn contains(&self, key: &CacheKey) -> Result<bool, StoreError> {
        let path = self.path_for(key);
        path.try_exists().map_err(io_error(&path))
    }

    fn load(&self, key: &CacheKey) -> Result<Option<Vec<Point>>, StoreError> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path)(e)),
        };

        let pairs: Vec<[f64; 2]> =
            serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?;

        Ok(Some(
            pairs.into_iter().map(|[x, y]| Coord { x, y }).collect(),
        ))
    }

    fn store(&self, key: &CacheKey, points: &[Point]) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let pairs: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();

        let tmp = NamedTempFile::new_in(&self.dir).map_err(io_error(&self.dir))?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer(&mut writer, &pairs).map_err(|e| io_error(&path)(e.into()))?;
            writer.flush().map_err(io_error(&path))?;
        }
        tmp.as_file().sync_all().map_err(io_error(&path))?;
        tmp.persist(&path).map_err(|e| io_error(&path)(e.error))?;
        Ok(())
    }

    fn remove(&self, key: &CacheKey) -> Result<bool, StoreError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(&path)(e)),
        }
    }
}
