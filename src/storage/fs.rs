//! Durable, filesystem-backed [Storage]. Each blob is one file under a
//! root directory; `put` writes to `<file>.tmp` and renames over the
//! target, which is atomic on every host filesystem this crate targets.
//! `touch` returns `(mtime_ns, size)`, so external edits and writes from
//! cooperating threads both invalidate the cache correctly.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::UNIX_EPOCH,
};

use log::{debug, warn};

use super::{Storage, StoragePath, VersionToken};
use crate::{err_at, Result};

/// A durable [Storage] backend rooted at a directory on disk.
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    /// Open (creating if necessary) a filesystem store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<FsStorage> {
        let root = root.into();
        err_at!(StorageIo, fs::create_dir_all(&root))?;
        Ok(FsStorage { root })
    }

    fn to_file_path(&self, path: &StoragePath) -> PathBuf {
        let mut file_path = self.root.clone();
        for segment in path.segments() {
            file_path.push(encode_segment(segment));
        }
        file_path
    }

    fn to_dir_path(&self, prefix: &StoragePath) -> PathBuf {
        let mut dir_path = self.root.clone();
        for segment in prefix.segments() {
            dir_path.push(encode_segment(segment));
        }
        dir_path
    }
}

impl Storage for FsStorage {
    fn get(&self, path: &StoragePath) -> Result<Option<Vec<u8>>> {
        let file_path = self.to_file_path(path);
        match fs::read(&file_path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => err_at!(StorageIo, Err(e)),
        }
    }

    fn put(&self, path: &StoragePath, bytes: Vec<u8>) -> Result<()> {
        let file_path = self.to_file_path(path);
        if let Some(parent) = file_path.parent() {
            err_at!(StorageIo, fs::create_dir_all(parent))?;
        }
        let tmp_path = tmp_path_for(&file_path);
        {
            let mut f = err_at!(StorageIo, fs::File::create(&tmp_path))?;
            err_at!(StorageIo, f.write_all(&bytes))?;
            err_at!(StorageIo, f.sync_all())?;
        }
        err_at!(StorageIo, fs::rename(&tmp_path, &file_path))?;
        debug!("docudb: wrote {} bytes to {:?}", bytes.len(), file_path);
        Ok(())
    }

    fn delete(&self, path: &StoragePath) -> Result<bool> {
        let file_path = self.to_file_path(path);
        match fs::remove_file(&file_path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => err_at!(StorageIo, Err(e)),
        }
    }

    fn list(&self, prefix: &StoragePath) -> Result<Vec<StoragePath>> {
        let dir_path = self.to_dir_path(prefix);
        let mut results = Vec::new();
        collect_files(&dir_path, prefix.segments(), &mut results)?;
        Ok(results)
    }

    fn touch(&self, path: &StoragePath) -> Result<Option<VersionToken>> {
        let file_path = self.to_file_path(path);
        match fs::metadata(&file_path) {
            Ok(meta) => {
                let mtime_ns = meta
                    .modified()
                    .ok()
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map(|d| d.as_nanos())
                    .unwrap_or(0);
                Ok(Some(VersionToken(format!("{}:{}", mtime_ns, meta.len()))))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                warn!("docudb: touch failed for {:?}: {}", file_path, e);
                err_at!(StorageIo, Err(e))
            }
        }
    }
}

fn collect_files(dir: &Path, prefix: &[String], out: &mut Vec<StoragePath>) -> Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return err_at!(StorageIo, Err(e)),
    };
    for entry in entries {
        let entry = err_at!(StorageIo, entry)?;
        let file_type = err_at!(StorageIo, entry.file_type())?;
        let name = decode_segment(&entry.file_name().to_string_lossy());
        if file_type.is_dir() {
            let mut nested_prefix = prefix.to_vec();
            nested_prefix.push(name);
            collect_files(&entry.path(), &nested_prefix, out)?;
        } else if !name.ends_with(".tmp") {
            let mut segments = prefix.to_vec();
            segments.push(name);
            out.push(StoragePath::new(segments));
        }
    }
    Ok(())
}

fn tmp_path_for(file_path: &Path) -> PathBuf {
    let mut tmp = file_path.as_os_str().to_os_string();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Percent-encode any byte outside `[A-Za-z0-9._-]`, so path segments can
/// never escape their directory or collide with the `.tmp` suffix. A
/// segment made up entirely of dots (`"."`, `".."`, ...) would otherwise
/// round-trip to a literal directory-navigation entry even with `.` in the
/// allowed set, so those are percent-encoded in full.
fn encode_segment(segment: &str) -> String {
    if !segment.is_empty() && segment.bytes().all(|b| b == b'.') {
        return segment.bytes().map(|b| format!("%{:02X}", b)).collect();
    }
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'-' => out.push(byte as char),
            b'_' => out.push_str("%5F"),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

fn decode_segment(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Ok(byte) = u8::from_str_radix(&segment[i + 1..i + 3], 16) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
#[path = "fs_test.rs"]
mod fs_test;
