//! Asset staging
//!
//! A deployable artifact (a file or a directory) is hashed by content and
//! packaged into a zip under the output directory. The hash names both the
//! staged file and the object key, so unchanged artifacts keep their key.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A local artifact referenced by a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetSource {
    pub path: PathBuf,
}

impl AssetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// An artifact after hashing and packaging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedAsset {
    /// Path the artifact was read from
    pub source: PathBuf,
    /// BLAKE3 hash of the artifact contents (hex)
    pub hash: String,
    /// File name of the package inside the output directory
    pub file_name: String,
    /// Destination bucket, possibly with `${AWS::...}` placeholders
    pub bucket: String,
    /// Destination object key
    pub object_key: String,
}

/// Staged assets keyed by source path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    assets: BTreeMap<PathBuf, StagedAsset>,
}

impl AssetManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a staged asset, replacing any earlier entry for the same source
    pub fn insert(&mut self, asset: StagedAsset) {
        self.assets.insert(asset.source.clone(), asset);
    }

    pub fn get(&self, source: &AssetSource) -> Option<&StagedAsset> {
        self.assets.get(&source.path)
    }

    /// Look up a staged asset, failing if it was never staged
    pub fn require(&self, source: &AssetSource) -> Result<&StagedAsset> {
        self.get(source)
            .ok_or_else(|| Error::AssetNotStaged(source.path.clone()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &StagedAsset> {
        self.assets.values()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Hash an artifact without packaging it
pub fn hash_asset(path: &Path) -> Result<String> {
    let files = read_artifact(path)?;
    Ok(hash_files(&files))
}

/// Resolve the staged name and object key of an artifact without packaging it
pub fn locate_asset(source: &AssetSource, bucket: &str) -> Result<StagedAsset> {
    let hash = hash_asset(&source.path)?;
    Ok(staged_asset(source, hash, bucket))
}

/// Hash and package an artifact into `out_dir`
///
/// The archive is always rebuilt, so a damaged file left under the staged
/// name is replaced.
pub fn stage_asset(source: &AssetSource, out_dir: &Path, bucket: &str) -> Result<StagedAsset> {
    let files = read_artifact(&source.path)?;
    let staged = staged_asset(source, hash_files(&files), bucket);

    fs::create_dir_all(out_dir).map_err(|e| Error::io(out_dir, e))?;
    let dest = out_dir.join(&staged.file_name);

    // Written under a temporary name and renamed into place
    let partial = out_dir.join(format!("{}.tmp", staged.file_name));
    if let Err(err) = write_zip(&files, &partial) {
        let _ = fs::remove_file(&partial);
        return Err(err);
    }
    if let Err(err) = fs::rename(&partial, &dest) {
        let _ = fs::remove_file(&partial);
        return Err(Error::io(&dest, err));
    }

    log::debug!(
        "Staged {} ({} files) as {}",
        source.path.display(),
        files.len(),
        staged.file_name
    );
    Ok(staged)
}

fn staged_asset(source: &AssetSource, hash: String, bucket: &str) -> StagedAsset {
    StagedAsset {
        source: source.path.clone(),
        file_name: format!("asset.{hash}.zip"),
        object_key: format!("{hash}.zip"),
        hash,
        bucket: bucket.to_string(),
    }
}

/// Archive entry name and contents, sorted by name
type ArtifactFiles = Vec<(String, Vec<u8>)>;

fn read_artifact(path: &Path) -> Result<ArtifactFiles> {
    if !path.exists() {
        return Err(Error::AssetNotFound(path.to_path_buf()));
    }

    if path.is_file() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| Error::AssetNotFound(path.to_path_buf()))?;
        let content = fs::read(path).map_err(|e| Error::io(path, e))?;
        return Ok(vec![(name, content)]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::io(path, io::Error::from(e)))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(path)
            .map_err(|e| Error::io(entry.path(), io::Error::other(e)))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join("/");
        let content = fs::read(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
        files.push((name, content));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

fn hash_files(files: &ArtifactFiles) -> String {
    let mut hasher = blake3::Hasher::new();
    for (name, content) in files {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
        hasher.update(&(content.len() as u64).to_le_bytes());
        hasher.update(content);
    }
    hasher.finalize().to_hex().to_string()
}

fn write_zip(files: &ArtifactFiles, dest: &Path) -> Result<()> {
    let file = File::create(dest).map_err(|e| Error::io(dest, e))?;
    let mut zip = ZipWriter::new(file);

    // Fixed timestamps and modes keep the archive byte-identical across runs
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default())
        .unix_permissions(0o755);

    for (name, content) in files {
        zip.start_file(name.as_str(), options)?;
        zip.write_all(content).map_err(|e| Error::io(dest, e))?;
    }
    zip.finish()?;
    Ok(())
}
