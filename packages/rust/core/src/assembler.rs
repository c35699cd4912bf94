//! Site directory assembler.
//!
//! Writes `knowledge.json`, one HTML file per page and `manifest.json` into
//! a staging directory next to the target, then swaps it into place. A
//! failed run removes its staging directory and leaves any previous site
//! untouched.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use bandsite_shared::{BandsiteError, CURRENT_SCHEMA_VERSION, Result, Variant};

pub const KNOWLEDGE_FILE: &str = "knowledge.json";
pub const MANIFEST_FILE: &str = "manifest.json";

/// A rendered page ready to be written as `<slug>.html`.
#[derive(Debug, Clone)]
pub struct SitePage {
    pub slug: String,
    pub html: String,
}

/// Everything the manifest records about a run.
#[derive(Debug, Clone)]
pub struct AssembleConfig {
    pub out_dir: PathBuf,
    pub variant: Variant,
    pub title: String,
    pub tool_version: String,
    pub model: String,
    pub message_count: usize,
    pub chunk_count: usize,
}

/// Checksum entry for one written file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub filename: String,
    pub sha256: String,
    pub size_bytes: usize,
}

/// Contents of `manifest.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteManifest {
    pub schema_version: u32,
    pub run_id: Uuid,
    pub variant: Variant,
    pub title: String,
    pub tool_version: String,
    pub model: String,
    pub message_count: usize,
    pub chunk_count: usize,
    pub created_at: DateTime<Utc>,
    pub files: Vec<FileMeta>,
}

#[derive(Debug, Clone)]
pub struct AssembleResult {
    pub out_dir: PathBuf,
    pub manifest: SiteManifest,
}

/// Write the site and swap it into `config.out_dir`.
///
/// ```text
/// <out_dir>/
/// ├── manifest.json
/// ├── knowledge.json
/// ├── index.html
/// └── <slug>.html ...
/// ```
#[instrument(skip_all, fields(out_dir = %config.out_dir.display(), variant = %config.variant, pages = pages.len()))]
pub fn assemble_site(
    config: &AssembleConfig,
    knowledge_json: &str,
    pages: &[SitePage],
) -> Result<AssembleResult> {
    let run_id = Uuid::now_v7();
    let out_dir = &config.out_dir;
    let dir_name = out_dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            BandsiteError::config(format!("output path {} has no directory name", out_dir.display()))
        })?;
    let parent = match out_dir.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(|e| BandsiteError::io(&parent, e))?;

    let staging = parent.join(format!(".{dir_name}.staging-{run_id}"));
    let written = write_staging(&staging, config, run_id, knowledge_json, pages)
        .and_then(|manifest| {
            swap_into_place(&staging, out_dir, &parent.join(format!(".{dir_name}.old-{run_id}")))?;
            Ok(manifest)
        });

    match written {
        Ok(manifest) => {
            info!(files = manifest.files.len(), %run_id, "site written");
            Ok(AssembleResult {
                out_dir: out_dir.clone(),
                manifest,
            })
        }
        Err(e) => {
            if staging.exists() {
                if let Err(cleanup) = std::fs::remove_dir_all(&staging) {
                    warn!(path = %staging.display(), error = %cleanup, "failed to remove staging directory");
                }
            }
            Err(e)
        }
    }
}

fn write_staging(
    staging: &Path,
    config: &AssembleConfig,
    run_id: Uuid,
    knowledge_json: &str,
    pages: &[SitePage],
) -> Result<SiteManifest> {
    std::fs::create_dir_all(staging).map_err(|e| BandsiteError::io(staging, e))?;

    let mut files = Vec::with_capacity(pages.len() + 1);
    files.push(write_file(staging, KNOWLEDGE_FILE, knowledge_json)?);
    for page in pages {
        files.push(write_file(staging, &format!("{}.html", page.slug), &page.html)?);
    }

    let manifest = SiteManifest {
        schema_version: CURRENT_SCHEMA_VERSION,
        run_id,
        variant: config.variant,
        title: config.title.clone(),
        tool_version: config.tool_version.clone(),
        model: config.model.clone(),
        message_count: config.message_count,
        chunk_count: config.chunk_count,
        created_at: Utc::now(),
        files,
    };
    let json = serde_json::to_string_pretty(&manifest)
        .map_err(|e| BandsiteError::Serialization(format!("manifest: {e}")))?;
    write_file(staging, MANIFEST_FILE, &json)?;

    Ok(manifest)
}

/// Replace `target` with `staging`. An existing target is moved aside first
/// and restored if the final rename fails.
fn swap_into_place(staging: &Path, target: &Path, backup: &Path) -> Result<()> {
    let had_previous = target.exists();
    if had_previous {
        std::fs::rename(target, backup).map_err(|e| BandsiteError::io(target, e))?;
    }

    if let Err(e) = std::fs::rename(staging, target) {
        if had_previous {
            if let Err(restore) = std::fs::rename(backup, target) {
                warn!(path = %backup.display(), error = %restore, "failed to restore previous site");
            }
        }
        return Err(BandsiteError::io(target, e));
    }

    if had_previous {
        if let Err(e) = std::fs::remove_dir_all(backup) {
            warn!(path = %backup.display(), error = %e, "failed to remove previous site");
        }
    }
    debug!(path = %target.display(), replaced = had_previous, "site swapped into place");
    Ok(())
}

fn write_file(dir: &Path, filename: &str, content: &str) -> Result<FileMeta> {
    let path = dir.join(filename);
    std::fs::write(&path, content).map_err(|e| BandsiteError::io(&path, e))?;

    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    debug!(file = %filename, size = content.len(), "wrote site file");

    Ok(FileMeta {
        filename: filename.to_string(),
        sha256: format!("{:x}", hasher.finalize()),
        size_bytes: content.len(),
    })
}

/// Read `manifest.json` from a site directory.
pub fn read_manifest(site_dir: &Path) -> Result<SiteManifest> {
    let path = site_dir.join(MANIFEST_FILE);
    let content = std::fs::read_to_string(&path).map_err(|e| BandsiteError::io(&path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| BandsiteError::Serialization(format!("invalid manifest.json: {e}")))
}
