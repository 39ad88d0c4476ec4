use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tracing::warn;

use crate::git;
use crate::process::{CommandFailed, Invocation, Strictness};
use crate::session::Session;

/// `backup_YYYYMMDD_HHMMSS`
pub fn backup_name(at: OffsetDateTime) -> String {
    format!(
        "backup_{:04}{:02}{:02}_{:02}{:02}{:02}",
        at.year(),
        u8::from(at.month()),
        at.day(),
        at.hour(),
        at.minute(),
        at.second()
    )
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

struct BackupPaths {
    name: String,
    dir: PathBuf,
    archive_name: String,
    archive: PathBuf,
}

impl BackupPaths {
    fn new(root: &Path, name: String) -> Self {
        let archive_name = format!("{name}.tar.gz");
        Self {
            dir: root.join(&name),
            archive: root.join(&archive_name),
            archive_name,
            name,
        }
    }
}

/// Snapshots the working tree (tracked and untracked, ignored files excluded) into
/// `backup_<timestamp>.tar.gz` in the project root.
///
/// Failures are printed, not returned, and leave neither the staging directory nor a partial
/// archive behind. Strict git/tar failures still end the program once cleanup is done.
pub fn create_backup(session: &Session) -> Result<()> {
    create_backup_named(session, backup_name(now()))
}

fn create_backup_named(session: &Session, name: String) -> Result<()> {
    let console = session.console;
    console.header("Creating Backup");

    let paths = BackupPaths::new(&session.layout.root, name);

    if git::is_dirty(session)? {
        console.warning("There are uncommitted changes. These will be included in the backup.");
    }

    match write_archive(session, &paths) {
        Ok(()) => {
            console.success(&format!("Backup created: {}", paths.archive_name));
            Ok(())
        }
        Err(err) => {
            discard_partial(&paths);
            if err.downcast_ref::<CommandFailed>().is_some() {
                return Err(err);
            }
            console.error(&format!("Backup failed: {err:#}"));
            Ok(())
        }
    }
}

fn write_archive(session: &Session, paths: &BackupPaths) -> Result<()> {
    let root = &session.layout.root;

    fs::create_dir_all(&paths.dir)
        .with_context(|| format!("create {}", paths.dir.display()))?;

    // HEAD is the baseline; everything that differs from it comes from the working tree.
    git::export_head(session, &paths.dir)?;

    let (present, gone): (Vec<PathBuf>, Vec<PathBuf>) = git::changed_since_head(session)?
        .into_iter()
        .chain(git::untracked_files(session)?)
        // The staging directory itself shows up as untracked.
        .filter(|rel| !rel.starts_with(&paths.name))
        .partition(|rel| root.join(rel).is_file());

    for rel in &gone {
        drop_exported(&paths.dir, rel)?;
    }
    for rel in &present {
        copy_from_tree(root, &paths.dir, rel)?;
    }

    session.run(
        &Invocation::new("tar").args(["-czf", paths.archive_name.as_str(), paths.name.as_str()]),
        Strictness::Strict,
    )?;

    fs::remove_dir_all(&paths.dir).with_context(|| format!("remove {}", paths.dir.display()))?;
    Ok(())
}

/// Removes a HEAD file that no longer exists as a file in the working tree, along with any
/// directories it leaves empty.
fn drop_exported(staging: &Path, rel: &Path) -> Result<()> {
    let dest = staging.join(rel);
    match fs::symlink_metadata(&dest) {
        Ok(meta) if !meta.is_dir() => {
            fs::remove_file(&dest).with_context(|| format!("remove {}", rel.display()))?;
        }
        _ => return Ok(()),
    }

    let mut dir = dest.parent();
    while let Some(current) = dir {
        if current == staging || fs::remove_dir(current).is_err() {
            break;
        }
        dir = current.parent();
    }
    Ok(())
}

fn copy_from_tree(root: &Path, staging: &Path, rel: &Path) -> Result<()> {
    let dest = staging.join(rel);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory for {}", rel.display()))?;
    }
    // An exported symlink would otherwise be written through.
    if fs::symlink_metadata(&dest).is_ok_and(|meta| !meta.is_dir()) {
        fs::remove_file(&dest).with_context(|| format!("replace {}", rel.display()))?;
    }
    fs::copy(root.join(rel), &dest).with_context(|| format!("copy {}", rel.display()))?;
    Ok(())
}

fn discard_partial(paths: &BackupPaths) {
    if paths.dir.exists() {
        if let Err(err) = fs::remove_dir_all(&paths.dir) {
            warn!(dir = %paths.dir.display(), error = %err, "could not remove partial backup");
        }
    }
    if paths.archive.exists() {
        if let Err(err) = fs::remove_file(&paths.archive) {
            warn!(archive = %paths.archive.display(), error = %err, "could not remove partial archive");
        }
    }
}
