use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::process::{Invocation, ProcessOutput, Strictness};
use crate::session::Session;

fn git<I, S>(args: I) -> Invocation
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Invocation::new("git").args(args)
}

/// True when the working tree has uncommitted changes.
pub fn is_dirty(session: &Session) -> Result<bool> {
    let out = session.run(&git(["status", "--porcelain"]), Strictness::Strict)?;
    Ok(!out.stdout.is_empty())
}

/// `git status -s` output; empty when clean.
pub fn short_status(session: &Session) -> Result<String> {
    Ok(session
        .run(&git(["status", "-s"]), Strictness::Strict)?
        .stdout)
}

pub fn stage_all(session: &Session) -> Result<()> {
    session.run(&git(["add", "."]), Strictness::Strict)?;
    Ok(())
}

pub fn commit(session: &Session, message: &str) -> Result<()> {
    session.run(&git(["commit", "-m", message]), Strictness::Strict)?;
    Ok(())
}

pub fn push(session: &Session, remote: &str, branch: &str) -> Result<ProcessOutput> {
    session.run(&git(["push", remote, branch]), Strictness::Lenient)
}

/// Splits `-z` output. Names come back verbatim, without core.quotePath escaping.
fn nul_separated(stdout: &str) -> Vec<PathBuf> {
    stdout
        .split('\0')
        .filter(|name| !name.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Untracked files that are not ignored, relative to the project root.
pub fn untracked_files(session: &Session) -> Result<Vec<PathBuf>> {
    let out = session.run(
        &git(["ls-files", "-z", "--others", "--exclude-standard"]),
        Strictness::Strict,
    )?;
    Ok(nul_separated(&out.stdout))
}

/// Paths whose working-tree state differs from HEAD: edits, staged additions, deletions
/// and type changes. Renames show up as a deletion plus an addition.
pub fn changed_since_head(session: &Session) -> Result<Vec<PathBuf>> {
    let out = session.run(
        &git(["diff", "-z", "--name-only", "--no-renames", "--relative", "HEAD"]),
        Strictness::Strict,
    )?;
    Ok(nul_separated(&out.stdout))
}

/// Extracts every file tracked at HEAD into `dest`.
pub fn export_head(session: &Session, dest: &Path) -> Result<()> {
    session.run_pipeline(
        &git(["archive", "--format=tar", "HEAD"]),
        &Invocation::new("tar")
            .args(["-x", "-C"])
            .arg(dest.to_string_lossy()),
        Strictness::Strict,
    )?;
    Ok(())
}
