//! History analyzers (SPEC_FULL.md §4.11).
//!
//! All four analyzers below share one commit stream per run: [`collect_commits`]
//! walks the repository once, and churn/coupling/ownership/hotspot each fold
//! over the resulting `Vec<CommitRecord>` independently. This avoids four
//! separate `git2::Revwalk` passes over the same history.

pub mod churn;
pub mod coupling;
pub mod hotspot;
pub mod ownership;

use crate::error::HistoryError;
use crate::model::commit::{CommitRecord, FileChange};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::path::PathBuf;

/// Walk HEAD's history back `since_days`, recording per-commit file
/// add/delete line counts. Stops at the first commit older than the
/// cutoff rather than filtering the whole history up front, since commits
/// are visited newest-first.
pub fn collect_commits(repo: &git2::Repository, since_days: u32) -> Result<Vec<CommitRecord>, HistoryError> {
    let mut revwalk = repo.revwalk()?;
    revwalk.push_head()?;
    revwalk.set_sorting(git2::Sort::TIME)?;

    let cutoff = Utc::now() - chrono::Duration::days(since_days as i64);
    let mut commits = Vec::new();

    for oid in revwalk {
        let oid = oid?;
        let commit = repo.find_commit(oid)?;
        let timestamp = git_time_to_utc(commit.time());
        if timestamp < cutoff {
            break;
        }

        let files = diff_stats(repo, &commit)?;
        commits.push(CommitRecord {
            hash: oid.to_string(),
            author: commit.author().name().unwrap_or("unknown").to_string(),
            timestamp,
            message: commit.message().unwrap_or("").to_string(),
            files,
        });
    }

    Ok(commits)
}

fn git_time_to_utc(time: git2::Time) -> DateTime<Utc> {
    Utc.timestamp_opt(time.seconds(), 0).single().unwrap_or_else(Utc::now)
}

fn diff_stats(repo: &git2::Repository, commit: &git2::Commit) -> Result<Vec<FileChange>, HistoryError> {
    let tree = commit.tree()?;
    let parent_tree = commit.parent(0).ok().and_then(|p| p.tree().ok());

    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

    let mut counts: HashMap<PathBuf, (usize, usize)> = HashMap::new();
    diff.foreach(
        &mut |delta, _progress| {
            if let Some(path) = delta.new_file().path() {
                counts.entry(path.to_path_buf()).or_insert((0, 0));
            }
            true
        },
        None,
        None,
        Some(&mut |delta, _hunk, line| {
            if let Some(path) = delta.new_file().path() {
                let entry = counts.entry(path.to_path_buf()).or_insert((0, 0));
                match line.origin() {
                    '+' => entry.0 += 1,
                    '-' => entry.1 += 1,
                    _ => {}
                }
            }
            true
        }),
    )?;

    Ok(counts
        .into_iter()
        .map(|(path, (additions, deletions))| FileChange {
            path,
            additions,
            deletions,
        })
        .collect())
}

/// Blame at HEAD for one file, used by the ownership analyzer.
pub fn blame_file(repo: &git2::Repository, path: &std::path::Path) -> Result<crate::model::commit::FileBlame, HistoryError> {
    use crate::model::commit::{BlameLine, FileBlame};

    let blame = repo.blame_file(path, None)?;
    let head = repo.head()?.peel_to_commit()?;
    let tree = head.tree()?;
    let entry = tree.get_path(path)?;
    let object = entry.to_object(repo)?;
    let blob = object.as_blob().ok_or_else(|| HistoryError::CommitNotFound {
        hash: path.display().to_string(),
    })?;
    let content = String::from_utf8_lossy(blob.content());

    let mut lines = Vec::new();
    for (idx, text) in content.lines().enumerate() {
        let line_no = idx as u32 + 1;
        let author = blame
            .get_line(idx + 1)
            .and_then(|hunk| hunk.final_signature().name().map(|s| s.to_string()))
            .unwrap_or_else(|| "unknown".to_string());
        lines.push(BlameLine {
            line: line_no,
            author,
            text: text.to_string(),
        });
    }

    Ok(FileBlame { lines })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    fn init_repo_with_commits(dir: &std::path::Path) {
        let git = |args: &[&str]| {
            Command::new("git").args(args).current_dir(dir).status().unwrap();
        };
        git(&["init", "-q"]);
        git(&["config", "user.email", "a@b.c"]);
        git(&["config", "user.name", "tester"]);
        std::fs::write(dir.join("a.txt"), "one\n").unwrap();
        git(&["add", "."]);
        git(&["commit", "-q", "-m", "first"]);
        std::fs::write(dir.join("a.txt"), "one\ntwo\n").unwrap();
        git(&["add", "."]);
        git(&["commit", "-q", "-m", "second"]);
    }

    #[test]
    fn collect_commits_finds_both_commits_within_window() {
        let dir = tempfile::tempdir().unwrap();
        init_repo_with_commits(dir.path());
        let repo = git2::Repository::open(dir.path()).unwrap();
        let commits = collect_commits(&repo, 365).unwrap();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].message.trim(), "second");
    }

    #[test]
    fn second_commit_reports_one_line_added() {
        let dir = tempfile::tempdir().unwrap();
        init_repo_with_commits(dir.path());
        let repo = git2::Repository::open(dir.path()).unwrap();
        let commits = collect_commits(&repo, 365).unwrap();
        let second = &commits[0];
        assert_eq!(second.files.len(), 1);
        assert_eq!(second.files[0].additions, 1);
    }
}
