//! File discovery for the pattern-based entry point.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::LinterError;

/// Expands file arguments and glob patterns into a list of files, honoring
/// the `include`/`exclude` configuration.
///
/// Include and exclude globs are matched against paths relative to the
/// directory being searched.
#[derive(Debug, Clone)]
pub struct FileFinder {
    include_globs: Option<GlobSet>,
    exclude_globs: Option<GlobSet>,
}

impl FileFinder {
    /// Creates a finder from include and exclude patterns.
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, LinterError> {
        Ok(Self {
            include_globs: build_globset(include)?,
            exclude_globs: build_globset(exclude)?,
        })
    }

    /// Returns true if `path` (relative to the search root) is filtered out.
    pub fn is_ignored(&self, path: &Path) -> bool {
        if self
            .exclude_globs
            .as_ref()
            .is_some_and(|excludes| excludes.is_match(path))
        {
            return true;
        }

        self.include_globs
            .as_ref()
            .is_some_and(|includes| !includes.is_match(path))
    }

    /// Resolves `patterns` under `base_dir`.
    ///
    /// A pattern naming an existing file is taken as is; anything else is
    /// treated as a glob. The result is sorted and free of duplicates, and
    /// paths under the current directory carry no `./` prefix.
    pub fn discover(
        &self,
        patterns: &[String],
        base_dir: &Path,
    ) -> Result<Vec<PathBuf>, LinterError> {
        let mut files = Vec::new();
        let mut globs = Vec::new();

        for pattern in patterns {
            let path = base_dir.join(pattern);
            if path.is_file() {
                if self.is_ignored(Path::new(pattern)) {
                    debug!("Ignoring {}", pattern);
                } else {
                    files.push(without_cur_dir(path));
                }
            } else {
                globs.push(pattern.clone());
            }
        }

        if let Some(glob_set) = build_globset(&globs)? {
            for entry in WalkDir::new(base_dir)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                let relative = entry.path().strip_prefix(base_dir).unwrap_or(entry.path());
                if glob_set.is_match(relative) && !self.is_ignored(relative) {
                    files.push(without_cur_dir(entry.into_path()));
                }
            }
        }

        files.sort();
        files.dedup();

        info!("Discovered {} files to lint", files.len());
        Ok(files)
    }
}

fn without_cur_dir(path: PathBuf) -> PathBuf {
    match path.strip_prefix(".") {
        Ok(rest) if !rest.as_os_str().is_empty() => rest.to_path_buf(),
        _ => path,
    }
}

fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>, LinterError> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| LinterError::config(format!("Invalid pattern '{}': {}", pattern, e)))?;
        builder.add(glob);
    }

    builder
        .build()
        .map(Some)
        .map_err(|e| LinterError::config(format!("Failed to build globset: {}", e)))
}
