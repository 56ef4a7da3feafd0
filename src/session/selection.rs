//! Resolving a profile's patterns to a concrete list of test files

use std::collections::HashSet;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use glob::{MatchOptions, Pattern};

use crate::common::{Error, Result};
use crate::profile::Profile;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Ordered, deduplicated set of absolute test file paths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    paths: Vec<PathBuf>,
}

impl Selection {
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        self.paths
    }
}

/// Resolve a profile's inclusion/exclusion patterns against its root
///
/// Only paths are looked at; no file is opened. Order follows the glob
/// walker (sorted within each directory), so repeated resolutions against
/// an unchanged tree yield the same list.
pub fn resolve(profile: &Profile) -> Result<Selection> {
    let root = canonical_root(&profile.root)?;
    let root_str = root.to_str().ok_or_else(|| {
        Error::pattern_resolution(&profile.include, "suite root is not valid UTF-8")
    })?;

    let include = format!(
        "{}{}{}",
        Pattern::escape(root_str),
        MAIN_SEPARATOR,
        root_relative(&profile.include)?
    );
    let exclude = profile
        .exclude
        .as_deref()
        .map(|p| Pattern::new(root_relative(p)?).map_err(|e| Error::pattern_resolution(p, e)))
        .transpose()?;

    let entries = glob::glob_with(&include, MATCH_OPTIONS)
        .map_err(|e| Error::pattern_resolution(&profile.include, e))?;

    let mut seen = HashSet::new();
    let mut paths = Vec::new();

    for entry in entries {
        let path = entry.map_err(|e| Error::pattern_resolution(&profile.include, e))?;
        if !path.is_file() {
            continue;
        }
        if let Some(exclude) = &exclude {
            let relative = path.strip_prefix(&root).unwrap_or(&path);
            if exclude.matches_path_with(relative, MATCH_OPTIONS) {
                tracing::debug!(path = %path.display(), "Excluded by profile");
                continue;
            }
        }
        if seen.insert(path.clone()) {
            paths.push(path);
        }
    }

    tracing::debug!(
        profile = %profile.name,
        root = %root.display(),
        count = paths.len(),
        "Resolved selection"
    );

    Ok(Selection { paths })
}

/// Strip a leading `./` and reject patterns that leave the suite root
fn root_relative(pattern: &str) -> Result<&str> {
    let trimmed = pattern.trim_start_matches("./");
    let escapes = trimmed.starts_with('/')
        || Path::new(trimmed).is_absolute()
        || trimmed
            .split(|c: char| c == '/' || c == '\\')
            .any(|part| part == "..");
    if escapes {
        return Err(Error::pattern_resolution(
            pattern,
            "pattern must be relative to the suite root",
        ));
    }
    Ok(trimmed)
}

fn canonical_root(root: &Path) -> Result<PathBuf> {
    let canonical = root.canonicalize().map_err(|e| {
        Error::pattern_resolution(
            root.display().to_string(),
            format!("suite root is not accessible: {}", e),
        )
    })?;
    if !canonical.is_dir() {
        return Err(Error::pattern_resolution(
            root.display().to_string(),
            "suite root is not a directory",
        ));
    }
    Ok(canonical)
}
