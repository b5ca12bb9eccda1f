//! Resolution of extra-file rules into concrete archive entries.

use crate::bundler::{
    error::{Error, Result},
    settings::{FileInfo, FileRule},
    template::Template,
};
use std::{
    io,
    path::{Path, PathBuf},
};

/// A file to put into an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path on disk
    pub source: PathBuf,
    /// Path inside the archive
    pub destination: String,
    /// Header overrides
    pub info: Option<FileInfo>,
}

/// Expands extra-file rules into entries sorted and deduplicated by destination.
///
/// Each rule's source is rendered with `template` and globbed relative to
/// `root`. Rules matching nothing are skipped. Without an explicit
/// destination, every match is placed at the first match's path relative to
/// `root`; with one, each match goes to `destination/<file name>`. When
/// several entries share a destination, the first one collected wins.
pub fn expand_globs(
    template: &Template,
    root: &Path,
    rules: &[FileRule],
) -> Result<Vec<FileEntry>> {
    let mut result = Vec::new();

    for rule in rules {
        let pattern = template.apply(&rule.source)?;
        let matches = glob_files(root, &pattern)?;
        if matches.is_empty() {
            log::debug!("no files matched {}", pattern);
            continue;
        }

        let default_destination = relative_to(root, &matches[0]);
        for path in &matches {
            let destination = match rule.destination.as_deref() {
                Some(dir) => Path::new(dir)
                    .join(path.file_name().unwrap_or(path.as_os_str()))
                    .to_string_lossy()
                    .into_owned(),
                None => default_destination.clone(),
            };
            result.push(FileEntry {
                source: path.clone(),
                destination,
                info: rule.info.clone(),
            });
        }
    }

    result.sort_by(|a, b| a.destination.cmp(&b.destination));
    result.dedup_by(|later, earlier| later.destination == earlier.destination);
    Ok(result)
}

fn glob_files(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full = if Path::new(pattern).is_absolute() {
        pattern.to_string()
    } else {
        let root = glob::Pattern::escape(&root.to_string_lossy());
        Path::new(&root).join(pattern).to_string_lossy().into_owned()
    };

    let paths = glob::glob(&full).map_err(|e| Error::Glob {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    paths
        .map(|entry| {
            entry.map_err(|e| Error::Fs {
                context: "reading glob match",
                path: e.path().to_path_buf(),
                error: io::Error::new(e.error().kind(), e.error().to_string()),
            })
        })
        .collect()
}

/// Path of `path` inside the archive: relative to `root`, or just the file
/// name for matches outside it.
fn relative_to(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) => relative.to_string_lossy().into_owned(),
        Err(_) => path
            .file_name()
            .unwrap_or(path.as_os_str())
            .to_string_lossy()
            .into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::SettingsBuilder;

    fn template() -> Template {
        let settings = SettingsBuilder::new()
            .project_name("myapp")
            .version("1.0.0")
            .build()
            .unwrap();
        Template::new(&settings)
    }

    fn touch(root: &Path, name: &str) {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, name).unwrap();
    }

    fn rule(source: &str, destination: Option<&str>) -> FileRule {
        FileRule {
            source: source.into(),
            destination: destination.map(String::from),
            info: None,
        }
    }

    #[test]
    fn no_match_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let files = expand_globs(&template(), dir.path(), &[rule("README*", None)]).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn single_match_without_destination_uses_matched_path() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "docs/README.md");

        let files = expand_globs(&template(), dir.path(), &[rule("docs/README*", None)]).unwrap();
        assert_eq!(
            files,
            vec![FileEntry {
                source: dir.path().join("docs/README.md"),
                destination: "docs/README.md".into(),
                info: None,
            }]
        );
    }

    #[test]
    fn explicit_destination_joins_base_names() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "notes/b.md");
        touch(dir.path(), "notes/a.md");

        let rules = [rule("notes/*.md", Some("doc"))];
        let files = expand_globs(&template(), dir.path(), &rules).unwrap();
        let pairs: Vec<_> = files
            .iter()
            .map(|f| {
                let source = f.source.strip_prefix(dir.path()).unwrap().to_path_buf();
                (source, f.destination.as_str())
            })
            .collect();
        assert_eq!(
            pairs,
            vec![
                (PathBuf::from("notes/a.md"), "doc/a.md"),
                (PathBuf::from("notes/b.md"), "doc/b.md"),
            ]
        );
    }

    #[test]
    fn multiple_matches_without_destination_collapse_to_first() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "README.md");
        touch(dir.path(), "README.txt");

        let files = expand_globs(&template(), dir.path(), &[rule("README*", None)]).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].destination, "README.md");
        assert_eq!(files[0].source, dir.path().join("README.md"));
    }

    #[test]
    fn overlapping_rules_are_deduplicated_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "LICENSE");
        touch(dir.path(), "CHANGELOG.md");

        let rules = [rule("LICENSE*", None), rule("CHANGELOG*", None), rule("LICENSE", None)];
        let files = expand_globs(&template(), dir.path(), &rules).unwrap();
        let destinations: Vec<_> = files.iter().map(|f| f.destination.as_str()).collect();
        assert_eq!(destinations, vec!["CHANGELOG.md", "LICENSE"]);
    }

    #[test]
    fn templated_source_is_rendered() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "myapp.conf");

        let rules = [rule("{{ProjectName}}.conf", None)];
        let files = expand_globs(&template(), dir.path(), &rules).unwrap();
        assert_eq!(files[0].destination, "myapp.conf");
    }

    #[test]
    fn malformed_pattern_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = expand_globs(&template(), dir.path(), &[rule("[", None)]).unwrap_err();
        assert!(matches!(err, Error::Glob { .. }));
    }

    #[test]
    fn absolute_match_outside_root_uses_file_name() {
        let root = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        touch(elsewhere.path(), "NOTICE");

        let pattern = elsewhere.path().join("NOTICE").to_string_lossy().into_owned();
        let files = expand_globs(&template(), root.path(), &[rule(&pattern, None)]).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].destination, "NOTICE");
        assert_eq!(files[0].source, elsewhere.path().join("NOTICE"));
    }

    #[test]
    fn root_with_glob_metacharacters_is_matched_literally() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("proj[1]");
        touch(&root, "README.md");

        let files = expand_globs(&template(), &root, &[rule("README*", None)]).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].destination, "README.md");
        assert_eq!(files[0].source, root.join("README.md"));
    }
}
