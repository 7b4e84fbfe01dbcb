//! Segmenting pip-compile output into lockfile entries.
//!
//! A pip-compile lockfile lists each pinned package followed by comment lines
//! naming the packages that required it:
//!
//! ```text
//! idna==3.4
//!     # via requests
//! requests==2.31.0
//!     # via -r requirements.in
//! ```
//!
//! Each requirement line plus its comment lines forms a segment. The comments
//! are "depended-on-by" annotations; the graph module inverts them.

use std::collections::BTreeSet;
use std::path::Path;

use freeze2nix_core::{PackageName, Requirement};
use tracing::{debug, trace, warn};

use crate::error::{LockfileError, Result};

/// pip-compile writes this above packages it refuses to pin by default.
const UNSAFE_TRAILER: &str = "The following packages are considered to be unsafe";

/// Annotation suffixes pip-compile uses when the project metadata itself
/// requires the package.
const PROJECT_SOURCES: [&str; 3] = ["(pyproject.toml)", "(setup.cfg)", "(setup.py)"];

/// One pinned package with its provenance, as written in the lockfile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockEntry {
    /// The exactly-pinned requirement.
    pub requirement: Requirement,
    /// Requested by an input requirements file or project metadata.
    pub is_direct: bool,
    /// Packages that declared a dependency on this one.
    pub depended_on_by: BTreeSet<PackageName>,
    /// 1-based line of the requirement.
    pub line: usize,
}

#[derive(Debug)]
struct Segment {
    requirement: Requirement,
    line: usize,
    annotations: Vec<(usize, String)>,
}

#[derive(Debug)]
enum State {
    /// Before the first requirement; comments are the file header.
    Header,
    /// Collecting annotations for a requirement.
    Segment(Segment),
    /// After an unrecognized line or the unsafe trailer; comments are dropped.
    Ignoring,
}

/// Parse lockfile text into entries in order of appearance.
pub fn parse_lockfile(text: &str) -> Result<Vec<LockEntry>> {
    let mut entries = Vec::new();
    let mut state = State::Header;

    for (line_no, line) in logical_lines(text) {
        let (content, comment) = match line.split_once('#') {
            Some((content, comment)) => (content.trim(), comment.trim()),
            None => (line.trim(), ""),
        };

        if !content.is_empty() && !comment.is_empty() {
            return Err(LockfileError::format(
                line_no,
                format!("requirement and comment on the same line: {}", line.trim()),
            ));
        }

        if !content.is_empty() {
            let content = strip_hash_options(content);
            let previous = std::mem::replace(&mut state, State::Ignoring);
            if let State::Segment(segment) = previous {
                entries.push(finish_segment(segment)?);
            }

            if !Requirement::looks_like_requirement(&content) {
                warn!(line = line_no, content = %content, "skipping unrecognized lockfile line");
                continue;
            }

            let requirement = Requirement::parse(&content)
                .map_err(|e| LockfileError::format(line_no, e.to_string()))?;
            trace!(line = line_no, requirement = %requirement, "segment start");
            state = State::Segment(Segment {
                requirement,
                line: line_no,
                annotations: Vec::new(),
            });
        } else if !comment.is_empty() {
            if comment.starts_with(UNSAFE_TRAILER) {
                if let State::Segment(segment) = std::mem::replace(&mut state, State::Ignoring) {
                    entries.push(finish_segment(segment)?);
                }
                debug!(line = line_no, "ignoring packages below the unsafe trailer");
                continue;
            }
            match &mut state {
                State::Segment(segment) => segment.annotations.push((line_no, comment.to_string())),
                State::Header | State::Ignoring => {}
            }
        }
    }

    if let State::Segment(segment) = state {
        entries.push(finish_segment(segment)?);
    }

    debug!(entries = entries.len(), "parsed lockfile");
    Ok(entries)
}

/// Read and parse a lockfile from disk.
pub fn read_lockfile(path: &Path) -> Result<Vec<LockEntry>> {
    let text = std::fs::read_to_string(path).map_err(|e| LockfileError::io(path, e))?;
    parse_lockfile(&text)
}

/// Join backslash continuations, keeping the first physical line number.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let (start, mut buf) = pending.take().unwrap_or((line_no, String::new()));
        let trimmed = raw.trim_end();

        if !trimmed.contains('#')
            && let Some(head) = trimmed.strip_suffix('\\')
        {
            buf.push_str(head);
            buf.push(' ');
            pending = Some((start, buf));
            continue;
        }

        buf.push_str(trimmed);
        lines.push((start, buf));
    }

    if let Some(last) = pending {
        lines.push(last);
    }
    lines
}

/// Drop `--hash=...` options trailing a requirement.
fn strip_hash_options(content: &str) -> String {
    content
        .split_whitespace()
        .filter(|token| !token.starts_with("--hash"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn finish_segment(segment: Segment) -> Result<LockEntry> {
    let Segment {
        requirement,
        line,
        annotations,
    } = segment;

    if annotations.is_empty() {
        return Err(LockfileError::format(
            line,
            format!("'{requirement}' has no '# via' annotations"),
        ));
    }

    let mut is_direct = false;
    let mut depended_on_by = BTreeSet::new();

    for (annotation_line, annotation) in annotations {
        let body = annotation.strip_prefix("via ").unwrap_or(&annotation);
        for entry in body.split(',').map(str::trim) {
            if entry.is_empty() || entry == "via" {
                continue;
            }
            if entry.starts_with("-r ") {
                is_direct = true;
                continue;
            }
            if entry.starts_with("-c ") {
                continue;
            }
            if PROJECT_SOURCES.iter().any(|suffix| entry.ends_with(suffix)) {
                is_direct = true;
                continue;
            }
            let name = PackageName::new(entry).map_err(|_| {
                LockfileError::format(
                    annotation_line,
                    format!("annotation '{entry}' is not a package name"),
                )
            })?;
            depended_on_by.insert(name);
        }
    }

    Ok(LockEntry {
        requirement,
        is_direct,
        depended_on_by,
        line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(entry: &LockEntry) -> Vec<&str> {
        entry.depended_on_by.iter().map(PackageName::as_str).collect()
    }

    #[test]
    fn parses_multiline_annotations() {
        let text = "\
#
# This file is autogenerated by pip-compile with Python 3.11
#
certifi==2023.7.22
    # via requests
charset-normalizer==3.2.0
    # via requests
requests==2.31.0
    # via
    #   -r requirements.in
    #   my-app
";
        let entries = parse_lockfile(text).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(names(&entries[0]), ["requests"]);
        assert!(!entries[0].is_direct);
        assert_eq!(entries[2].requirement.name(), "requests");
        assert!(entries[2].is_direct);
        assert_eq!(names(&entries[2]), ["my-app"]);
        assert_eq!(entries[2].line, 8);
    }

    #[test]
    fn requirement_with_comment_is_rejected() {
        let err = parse_lockfile("six==1.16.0  # via requests\n").unwrap_err();
        assert!(matches!(err, LockfileError::Format { line: 1, .. }));
    }

    #[test]
    fn segment_without_annotations_is_rejected() {
        let err = parse_lockfile("six==1.16.0\nidna==3.4\n    # via requests\n").unwrap_err();
        assert!(matches!(err, LockfileError::Format { line: 1, .. }));
    }

    #[test]
    fn unpinned_requirement_is_rejected() {
        let err = parse_lockfile("six>=1.0\n    # via -r requirements.in\n").unwrap_err();
        assert!(matches!(err, LockfileError::Format { line: 1, .. }));
    }

    #[test]
    fn skips_option_lines_and_their_comments() {
        let text = "\
--index-url https://example.com/simple
six==1.16.0
    # via -r requirements.in
-e ./vendored/thing
    # via -r requirements.in
";
        let entries = parse_lockfile(text).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_direct);
    }

    #[test]
    fn joins_continuations_and_drops_hashes() {
        let text = "\
six==1.16.0 \\
    --hash=sha256:1e61c37477a1626458e36f7b1d82aa5c9b094fa4802892072e49de9c60c4c926 \\
    --hash=sha256:8abb2f1d86890a2dfb989f9a77cfcfd3e47c2a354b01111771326f8aa26e0254
    # via python-dateutil
";
        let entries = parse_lockfile(text).unwrap();
        assert_eq!(entries[0].requirement.version_text(), "1.16.0");
        assert_eq!(names(&entries[0]), ["python-dateutil"]);
    }

    #[test]
    fn splits_legacy_one_line_annotations() {
        let entries = parse_lockfile("idna==3.4  \n    # via requests, Yarl\n").unwrap();
        assert_eq!(names(&entries[0]), ["requests", "yarl"]);
    }

    #[test]
    fn constraint_and_project_sources() {
        let text = "\
attrs==23.1.0
    # via
    #   -c constraints.txt
    #   my-project (pyproject.toml)
six==1.16.0
    # via -c constraints.txt
";
        let entries = parse_lockfile(text).unwrap();
        assert!(entries[0].is_direct);
        assert!(entries[0].depended_on_by.is_empty());
        assert!(!entries[1].is_direct);
        assert!(entries[1].depended_on_by.is_empty());
    }

    #[test]
    fn unsafe_trailer_ends_the_last_segment() {
        let text = "\
wheel==0.41.0
    # via -r requirements.in

# The following packages are considered to be unsafe in a requirements file:
# setuptools
";
        let entries = parse_lockfile(text).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].depended_on_by.is_empty());
    }

    #[test]
    fn annotation_must_be_a_name() {
        let err = parse_lockfile("six==1.16.0\n    # via some prose here\n").unwrap_err();
        assert!(matches!(err, LockfileError::Format { line: 2, .. }));
    }

    #[test]
    fn empty_input_has_no_entries() {
        assert!(parse_lockfile("").unwrap().is_empty());
        assert!(parse_lockfile("# only a header\n\n").unwrap().is_empty());
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("requirements.txt");
        std::fs::write(&path, "six==1.16.0\n    # via -r requirements.in\n").unwrap();
        assert_eq!(read_lockfile(&path).unwrap().len(), 1);
        assert!(matches!(
            read_lockfile(&dir.path().join("missing.txt")),
            Err(LockfileError::Io { .. })
        ));
    }
}
