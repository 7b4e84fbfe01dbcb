//! Lockfile fixtures in the shapes pip-compile writes.

use std::path::PathBuf;

use tempfile::TempDir;

/// Collection of pre-built lockfiles.
#[derive(Debug)]
pub struct Fixtures;

impl Fixtures {
    /// `requests` and its dependency closure, multi-line annotation style.
    #[must_use]
    pub fn requests_lockfile() -> &'static str {
        "\
#
# This file is autogenerated by pip-compile with Python 3.11
# by the following command:
#
#    pip-compile requirements.in
#
certifi==2023.7.22
    # via requests
charset-normalizer==3.2.0
    # via requests
idna==3.4
    # via requests
requests==2.31.0
    # via -r requirements.in
urllib3==2.0.4
    # via requests
"
    }

    /// Annotations on the requirement line itself, as very old pip-compile
    /// releases wrote them. Not accepted.
    #[must_use]
    pub fn inline_annotation_lockfile() -> &'static str {
        "\
#
# This file is autogenerated by pip-compile
#
python-dateutil==2.8.2    # via -r requirements.in
"
    }

    /// Same shape as [`Fixtures::requests_lockfile`] but with hashes and continuations.
    #[must_use]
    pub fn hashed_lockfile() -> &'static str {
        "\
six==1.16.0 \\
    --hash=sha256:1e61c37477a1626458e36f7b1d82aa5c9b094fa4802892072e49de9c60c4c926 \\
    --hash=sha256:8abb2f1d86890a2dfb989f9a77cfcfd3e47c2a354b01111771326f8aa26e0254
    # via python-dateutil
python-dateutil==2.8.2 \\
    --hash=sha256:0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef
    # via -r requirements.in
"
    }

    /// A cycle between two packages below a direct root.
    #[must_use]
    pub fn cyclic_lockfile() -> &'static str {
        "\
app==1.0
    # via -r requirements.in
ping==1.0
    # via
    #   app
    #   pong
pong==1.0
    # via ping
"
    }

    /// Write `contents` as `requirements.txt` in a fresh temporary directory.
    ///
    /// The directory is removed when the returned guard is dropped.
    pub fn write_lockfile(contents: &str) -> std::io::Result<(TempDir, PathBuf)> {
        let dir = TempDir::new()?;
        let path = dir.path().join("requirements.txt");
        std::fs::write(&path, contents)?;
        Ok((dir, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_into_temp_dir() {
        let (dir, path) = Fixtures::write_lockfile(Fixtures::requests_lockfile()).unwrap();
        assert!(path.starts_with(dir.path()));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            Fixtures::requests_lockfile()
        );
    }
}
