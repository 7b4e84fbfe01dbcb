//! Accepted wheel tags of a Python interpreter.
//!
//! The interpreter is asked for `packaging.tags.sys_tags()`, falling back to
//! the copy vendored inside pip. The result is preference-ordered.

use freeze2nix_core::{Error, Result, TagSet};
use tokio::process::Command;
use tracing::debug;

const PROBE: &str = "\
try:
    from packaging.tags import sys_tags
except ImportError:
    from pip._vendor.packaging.tags import sys_tags
for tag in sys_tags():
    print(tag)
";

/// Run `python` and collect the tags it accepts.
pub async fn detect_tags(python: &str) -> Result<TagSet> {
    debug!(python, "probing interpreter for wheel tags");
    let output = Command::new(python)
        .args(["-c", PROBE])
        .output()
        .await
        .map_err(|e| Error::interpreter(format!("failed to run '{python}': {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = stderr.lines().last().unwrap_or("no output");
        return Err(Error::interpreter(format!(
            "'{python}' could not list wheel tags ({}): {reason}",
            output.status
        )));
    }

    parse_tag_lines(&String::from_utf8_lossy(&output.stdout))
}

/// One `interpreter-abi-platform` tag per line; blank lines are ignored.
pub fn parse_tag_lines(text: &str) -> Result<TagSet> {
    let tags = TagSet::parse(text.lines().map(str::trim).filter(|line| !line.is_empty()))?;
    if tags.is_empty() {
        return Err(Error::interpreter("interpreter reported no wheel tags"));
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use freeze2nix_core::{CompatibilityTag, ErrorCode};

    #[test]
    fn parses_probe_output_in_order() {
        let tags = parse_tag_lines("cp311-cp311-manylinux_2_17_x86_64\n\ncp311-abi3-linux_x86_64\npy3-none-any\n")
            .unwrap();
        let listed: Vec<String> = tags.iter().map(ToString::to_string).collect();
        assert_eq!(
            listed,
            ["cp311-cp311-manylinux_2_17_x86_64", "cp311-abi3-linux_x86_64", "py3-none-any"]
        );
        assert!(tags.contains(&CompatibilityTag::new("py3", "none", "any")));
    }

    #[test]
    fn empty_probe_output_is_an_error() {
        assert_eq!(parse_tag_lines("\n").unwrap_err().code(), ErrorCode::E0602);
    }

    #[test]
    fn malformed_line_is_a_config_error() {
        assert_eq!(parse_tag_lines("nonsense\n").unwrap_err().code(), ErrorCode::E0601);
    }

    #[tokio::test]
    async fn missing_interpreter() {
        let err = detect_tags("freeze2nix-no-such-python").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::E0602);
    }
}
