//! Recognising reports that were already posted.
//!
//! A report is any comment containing both the marker and the commit line
//! for the exact SHA. Matching is by substring so older reports with a
//! slightly different layout still count.

/// First line of every report.
pub const REPORT_MARKER: &str = "[Generated by IPC robot]";

/// Line naming the reported commit.
pub fn commit_line(sha: &str) -> String {
    format!("commit: {sha}")
}

/// Whether any of `bodies` is a report for `sha`.
pub fn already_reported<S: AsRef<str>>(bodies: &[S], sha: &str) -> bool {
    let needle = commit_line(sha);
    bodies.iter().any(|body| {
        let body = body.as_ref();
        body.contains(REPORT_MARKER) && body.contains(&needle)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_and_commit_required() {
        let bodies = ["[Generated by IPC robot]\ncommit: abc123\n| commit |"];
        assert!(already_reported(&bodies, "abc123"));
        assert!(!already_reported(&bodies, "def456"));
    }

    #[test]
    fn test_marker_alone_is_not_enough() {
        let bodies = ["[Generated by IPC robot]\ncommit: def456", "commit: abc123 looks good"];
        assert!(!already_reported(&bodies, "abc123"));
    }

    #[test]
    fn test_formatting_is_permissive() {
        let bodies = vec!["Quoting: > [Generated by IPC robot] ... commit: abc123 ...".to_string()];
        assert!(already_reported(&bodies, "abc123"));
    }

    #[test]
    fn test_no_comments() {
        let bodies: [&str; 0] = [];
        assert!(!already_reported(&bodies, "abc123"));
    }
}
