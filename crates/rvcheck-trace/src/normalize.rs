use crate::CommitRecord;

/// Prefixes of lines that never carry a record: the column header (`PC ...`),
/// divider rows (`----`) and comments.
const NON_RECORD_PREFIXES: [&str; 3] = ["PC", "-", "#"];

/// Returns true if `line` is a header, divider, comment or blank line.
#[must_use]
pub fn is_non_record_line(line: &str) -> bool {
    let line = line.trim();
    line.is_empty()
        || NON_RECORD_PREFIXES
            .iter()
            .any(|prefix| line.starts_with(prefix))
}

/// Normalize one raw log line into a commit record.
///
/// Underscores are removed first (`0000_1234` becomes `00001234`). If what
/// remains is a header, divider, comment or blank line the result is `None`;
/// otherwise it is lower-cased and split on runs of whitespace. No token is
/// ever dropped here; trailing RTL-only fields are handled by the comparator.
#[must_use]
pub fn normalize(line: &str) -> Option<CommitRecord> {
    // Classify after stripping so `_-1 ...` is a divider, like `-1 ...`.
    let stripped = line.replace('_', "");
    if is_non_record_line(&stripped) {
        return None;
    }

    let cleaned = stripped.to_lowercase();
    Some(CommitRecord::new(cleaned.split_whitespace()))
}
