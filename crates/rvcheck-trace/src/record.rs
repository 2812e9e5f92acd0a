use std::fmt;

use crate::normalize;

/// One retired instruction in canonical form.
///
/// Tokens are lowercase with hex group separators removed, in the order they
/// appeared on the line: typically `pc (encoding) kind index-or-addr value`,
/// with an optional trailing cycle count on RTL records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitRecord {
    tokens: Box<[String]>,
}

impl CommitRecord {
    /// Build a record from already-normalized tokens.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Program counter token.
    #[must_use]
    pub fn pc(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    /// Instruction encoding token, still parenthesized.
    #[must_use]
    pub fn encoding(&self) -> Option<&str> {
        self.tokens.get(1).map(String::as_str)
    }
}

impl fmt::Display for CommitRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens.join(" "))
    }
}

/// An ordered commit trace from one log.
///
/// Order is retirement order. Each record remembers the 1-based line of the
/// log it came from so divergences can point back into the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    records: Vec<CommitRecord>,
    source_lines: Vec<usize>,
    skipped_lines: usize,
}

impl Trace {
    /// Normalize every line of `text` into a trace.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::from_lines(text.lines())
    }

    /// Normalize a sequence of raw lines into a trace.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = TraceBuilder::default();
        for line in lines {
            builder.push_line(line.as_ref());
        }
        builder.finish()
    }

    /// Wrap records that were normalized elsewhere. Source lines are numbered
    /// consecutively from 1.
    #[must_use]
    pub fn from_records(records: Vec<CommitRecord>) -> Self {
        let source_lines = (1..=records.len()).collect();
        Self {
            records,
            source_lines,
            skipped_lines: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[CommitRecord] {
        &self.records
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&CommitRecord> {
        self.records.get(index)
    }

    /// Source line (1-based) of the record at `index`.
    #[must_use]
    pub fn source_line(&self, index: usize) -> Option<usize> {
        self.source_lines.get(index).copied()
    }

    /// Number of raw lines that produced no record (headers, blanks, comments).
    #[must_use]
    pub const fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CommitRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a CommitRecord;
    type IntoIter = std::slice::Iter<'a, CommitRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Incremental trace construction, one raw line at a time.
#[derive(Debug, Default)]
pub(crate) struct TraceBuilder {
    trace: Trace,
    line_no: usize,
}

impl TraceBuilder {
    pub(crate) fn push_line(&mut self, line: &str) {
        self.line_no += 1;
        match normalize(line) {
            Some(record) => {
                self.trace.records.push(record);
                self.trace.source_lines.push(self.line_no);
            }
            None => self.trace.skipped_lines += 1,
        }
    }

    pub(crate) fn finish(self) -> Trace {
        self.trace
    }
}
