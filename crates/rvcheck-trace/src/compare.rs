//! Positional comparison of an RTL trace against a golden trace.

use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::{CommitRecord, Trace};

/// Largest number of trailing RTL-only records accepted as a benign
/// simulation exit sequence (e.g. writes to the exit-status location after the
/// reference model stopped logging).
pub const MAX_BENIGN_TRAILING: usize = 10;

/// Configuration for trace comparison behavior.
#[derive(Debug, Clone)]
pub struct CompareConfig {
    /// Trailing RTL records tolerated after the golden trace ends.
    pub max_trailing: usize,
    /// Drop the last field of an RTL record that has more fields than its
    /// golden counterpart (an optional cycle-count column).
    pub drop_rtl_extra_field: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            max_trailing: MAX_BENIGN_TRAILING,
            drop_rtl_extra_field: true,
        }
    }
}

/// First token position where two records disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDiff {
    /// 0-based token position.
    pub position: usize,
    /// Golden token, absent if the golden record is shorter.
    pub expected: Option<String>,
    /// RTL token, absent if the RTL record is shorter.
    pub actual: Option<String>,
}

impl fmt::Display for FieldDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field {}: expected {}, got {}",
            self.position + 1,
            self.expected.as_deref().unwrap_or("<none>"),
            self.actual.as_deref().unwrap_or("<none>"),
        )
    }
}

/// Short machine-readable reason for a failed comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivergenceKind {
    LengthDeficit,
    TokenMismatch,
    ExcessTrailing,
}

impl DivergenceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LengthDeficit => "length-deficit",
            Self::TokenMismatch => "token-mismatch",
            Self::ExcessTrailing => "excess-trailing",
        }
    }
}

impl fmt::Display for DivergenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an RTL trace failed to match the golden trace.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Divergence {
    /// RTL stopped before covering every golden record.
    #[error("RTL log stopped earlier than golden log (RTL lines: {rtl_len}, golden lines: {gold_len})")]
    LengthDeficit { rtl_len: usize, gold_len: usize },
    /// Records at `index` differ.
    #[error("mismatch at line {}", .index + 1)]
    TokenMismatch {
        /// 0-based record index.
        index: usize,
        expected: CommitRecord,
        /// Original RTL record, before any field truncation.
        actual: CommitRecord,
        field: Option<FieldDiff>,
        /// Source lines of the two records in their logs.
        gold_line: Option<usize>,
        rtl_line: Option<usize>,
    },
    /// Too many RTL records after the golden trace ended.
    #[error("RTL has too many extra lines ({count})")]
    ExcessTrailing { count: usize, first: CommitRecord },
}

impl Divergence {
    #[must_use]
    pub const fn kind(&self) -> DivergenceKind {
        match self {
            Self::LengthDeficit { .. } => DivergenceKind::LengthDeficit,
            Self::TokenMismatch { .. } => DivergenceKind::TokenMismatch,
            Self::ExcessTrailing { .. } => DivergenceKind::ExcessTrailing,
        }
    }
}

/// Result of comparing two traces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceComparison {
    /// Records that matched the golden trace.
    pub matched: usize,
    /// Trailing RTL records ignored as a benign exit sequence.
    pub trailing: Vec<CommitRecord>,
    /// First divergence, if the traces do not match.
    pub divergence: Option<Divergence>,
}

impl TraceComparison {
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        self.divergence.is_none()
    }

    fn fail(matched: usize, divergence: Divergence) -> Self {
        Self {
            matched,
            trailing: Vec::new(),
            divergence: Some(divergence),
        }
    }

    /// Convert into a `Result`, keeping the benign trailing records on success.
    ///
    /// # Errors
    ///
    /// Returns the divergence if the comparison failed.
    pub fn into_result(self) -> Result<Vec<CommitRecord>, Divergence> {
        match self.divergence {
            Some(divergence) => Err(divergence),
            None => Ok(self.trailing),
        }
    }
}

/// Compare `rtl` against `gold` with the default tolerances.
#[must_use]
pub fn compare(rtl: &Trace, gold: &Trace) -> TraceComparison {
    compare_with_config(rtl, gold, &CompareConfig::default())
}

/// Compare `rtl` against `gold` position by position.
///
/// Fails fast on the first problem:
/// - RTL shorter than golden is always a length deficit;
/// - the first record pair that differs (after dropping an RTL-only trailing
///   field) is a token mismatch;
/// - more than `max_trailing` RTL records past the golden end is excess.
///
/// A smaller RTL tail passes, with the ignored records returned in
/// [`TraceComparison::trailing`].
#[must_use]
pub fn compare_with_config(rtl: &Trace, gold: &Trace, config: &CompareConfig) -> TraceComparison {
    debug!(rtl = rtl.len(), gold = gold.len(), "comparing traces");

    if rtl.len() < gold.len() {
        return TraceComparison::fail(
            0,
            Divergence::LengthDeficit {
                rtl_len: rtl.len(),
                gold_len: gold.len(),
            },
        );
    }

    for (index, (act, exp)) in rtl.iter().zip(gold.iter()).enumerate() {
        if !records_match(act, exp, config) {
            return TraceComparison::fail(
                index,
                Divergence::TokenMismatch {
                    index,
                    expected: exp.clone(),
                    actual: act.clone(),
                    field: first_field_diff(comparable_tokens(act, exp, config), exp.tokens()),
                    gold_line: gold.source_line(index),
                    rtl_line: rtl.source_line(index),
                },
            );
        }
    }

    let matched = gold.len();
    let extra = &rtl.records()[matched..];
    if extra.len() > config.max_trailing {
        return TraceComparison::fail(
            matched,
            Divergence::ExcessTrailing {
                count: extra.len(),
                first: extra[0].clone(),
            },
        );
    }
    if !extra.is_empty() {
        debug!(count = extra.len(), "ignoring trailing RTL records");
    }

    TraceComparison {
        matched,
        trailing: extra.to_vec(),
        divergence: None,
    }
}

/// RTL tokens as seen by the comparison: the last field is dropped only when
/// the RTL record is strictly longer than the golden one.
fn comparable_tokens<'a>(
    act: &'a CommitRecord,
    exp: &CommitRecord,
    config: &CompareConfig,
) -> &'a [String] {
    let tokens = act.tokens();
    if config.drop_rtl_extra_field && act.len() > exp.len() {
        &tokens[..tokens.len() - 1]
    } else {
        tokens
    }
}

fn records_match(act: &CommitRecord, exp: &CommitRecord, config: &CompareConfig) -> bool {
    comparable_tokens(act, exp, config) == exp.tokens()
}

fn first_field_diff(actual: &[String], expected: &[String]) -> Option<FieldDiff> {
    let len = actual.len().max(expected.len());
    (0..len).find_map(|position| {
        let act = actual.get(position);
        let exp = expected.get(position);
        (act != exp).then(|| FieldDiff {
            position,
            expected: exp.cloned(),
            actual: act.cloned(),
        })
    })
}
