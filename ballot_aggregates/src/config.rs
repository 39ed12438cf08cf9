// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The number of keyword slots carried by a row.
pub const KEYWORD_SLOTS: usize = 5;

/// The top keyword reported for a subject when none of its keywords
/// survives the histogram filter.
pub const NO_TOP_KEYWORD: &str = "N/A";

/// One appearance of a ballot measure, with all the fields already typed.
///
/// Rows are never modified by the aggregation: the same slice can be
/// aggregated again for every change of selection.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Row {
    pub subject: String,
    pub yes_votes: u64,
    pub no_votes: u64,
    pub pass_fail: String,
    pub year: i32,
    /// The keyword slots, in column order. Blank or absent slots are kept as they are
    /// and ignored when aggregating.
    pub keywords: Vec<Option<String>>,
}

impl Row {
    /// Saturates at `u64::MAX`. Validated rows never reach it.
    pub fn total_votes(&self) -> u64 {
        self.yes_votes.saturating_add(self.no_votes)
    }

    /// The non-empty keywords of this row, trimmed, in slot order.
    /// Duplicates are preserved.
    pub fn trimmed_keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords
            .iter()
            .filter_map(|k| k.as_deref())
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// A row as read from a tabular source, before any validation.
///
/// In most cases, it is enough to use the higher-level builder API.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RawRow {
    pub subject: Option<String>,
    pub yes_votes: Option<String>,
    pub no_votes: Option<String>,
    pub pass_fail: Option<String>,
    pub year: Option<String>,
    pub keywords: Vec<Option<String>>,
}

// ******** Output data structures *********

#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: u64,
}

/// The rollup of all the rows sharing the same (trimmed) subject.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SubjectSummary {
    pub subject: String,
    pub total_votes: u64,
    /// The outcome of the last row seen for this subject.
    pub pass_fail: String,
    /// The globally most frequent keyword of this subject among the keywords of the
    /// histogram, or `NO_TOP_KEYWORD`.
    pub top_keyword: String,
}

/// Occurrences of one keyword per year.
///
/// All the series of a result share the same years, in increasing order.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct StreamSeries {
    pub keyword: String,
    pub year_counts: Vec<(i32, u64)>,
}

impl StreamSeries {
    pub fn total(&self) -> u64 {
        self.year_counts.iter().map(|(_, c)| c).sum()
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AggregateResult {
    /// The normalized selection this result was computed for.
    pub selected_keyword: Option<String>,
    /// All the keywords, in the order they were first encountered.
    pub keyword_counts: Vec<KeywordCount>,
    /// The keywords above the histogram threshold, in the order they were first encountered.
    pub filtered_keyword_counts: Vec<KeywordCount>,
    /// The filtered keywords, by decreasing count.
    pub histogram_entries: Vec<KeywordCount>,
    pub subject_summaries: Vec<SubjectSummary>,
    /// All the distinct years of the rows, in increasing order.
    pub year_domain: Vec<i32>,
    pub stream_series: Vec<StreamSeries>,
    /// The keywords of the stream view, by rank, with the selection injected if needed.
    pub top_keywords: Vec<String>,
}

impl AggregateResult {
    pub fn keyword_count(&self, keyword: &str) -> Option<u64> {
        self.keyword_counts
            .iter()
            .find(|kc| kc.keyword == keyword)
            .map(|kc| kc.count)
    }

    pub fn series(&self, keyword: &str) -> Option<&StreamSeries> {
        self.stream_series.iter().find(|s| s.keyword == keyword)
    }
}

/// Errors that make a row unusable for the aggregation.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RowDefect {
    MissingSubject,
    MissingField { field: &'static str },
    NonNumeric { field: &'static str, value: String },
    TooManyKeywords { count: usize },
    VoteOverflow { yes_votes: u64, no_votes: u64 },
}

impl Display for RowDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowDefect::MissingSubject => write!(f, "missing subject"),
            RowDefect::MissingField { field } => write!(f, "missing field {}", field),
            RowDefect::NonNumeric { field, value } => {
                write!(f, "field {} is not a number: {:?}", field, value)
            }
            RowDefect::TooManyKeywords { count } => write!(
                f,
                "{} keyword slots found, at most {} are allowed",
                count, KEYWORD_SLOTS
            ),
            RowDefect::VoteOverflow {
                yes_votes,
                no_votes,
            } => write!(
                f,
                "the total of {} yes votes and {} no votes does not fit in a vote count",
                yes_votes, no_votes
            ),
        }
    }
}

/// A row that was rejected, with its position in the input.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct MalformedRow {
    pub index: usize,
    pub defect: RowDefect,
}

impl Error for MalformedRow {}

impl Display for MalformedRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed row {}: {}", self.index, self.defect)
    }
}

// ********* Configuration **********

/// The thresholds applied by the aggregation.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AggregateRules {
    /// A keyword enters the histogram if its count is strictly above this value.
    pub histogram_min_count: u64,
    /// The number of keywords displayed in the stream view.
    pub stream_top_keywords: usize,
    /// The number of subjects kept when no keyword is selected.
    /// All the matching subjects are kept when a keyword is selected.
    pub subject_top_count: usize,
}

impl AggregateRules {
    pub const DEFAULT_RULES: AggregateRules = AggregateRules {
        histogram_min_count: 3,
        stream_top_keywords: 30,
        subject_top_count: 25,
    };
}

impl Default for AggregateRules {
    fn default() -> Self {
        AggregateRules::DEFAULT_RULES
    }
}
