mod config;
pub mod builder;
pub mod manual;
pub mod selection;

use log::{debug, info};

use std::{
    collections::{BTreeSet, HashMap, HashSet},
    ops::AddAssign,
};

pub use crate::config::*;

// **** Private structures ****

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct VoteCount(u64);

impl VoteCount {
    const EMPTY: VoteCount = VoteCount(0);
}

impl AddAssign for VoteCount {
    fn add_assign(&mut self, rhs: VoteCount) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

// The position of a keyword in the histogram. Lower means more frequent.
#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct Rank(usize);

// Invariant: keywords are trimmed and never empty.
#[derive(Eq, PartialEq, Debug, Clone)]
struct SubjectRollup {
    subject: String,
    total: VoteCount,
    pass_fail: String,
    keywords: HashSet<String>,
}

/// The rows accepted by `validate_rows`, and the ones that were set aside.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CheckedRows {
    pub rows: Vec<Row>,
    pub rejected: Vec<MalformedRow>,
}

/// Computes all the views with the default rules.
///
/// See `compute_with_rules`.
pub fn compute(rows: &[Row], selected_keyword: Option<&str>) -> AggregateResult {
    compute_with_rules(rows, selected_keyword, &AggregateRules::DEFAULT_RULES)
}

/// Computes the histogram, the subject rollups and the stream series for the given rows.
///
/// Arguments:
/// * `rows` the rows to aggregate. They are only read.
/// * `selected_keyword` the keyword currently selected, if any. An empty or blank
/// selection is the same as no selection.
/// * `rules` the thresholds to apply
///
/// Everything is recomputed from scratch: calling this function twice with the same
/// arguments returns the same result.
pub fn compute_with_rules(
    rows: &[Row],
    selected_keyword: Option<&str>,
    rules: &AggregateRules,
) -> AggregateResult {
    let selected = normalize_selection(selected_keyword);
    info!(
        "Processing {:?} rows, selected keyword: {:?}, rules: {:?}",
        rows.len(),
        selected,
        rules
    );

    let keyword_counts = count_keywords(rows);
    let filtered_keyword_counts: Vec<KeywordCount> = keyword_counts
        .iter()
        .filter(|kc| kc.count > rules.histogram_min_count)
        .cloned()
        .collect();
    let histogram_entries = sorted_by_count(&filtered_keyword_counts);
    debug!(
        "compute: {:?} distinct keywords, {:?} in the histogram",
        keyword_counts.len(),
        histogram_entries.len()
    );

    let base_top_keywords: Vec<String> = sorted_by_count(&keyword_counts)
        .into_iter()
        .take(rules.stream_top_keywords)
        .map(|kc| kc.keyword)
        .collect();
    let top_keywords = inject_selection(
        base_top_keywords,
        selected.as_deref(),
        rules.stream_top_keywords,
    );

    let ranks: HashMap<&str, Rank> = histogram_entries
        .iter()
        .enumerate()
        .map(|(idx, kc)| (kc.keyword.as_str(), Rank(idx)))
        .collect();
    let rollups = rollup_subjects(rows);
    let subject_summaries = select_subjects(
        &rollups,
        selected.as_deref(),
        &ranks,
        rules.subject_top_count,
    );
    debug!(
        "compute: {:?} subjects, {:?} selected",
        rollups.len(),
        subject_summaries.len()
    );

    let year_domain = year_domain(rows);
    let stream_series = build_stream_series(rows, &top_keywords, &year_domain);

    AggregateResult {
        selected_keyword: selected,
        keyword_counts,
        filtered_keyword_counts,
        histogram_entries,
        subject_summaries,
        year_domain,
        stream_series,
        top_keywords,
    }
}

fn normalize_selection(selected_keyword: Option<&str>) -> Option<String> {
    selected_keyword
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

// Counts are returned in the order the keywords are first seen.
fn count_keywords(rows: &[Row]) -> Vec<KeywordCount> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<KeywordCount> = Vec::new();
    for row in rows {
        for keyword in row.trimmed_keywords() {
            if let Some(idx) = positions.get(keyword) {
                counts[*idx].count += 1;
            } else {
                positions.insert(keyword, counts.len());
                counts.push(KeywordCount {
                    keyword: keyword.to_string(),
                    count: 1,
                });
            }
        }
    }
    counts
}

// The sort is stable: keywords with the same count keep their relative order.
fn sorted_by_count(counts: &[KeywordCount]) -> Vec<KeywordCount> {
    let mut res = counts.to_vec();
    res.sort_by(|a, b| b.count.cmp(&a.count));
    res
}

/// Makes sure that the selected keyword is part of the stream view.
///
/// When the list is full, the last keyword is replaced by the selection. It is not
/// kept anywhere else.
fn inject_selection(
    mut top_keywords: Vec<String>,
    selected: Option<&str>,
    capacity: usize,
) -> Vec<String> {
    let keyword = match selected {
        Some(k) => k,
        None => return top_keywords,
    };
    if top_keywords.iter().any(|k| k == keyword) {
        return top_keywords;
    }
    if capacity > 0 && top_keywords.len() >= capacity {
        let last = top_keywords.len() - 1;
        debug!(
            "inject_selection: replacing {:?} with the selection {:?}",
            top_keywords[last], keyword
        );
        top_keywords[last] = keyword.to_string();
    } else {
        debug!("inject_selection: appending the selection {:?}", keyword);
        top_keywords.push(keyword.to_string());
    }
    top_keywords
}

// Subjects are returned in the order they are first seen.
fn rollup_subjects(rows: &[Row]) -> Vec<SubjectRollup> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut rollups: Vec<SubjectRollup> = Vec::new();
    for row in rows {
        let subject = row.subject.trim();
        let idx = match positions.get(subject) {
            Some(idx) => *idx,
            None => {
                positions.insert(subject, rollups.len());
                rollups.push(SubjectRollup {
                    subject: subject.to_string(),
                    total: VoteCount::EMPTY,
                    pass_fail: row.pass_fail.clone(),
                    keywords: HashSet::new(),
                });
                rollups.len() - 1
            }
        };
        let rollup = &mut rollups[idx];
        rollup.total += VoteCount(row.total_votes());
        // The last row wins.
        rollup.pass_fail = row.pass_fail.clone();
        for keyword in row.trimmed_keywords() {
            rollup.keywords.insert(keyword.to_string());
        }
    }
    rollups
}

/// The keyword of the subject with the best rank in the histogram.
fn top_keyword(rollup: &SubjectRollup, ranks: &HashMap<&str, Rank>) -> String {
    rollup
        .keywords
        .iter()
        .filter_map(|k| ranks.get(k.as_str()).map(|rank| (*rank, k)))
        .min()
        .map(|(_, k)| k.clone())
        .unwrap_or_else(|| NO_TOP_KEYWORD.to_string())
}

fn select_subjects(
    rollups: &[SubjectRollup],
    selected: Option<&str>,
    ranks: &HashMap<&str, Rank>,
    top_count: usize,
) -> Vec<SubjectSummary> {
    let mut chosen: Vec<&SubjectRollup> = match selected {
        Some(keyword) => rollups
            .iter()
            .filter(|r| r.keywords.contains(keyword))
            .collect(),
        None => rollups.iter().collect(),
    };
    chosen.sort_by(|a, b| b.total.cmp(&a.total));
    // Only the unfiltered view is truncated.
    if selected.is_none() {
        chosen.truncate(top_count);
    }
    chosen
        .iter()
        .map(|r| SubjectSummary {
            subject: r.subject.clone(),
            total_votes: r.total.0,
            pass_fail: r.pass_fail.clone(),
            top_keyword: top_keyword(r, ranks),
        })
        .collect()
}

fn year_domain(rows: &[Row]) -> Vec<i32> {
    let years: BTreeSet<i32> = rows.iter().map(|r| r.year).collect();
    years.into_iter().collect()
}

// Every series covers all the years of the domain, with zeros where the keyword
// does not appear.
fn build_stream_series(rows: &[Row], keywords: &[String], years: &[i32]) -> Vec<StreamSeries> {
    let keyword_positions: HashMap<&str, usize> = keywords
        .iter()
        .enumerate()
        .map(|(idx, k)| (k.as_str(), idx))
        .collect();
    let year_positions: HashMap<i32, usize> =
        years.iter().enumerate().map(|(idx, y)| (*y, idx)).collect();

    let mut counts: Vec<Vec<u64>> = vec![vec![0; years.len()]; keywords.len()];
    for row in rows {
        let year_idx = match year_positions.get(&row.year) {
            Some(idx) => *idx,
            None => continue,
        };
        for keyword in row.trimmed_keywords() {
            if let Some(keyword_idx) = keyword_positions.get(keyword) {
                counts[*keyword_idx][year_idx] += 1;
            }
        }
    }

    keywords
        .iter()
        .zip(counts)
        .map(|(keyword, year_counts)| StreamSeries {
            keyword: keyword.clone(),
            year_counts: years.iter().cloned().zip(year_counts).collect(),
        })
        .collect()
}

/// Checks the raw rows and converts the valid ones.
///
/// The rows that cannot be used are not part of the output and are returned with
/// the reason for their rejection, in input order.
pub fn validate_rows(raw_rows: &[RawRow]) -> CheckedRows {
    debug!("validate_rows: {:?} raw rows", raw_rows.len());
    let mut rows: Vec<Row> = Vec::new();
    let mut rejected: Vec<MalformedRow> = Vec::new();
    for (index, raw) in raw_rows.iter().enumerate() {
        match validate_row(raw) {
            Ok(row) => rows.push(row),
            Err(defect) => {
                debug!("validate_rows: row {:?} rejected: {}", index, defect);
                rejected.push(MalformedRow { index, defect });
            }
        }
    }
    CheckedRows { rows, rejected }
}

pub fn validate_row(raw: &RawRow) -> Result<Row, RowDefect> {
    let subject = match raw.subject.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => return Err(RowDefect::MissingSubject),
    };
    let yes_votes = parse_number::<u64>(&raw.yes_votes, "yes votes")?;
    let no_votes = parse_number::<u64>(&raw.no_votes, "no votes")?;
    if yes_votes.checked_add(no_votes).is_none() {
        return Err(RowDefect::VoteOverflow {
            yes_votes,
            no_votes,
        });
    }
    let year = parse_number::<i32>(&raw.year, "year")?;
    if raw.keywords.len() > KEYWORD_SLOTS {
        return Err(RowDefect::TooManyKeywords {
            count: raw.keywords.len(),
        });
    }
    Ok(Row {
        subject,
        yes_votes,
        no_votes,
        pass_fail: raw
            .pass_fail
            .as_deref()
            .map(str::trim)
            .unwrap_or("")
            .to_string(),
        year,
        keywords: raw.keywords.clone(),
    })
}

fn parse_number<T: std::str::FromStr>(
    value: &Option<String>,
    field: &'static str,
) -> Result<T, RowDefect> {
    let s = match value.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return Err(RowDefect::MissingField { field }),
    };
    s.parse::<T>().map_err(|_| RowDefect::NonNumeric {
        field,
        value: s.to_string(),
    })
}
