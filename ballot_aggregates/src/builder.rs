pub use crate::config::*;

/// A builder for adding rows.
///
/// ```
/// pub use ballot_aggregates::builder::Builder;
/// pub use ballot_aggregates::AggregateRules;
/// # use ballot_aggregates::RowDefect;
///
/// let mut builder = Builder::new(&AggregateRules::DEFAULT_RULES);
///
/// builder.add_row_simple("Measure A", 100, 50, "Pass", 1990, &["Tax", "Tax"])?;
/// builder.add_row_simple("Measure A", 10, 5, "Pass", 1991, &["Tax"])?;
///
/// let result = builder.compute(None);
/// assert_eq!(result.subject_summaries[0].total_votes, 165);
/// assert_eq!(result.subject_summaries[0].top_keyword, "N/A");
///
/// # Ok::<(), RowDefect>(())
/// ```
pub struct Builder {
    pub(crate) _rules: AggregateRules,
    pub(crate) _rows: Vec<Row>,
}

impl Builder {
    pub fn new(rules: &AggregateRules) -> Builder {
        Builder {
            _rules: rules.clone(),
            _rows: Vec::new(),
        }
    }

    /// Adds a row from its typed values.
    ///
    /// Blank keywords are accepted and ignored by the aggregation.
    pub fn add_row_simple(
        &mut self,
        subject: &str,
        yes_votes: u64,
        no_votes: u64,
        pass_fail: &str,
        year: i32,
        keywords: &[&str],
    ) -> Result<(), RowDefect> {
        self.add_row(&Row {
            subject: subject.to_string(),
            yes_votes,
            no_votes,
            pass_fail: pass_fail.to_string(),
            year,
            keywords: keywords.iter().map(|k| Some(k.to_string())).collect(),
        })
    }

    /// Adds a row as read from a file. The row is only added if it is valid.
    pub fn add_raw_row(&mut self, raw: &RawRow) -> Result<(), RowDefect> {
        let row = crate::validate_row(raw)?;
        self._rows.push(row);
        Ok(())
    }

    pub fn add_row(&mut self, row: &Row) -> Result<(), RowDefect> {
        if row.subject.trim().is_empty() {
            return Err(RowDefect::MissingSubject);
        }
        if row.keywords.len() > KEYWORD_SLOTS {
            return Err(RowDefect::TooManyKeywords {
                count: row.keywords.len(),
            });
        }
        self._rows.push(row.clone());
        Ok(())
    }

    pub fn rows(&self) -> &[Row] {
        &self._rows
    }

    pub fn compute(&self, selected_keyword: Option<&str>) -> AggregateResult {
        crate::compute_with_rules(&self._rows, selected_keyword, &self._rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_invalid_rows() {
        let mut builder = Builder::new(&AggregateRules::DEFAULT_RULES);
        assert_eq!(
            builder.add_row_simple(" ", 1, 1, "Pass", 1990, &[]),
            Err(RowDefect::MissingSubject)
        );
        assert_eq!(
            builder.add_row_simple("A", 1, 1, "Pass", 1990, &["a", "b", "c", "d", "e", "f"]),
            Err(RowDefect::TooManyKeywords { count: 6 })
        );
        let raw = RawRow {
            subject: Some("B".to_string()),
            yes_votes: Some("NaN".to_string()),
            no_votes: Some("1".to_string()),
            pass_fail: Some("Fail".to_string()),
            year: Some("1990".to_string()),
            keywords: vec![],
        };
        assert_eq!(
            builder.add_raw_row(&raw),
            Err(RowDefect::NonNumeric {
                field: "yes votes",
                value: "NaN".to_string()
            })
        );
        assert!(builder.rows().is_empty());
    }

    #[test]
    fn builder_uses_its_rules() {
        let rules = AggregateRules {
            subject_top_count: 2,
            ..AggregateRules::DEFAULT_RULES
        };
        let mut builder = Builder::new(&rules);
        for (idx, subject) in ["A", "B", "C"].iter().enumerate() {
            builder
                .add_row_simple(subject, idx as u64, 0, "Pass", 2000, &["Tax"])
                .unwrap();
        }
        let res = builder.compute(None);
        let subjects: Vec<&str> = res
            .subject_summaries
            .iter()
            .map(|s| s.subject.as_str())
            .collect();
        assert_eq!(subjects, vec!["C", "B"]);
        assert_eq!(builder.compute(Some("Tax")).subject_summaries.len(), 3);
    }
}
