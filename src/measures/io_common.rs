use std::collections::HashMap;
use std::path::Path;

use crate::measures::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// The positions of the columns of a data source in the rows of a file.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColumnIndexes {
    subject: usize,
    yes_votes: usize,
    no_votes: usize,
    pass_fail: usize,
    year: usize,
    // A keyword column missing from the file is an empty slot.
    keywords: Vec<Option<usize>>,
}

impl ColumnIndexes {
    /// Assembles a raw row, given an accessor for the cell of each column.
    pub fn raw_row<F>(&self, cell: F) -> RawRow
    where
        F: Fn(usize) -> Option<String>,
    {
        RawRow {
            subject: cell(self.subject),
            yes_votes: cell(self.yes_votes),
            no_votes: cell(self.no_votes),
            pass_fail: cell(self.pass_fail),
            year: cell(self.year),
            keywords: self
                .keywords
                .iter()
                .map(|idx_o| idx_o.and_then(&cell))
                .collect(),
        }
    }
}

/// Given the header of a file (names of each of the columns), finds the position of each
/// of the columns of the data source.
pub fn get_col_index_mapping(
    source: &DataSource,
    header: &[Option<String>],
    path: &str,
) -> MResult<ColumnIndexes> {
    let col_names: HashMap<String, usize> = header
        .iter()
        .enumerate()
        .filter_map(|(idx, x)| x.as_ref().map(|s| (s.trim().to_string(), idx)))
        .collect();

    debug!("get_col_index_mapping: col_names: {:?}", col_names);

    let required = |cname: &str| -> MResult<usize> {
        col_names
            .get(cname.trim())
            .cloned()
            .context(MissingColumnSnafu {
                column_name: cname,
                path,
            })
    };

    let mut keywords: Vec<Option<usize>> = Vec::new();
    for cname in source.keyword_columns()? {
        let idx_o = col_names.get(cname.trim()).cloned();
        if idx_o.is_none() {
            debug!(
                "get_col_index_mapping: keyword column {:?} not found in {}",
                cname, path
            );
        }
        keywords.push(idx_o);
    }

    Ok(ColumnIndexes {
        subject: required(source.subject_column())?,
        yes_votes: required(source.yes_votes_column())?,
        no_votes: required(source.no_votes_column())?,
        pass_fail: required(source.pass_fail_column())?,
        year: required(source.year_column())?,
        keywords,
    })
}
