// Primitives for reading CSV files.

use crate::measures::{io_common::get_col_index_mapping, *};

/// Reads the rows of a CSV file with a header row.
///
/// Lines may be shorter than the header: the missing cells are treated as absent.
pub fn read_csv_measures(path: String, source: &DataSource) -> MResult<Vec<RawRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(&path)
        .context(CsvOpenSnafu { path: path.clone() })?;

    let header: Vec<Option<String>> = rdr
        .headers()
        .context(CsvLineParseSnafu { lineno: 1usize })?
        .iter()
        .map(|s| Some(s.to_string()))
        .collect();
    debug!("read_csv_measures: header: {:?}", header);
    let columns = get_col_index_mapping(source, &header, &path)?;

    let mut res: Vec<RawRow> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The first line is the header.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        debug!("read_csv_measures: lineno: {:?} row: {:?}", lineno, line);
        res.push(columns.raw_row(|col| line.get(col).map(|s| s.to_string())));
    }
    Ok(res)
}
