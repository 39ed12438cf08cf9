use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::measures::{io_common::get_col_index_mapping, *};

pub fn read_excel_measures(path: String, source: &DataSource) -> MResult<Vec<RawRow>> {
    let wrange = get_range(&path, source)?;

    let mut iter = wrange.rows();
    let header: Vec<Option<String>> = iter
        .next()
        .context(EmptyExcelSnafu {})?
        .iter()
        .map(|dt| match dt {
            DataType::String(s) => Some(s.clone()),
            _ => None,
        })
        .collect();
    debug!("read_excel_measures: header: {:?}", header);
    let columns = get_col_index_mapping(source, &header, &path)?;

    let mut res: Vec<RawRow> = Vec::new();
    for (idx, row) in iter.enumerate() {
        debug!("read_excel_measures: idx: {:?} row: {:?}", idx, row);
        res.push(columns.raw_row(|col| row.get(col).and_then(read_cell)));
    }
    Ok(res)
}

// Beyond this value, a float may not hold an exact integer.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

// Numbers are often stored as floats in spreadsheets.
fn read_cell(cell: &DataType) -> Option<String> {
    match cell {
        DataType::Empty => None,
        DataType::String(s) => Some(s.clone()),
        DataType::Int(i) => Some(i.to_string()),
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < MAX_EXACT_FLOAT => {
            Some(format!("{}", *f as i64))
        }
        DataType::Float(f) => Some(f.to_string()),
        DataType::Bool(b) => Some(b.to_string()),
        // Dates and errors are kept visible so that validation can report them.
        other => Some(format!("{:?}", other)),
    }
}

fn get_range(path: &str, source: &DataSource) -> MResult<calamine::Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, &source.excel_worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = source.excel_worksheet_name.as_deref() {
        workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                name: worksheet_name,
            })?
            .context(OpeningExcelSnafu { path })
    } else {
        workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_as_text() {
        assert_eq!(read_cell(&DataType::Empty), None);
        assert_eq!(read_cell(&DataType::Float(1990.0)), Some("1990".to_string()));
        assert_eq!(read_cell(&DataType::Float(12.5)), Some("12.5".to_string()));
        assert_eq!(read_cell(&DataType::Int(42)), Some("42".to_string()));
        assert_eq!(
            read_cell(&DataType::String("Parks".to_string())),
            Some("Parks".to_string())
        );
    }

    #[test]
    fn large_floats_are_not_integers() {
        let text = read_cell(&DataType::Float(1e20)).unwrap();
        assert_eq!(text, 1e20f64.to_string());
        assert!(text.parse::<u64>().is_err());
        assert_eq!(
            read_cell(&DataType::Float(9_007_199_254_740_991.0)),
            Some("9007199254740991".to_string())
        );
    }

    fn workbook(worksheet: Option<&str>) -> (String, DataSource) {
        let path = concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/measures_xlsx/measures_xlsx.xlsx"
        );
        let source = DataSource::from_file(
            "xlsx".to_string(),
            path.to_string(),
            worksheet.map(|s| s.to_string()),
        );
        (path.to_string(), source)
    }

    #[test]
    fn first_worksheet_by_default() {
        let (path, source) = workbook(None);
        let rows = read_excel_measures(path, &source).unwrap();
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0].subject, Some("Harbor bond".to_string()));
        assert_eq!(rows[0].yes_votes, Some("600".to_string()));
        assert_eq!(rows[0].year, Some("2001".to_string()));
        assert_eq!(
            rows[0].keywords,
            vec![
                Some("Harbor".to_string()),
                Some("Bonds".to_string()),
                None,
                None,
                None
            ]
        );
        assert_eq!(rows[1].keywords[1], None);
        assert_eq!(rows[4].yes_votes, Some("many".to_string()));
    }

    #[test]
    fn named_worksheet() {
        let (path, source) = workbook(Some("Archive"));
        let rows = read_excel_measures(path, &source).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].subject, Some("Canal levy".to_string()));
        assert_eq!(rows[1].year, Some("1913".to_string()));
    }

    #[test]
    fn unknown_worksheet() {
        let (path, source) = workbook(Some("Ballots"));
        let res = read_excel_measures(path, &source);
        assert!(matches!(
            res,
            Err(MeasuresError::MissingWorksheet { ref name }) if name == "Ballots"
        ));
    }

    #[test]
    fn missing_workbook() {
        let source = DataSource::from_file("xlsx".to_string(), "none.xlsx".to_string(), None);
        let res = read_excel_measures("/nonexistent/none.xlsx".to_string(), &source);
        assert!(matches!(res, Err(MeasuresError::OpeningExcel { .. })));
    }
}
