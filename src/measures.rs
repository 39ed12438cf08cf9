use log::{debug, info, warn};

use ballot_aggregates::selection::Selection;
use ballot_aggregates::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_xlsx;

use crate::measures::config_reader::*;

#[derive(Debug, Snafu)]
pub enum MeasuresError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook has no worksheet or no header row"))]
    EmptyExcel {},
    #[snafu(display("Worksheet {name} not found"))]
    MissingWorksheet { name: String },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Could not parse line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Column {column_name:?} not found in the header of {path}"))]
    MissingColumn { column_name: String, path: String },
    #[snafu(display("Error reading {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading the commands"))]
    ReadingCommands { source: std::io::Error },
    #[snafu(display("Unknown provider {provider:?}, expected csv or xlsx"))]
    UnknownProvider { provider: String },
    #[snafu(display("No data source: use --input or a configuration file"))]
    MissingInput {},
    #[snafu(display("Configuration file {path} has no parent directory"))]
    MissingParentDir { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type MResult<T> = Result<T, MeasuresError>;

fn counts_to_json(counts: &[KeywordCount]) -> JSMap<String, JSValue> {
    let mut m: JSMap<String, JSValue> = JSMap::new();
    for kc in counts {
        m.insert(kc.keyword.clone(), json!(kc.count));
    }
    m
}

fn result_to_json(res: &AggregateResult) -> JSValue {
    let histogram: Vec<JSValue> = res
        .histogram_entries
        .iter()
        .map(|kc| json!({"keyword": kc.keyword, "count": kc.count}))
        .collect();

    let subjects: Vec<JSValue> = res
        .subject_summaries
        .iter()
        .map(|s| {
            json!({
                "subject": s.subject,
                "totalVotes": s.total_votes,
                "passFail": s.pass_fail,
                "topKeyword": s.top_keyword
            })
        })
        .collect();

    let mut stream: Vec<JSValue> = Vec::new();
    for series in res.stream_series.iter() {
        let counts: Vec<JSValue> = series
            .year_counts
            .iter()
            .map(|(year, count)| json!({"year": year, "count": count}))
            .collect();
        stream.push(json!({"keyword": series.keyword, "counts": counts}));
    }

    json!({
        "keywordCounts": counts_to_json(&res.keyword_counts),
        "filteredKeywordCounts": counts_to_json(&res.filtered_keyword_counts),
        "histogram": histogram,
        "subjects": subjects,
        "years": res.year_domain,
        "stream": stream,
        "topKeywords": res.top_keywords,
    })
}

fn build_summary_js(
    config: &DashboardConfig,
    rules: &AggregateRules,
    res: &AggregateResult,
    skipped_rows: usize,
) -> JSValue {
    let c = OutputConfig {
        dataset_name: config.output_settings.dataset_name.clone(),
        selected_keyword: res.selected_keyword.clone(),
        rules: RulesConfig::from(rules),
    };
    json!({
        "config": c,
        "skippedRows": skipped_rows,
        "results": result_to_json(res) })
}

fn read_measure_data(root_path: &Path, source: &DataSource) -> MResult<Vec<RawRow>> {
    let p: PathBuf = root_path.join(&source.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read measures file {:?}", p2);
    match source.provider.as_str() {
        "csv" => io_csv::read_csv_measures(p2, source),
        "xlsx" => io_xlsx::read_excel_measures(p2, source),
        x => UnknownProviderSnafu { provider: x }.fail(),
    }
}

/// Reads all the data sources and keeps the valid rows.
///
/// Returns the rows and the number of rows that were skipped.
fn load_rows(config: &DashboardConfig, root_path: &Path) -> MResult<(Vec<Row>, usize)> {
    if config.data_sources.is_empty() {
        return MissingInputSnafu {}.fail();
    }
    info!(
        "Loading dataset {:?}: {}",
        config.output_settings.dataset_name,
        config
            .output_settings
            .dataset_description
            .as_deref()
            .unwrap_or("(no description)")
    );
    let mut raw_rows: Vec<RawRow> = Vec::new();
    for source in config.data_sources.iter() {
        let mut file_data = read_measure_data(root_path, source)?;
        raw_rows.append(&mut file_data);
    }

    let checked = validate_rows(&raw_rows);
    for malformed in checked.rejected.iter() {
        warn!("Skipping {}", malformed);
    }
    if !checked.rejected.is_empty() {
        warn!(
            "{} rows out of {} were skipped",
            checked.rejected.len(),
            raw_rows.len()
        );
    }
    info!("Loaded {} rows", checked.rows.len());
    Ok((checked.rows, checked.rejected.len()))
}

/// Builds the configuration, either from a configuration file or from a single input file.
///
/// Returns the configuration and the directory the data paths are relative to.
pub fn load_config(
    config_path: Option<String>,
    input: Option<String>,
    input_type: Option<String>,
    excel_worksheet_name: Option<String>,
) -> MResult<(DashboardConfig, PathBuf)> {
    let (mut config, root_path) = match config_path {
        Some(path) => {
            let config = read_config(&path)?;
            let root_p = Path::new(path.as_str())
                .parent()
                .context(MissingParentDirSnafu { path: path.clone() })?;
            (config, root_p.to_path_buf())
        }
        None => {
            let input_path = input.clone().context(MissingInputSnafu {})?;
            let config = DashboardConfig {
                output_settings: OutputSettings {
                    dataset_name: io_common::simplify_file_name(&input_path),
                    dataset_description: None,
                    output_directory: None,
                },
                data_sources: vec![],
                rules: None,
                selected_keyword: None,
            };
            (config, PathBuf::from("."))
        }
    };

    // The input given on the command line replaces the sources of the configuration.
    if let Some(input_path) = input {
        let provider = input_type.unwrap_or_else(|| "csv".to_string());
        let file_path = std::env::current_dir()
            .map(|d| d.join(&input_path))
            .unwrap_or_else(|_| PathBuf::from(&input_path));
        config.data_sources = vec![DataSource::from_file(
            provider,
            file_path.display().to_string(),
            excel_worksheet_name,
        )];
    }
    Ok((config, root_path))
}

fn write_summary(out_path: &str, contents: &str) -> MResult<()> {
    if out_path == "stdout" {
        println!("{}", contents);
    } else {
        fs::write(out_path, contents).context(WritingOutputSnafu { path: out_path })?;
        info!("Summary written to {:?}", out_path);
    }
    Ok(())
}

/// Computes the summary once, for the selection of the configuration.
pub fn run_dashboard(
    config: &DashboardConfig,
    root_path: &Path,
    check_summary_path: Option<String>,
    out_path: Option<String>,
) -> MResult<()> {
    let rules = validate_rules(&config.rules)?;
    let (rows, skipped_rows) = load_rows(config, root_path)?;

    let result = compute_with_rules(&rows, config.selected_keyword.as_deref(), &rules);
    debug!("result: {:?}", result);

    // Assemble the final json
    let result_js = build_summary_js(config, &rules, &result, skipped_rows);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    let out = out_path.or_else(|| {
        config.output_settings.output_directory.as_ref().map(|dir| {
            root_path
                .join(dir)
                .join("summary.json")
                .display()
                .to_string()
        })
    });
    if let Some(out) = out {
        write_summary(&out, &pretty_js_stats)?;
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between computed summary and reference summary")
        }
    }

    Ok(())
}

fn write_report<W: Write>(output: &mut W, res: &AggregateResult) -> std::io::Result<()> {
    match &res.selected_keyword {
        Some(keyword) => writeln!(output, "selected: {}", keyword)?,
        None => writeln!(output, "selected: none")?,
    }
    let histogram: Vec<String> = res
        .histogram_entries
        .iter()
        .take(5)
        .map(|kc| format!("{} ({})", kc.keyword, kc.count))
        .collect();
    writeln!(
        output,
        "histogram: {} keywords: {}",
        res.histogram_entries.len(),
        histogram.join(", ")
    )?;
    writeln!(output, "subjects: {}", res.subject_summaries.len())?;
    for s in res.subject_summaries.iter().take(5) {
        writeln!(
            output,
            "  {}: {} votes, {}, top keyword: {}",
            s.subject, s.total_votes, s.pass_fail, s.top_keyword
        )?;
    }
    let years = match (res.year_domain.first(), res.year_domain.last()) {
        (Some(first), Some(last)) => format!("{}-{}", first, last),
        _ => "no years".to_string(),
    };
    writeln!(
        output,
        "stream: {} keywords over {} ({})",
        res.top_keywords.len(),
        years,
        res.top_keywords.join(", ")
    )?;
    Ok(())
}

/// Reads one command per line and recomputes all the views after each change of selection.
///
/// A keyword toggles the selection, an empty line or `:reset` clears it and `:quit` stops.
pub fn run_interactive<R: BufRead, W: Write>(
    config: &DashboardConfig,
    root_path: &Path,
    commands: R,
    output: &mut W,
) -> MResult<()> {
    let rules = validate_rules(&config.rules)?;
    let (rows, skipped_rows) = load_rows(config, root_path)?;
    if skipped_rows > 0 {
        info!("{} rows skipped", skipped_rows);
    }

    let mut selection = Selection::new();
    if let Some(keyword) = config.selected_keyword.as_deref() {
        selection.toggle(keyword);
    }
    let res = compute_with_rules(&rows, selection.current(), &rules);
    write_report(output, &res).context(WritingOutputSnafu { path: "output" })?;

    for line in commands.lines() {
        let line = line.context(ReadingCommandsSnafu {})?;
        let changed = match line.trim() {
            ":quit" => break,
            "" | ":reset" => selection.clear(),
            keyword => {
                selection.toggle(keyword);
                true
            }
        };
        debug!("run_interactive: selection: {:?}", selection.current());
        if changed {
            let res = compute_with_rules(&rows, selection.current(), &rules);
            write_report(output, &res).context(WritingOutputSnafu { path: "output" })?;
        }
    }
    Ok(())
}

#[cfg(test)]
fn run_dashboard_test(test_name: &str, config_lpath: &str, summary_lpath: &str) -> MResult<()> {
    let test_dir = option_env!("MEASURES_TEST_DIR")
        .unwrap_or(concat!(env!("CARGO_MANIFEST_DIR"), "/tests"));
    info!("Running test {}", test_name);
    let (config, root_path) = load_config(
        Some(format!("{}/{}/{}", test_dir, test_name, config_lpath)),
        None,
        None,
        None,
    )?;
    run_dashboard(
        &config,
        &root_path,
        Some(format!("{}/{}/{}", test_dir, test_name, summary_lpath)),
        None,
    )
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) -> MResult<()> {
    run_dashboard_test(
        test_name,
        format!("{}_config.json", test_name).as_str(),
        format!("{}_expected_summary.json", test_name).as_str(),
    )
}
