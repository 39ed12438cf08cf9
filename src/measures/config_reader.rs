use crate::measures::*;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "datasetName")]
    pub dataset_name: String,
    #[serde(rename = "datasetDescription")]
    pub dataset_description: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
}

/// The configuration reported at the top of a summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(rename = "datasetName")]
    pub dataset_name: String,
    #[serde(rename = "selectedKeyword")]
    pub selected_keyword: Option<String>,
    pub rules: RulesConfig,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DataSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "subjectColumn")]
    _subject_column: Option<String>,
    #[serde(rename = "yesVotesColumn")]
    _yes_votes_column: Option<String>,
    #[serde(rename = "noVotesColumn")]
    _no_votes_column: Option<String>,
    #[serde(rename = "passFailColumn")]
    _pass_fail_column: Option<String>,
    #[serde(rename = "yearColumn")]
    _year_column: Option<String>,
    #[serde(rename = "keywordColumns")]
    _keyword_columns: Option<Vec<String>>,
}

impl DataSource {
    /// A source that uses the default column names.
    pub fn from_file(
        provider: String,
        file_path: String,
        excel_worksheet_name: Option<String>,
    ) -> DataSource {
        DataSource {
            provider,
            file_path,
            excel_worksheet_name,
            _subject_column: None,
            _yes_votes_column: None,
            _no_votes_column: None,
            _pass_fail_column: None,
            _year_column: None,
            _keyword_columns: None,
        }
    }

    pub fn subject_column(&self) -> &str {
        self._subject_column.as_deref().unwrap_or("Subject")
    }

    pub fn yes_votes_column(&self) -> &str {
        self._yes_votes_column.as_deref().unwrap_or("Yes Votes")
    }

    pub fn no_votes_column(&self) -> &str {
        self._no_votes_column.as_deref().unwrap_or("No Votes")
    }

    pub fn pass_fail_column(&self) -> &str {
        self._pass_fail_column.as_deref().unwrap_or("Pass or Fail")
    }

    pub fn year_column(&self) -> &str {
        self._year_column.as_deref().unwrap_or("Year")
    }

    /// Keyword1 to Keyword5 unless specified.
    pub fn keyword_columns(&self) -> MResult<Vec<String>> {
        match &self._keyword_columns {
            Some(cols) if cols.len() > KEYWORD_SLOTS => {
                whatever!(
                    "{} keyword columns given for {}, at most {} are supported",
                    cols.len(),
                    self.file_path,
                    KEYWORD_SLOTS
                )
            }
            Some(cols) => Ok(cols.clone()),
            None => Ok((1..=KEYWORD_SLOTS)
                .map(|idx| format!("Keyword{}", idx))
                .collect()),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(rename = "histogramMinCount")]
    pub histogram_min_count: Option<u64>,
    #[serde(rename = "streamTopKeywords")]
    pub stream_top_keywords: Option<usize>,
    #[serde(rename = "subjectTopCount")]
    pub subject_top_count: Option<usize>,
}

impl From<&AggregateRules> for RulesConfig {
    fn from(rules: &AggregateRules) -> RulesConfig {
        RulesConfig {
            histogram_min_count: Some(rules.histogram_min_count),
            stream_top_keywords: Some(rules.stream_top_keywords),
            subject_top_count: Some(rules.subject_top_count),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "dataSources")]
    pub data_sources: Vec<DataSource>,
    pub rules: Option<RulesConfig>,
    #[serde(rename = "selectedKeyword")]
    pub selected_keyword: Option<String>,
}

pub fn read_config(path: &str) -> MResult<DashboardConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: DashboardConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: String) -> MResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

/// The rules of the configuration, with the default values for the missing entries.
pub fn validate_rules(rules_config: &Option<RulesConfig>) -> MResult<AggregateRules> {
    let defaults = AggregateRules::DEFAULT_RULES;
    let rules = match rules_config {
        None => defaults,
        Some(rc) => AggregateRules {
            histogram_min_count: rc
                .histogram_min_count
                .unwrap_or(defaults.histogram_min_count),
            stream_top_keywords: match rc.stream_top_keywords {
                Some(0) => {
                    whatever!("streamTopKeywords must be at least 1")
                }
                Some(x) => x,
                None => defaults.stream_top_keywords,
            },
            subject_top_count: match rc.subject_top_count {
                Some(0) => {
                    whatever!("subjectTopCount must be at least 1")
                }
                Some(x) => x,
                None => defaults.subject_top_count,
            },
        },
    };
    debug!("validate_rules: {:?}", rules);
    Ok(rules)
}
