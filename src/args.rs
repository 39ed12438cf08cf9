use clap::Parser;

/// This program computes the keyword histogram, the subject rollups and the stream series
/// of a list of historical ballot measures.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the data sources and the rules.
    /// For more information about the file format, read the documentation of the manual module.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing a summary in JSON format. If provided, ballotviz will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary will be written in JSON format to the given
    /// location. Setting this option overrides the output directory that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The file containing the ballot measures. Setting this option overrides the
    /// data sources that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: first worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (keyword or empty) The keyword to select. Overrides the selection of the configuration file.
    #[clap(short, long, value_parser)]
    pub keyword: Option<String>,

    /// If passed as an argument, reads keywords from the standard input and recomputes the views
    /// after each of them.
    #[clap(long, takes_value = false)]
    pub interactive: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
