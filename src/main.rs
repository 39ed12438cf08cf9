mod args;
mod measures;

use clap::Parser;
use log::{debug, info};
use std::error::Error;
use std::io;

use crate::args::Args;
use crate::measures::MResult;

fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    debug!("args: {:?}", args);

    if let Err(e) = run(&args) {
        eprintln!("An error occured: {}", e);
        let mut source = e.source();
        while let Some(s) = source {
            eprintln!("  caused by: {}", s);
            source = s.source();
        }
        std::process::exit(1);
    }
}

fn run(args: &Args) -> MResult<()> {
    let (mut config, root_path) = measures::load_config(
        args.config.clone(),
        args.input.clone(),
        args.input_type.clone(),
        args.excel_worksheet_name.clone(),
    )?;
    if let Some(keyword) = args.keyword.clone() {
        config.selected_keyword = Some(keyword);
    }
    info!("config: {:?}", config);

    if args.interactive {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        measures::run_interactive(&config, &root_path, stdin.lock(), &mut stdout)
    } else {
        measures::run_dashboard(&config, &root_path, args.reference.clone(), args.out.clone())
    }
}
