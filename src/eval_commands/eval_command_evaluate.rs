use anyhow::{Context, Result, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use std::{io::Write, path::PathBuf};

use crate::{
    eval_framework::{
        evaluation_config::{
            DEFAULT_GOLD_SUFFIX, DEFAULT_OUTPUT_SUFFIX, EvaluationConfig, ReportFormat,
        },
        file_pairs::discover_file_pairs,
        report::{Reportable, write_json_report},
    },
    techniques::aggregator::{Aggregator, evaluate_file_pairs},
};

pub const ARG_ID_GOLD_DIR: &str = "GOLD_DIR";
pub const ARG_ID_OUT_DIR: &str = "OUT_DIR";
pub const ARG_ID_OUTPUT_SUFFIX: &str = "output-suffix";
pub const ARG_ID_GOLD_SUFFIX: &str = "gold-suffix";
pub const ARG_ID_JSON: &str = "json";
pub const ARG_ID_PARALLEL: &str = "parallel";
pub const ARG_SHORT_JSON: char = 'j';
pub const ARG_SHORT_PARALLEL: char = 'p';

pub fn build_cli() -> Command {
    Command::new("evaluate")
        .about("Evaluate computed trace alignments against reference alignments.")
        .long_about("Evaluate computed trace alignments against reference alignments.\nEvery file in OUT_DIR is compared with the file in GOLD_DIR that has the same name, with the output suffix replaced by the gold suffix. Output lines read `id alignment fitness time`, gold lines read `id alignment`; both files must be sorted by trace id.")
        .arg(
            Arg::new(ARG_ID_GOLD_DIR)
                .action(ArgAction::Set)
                .value_name(ARG_ID_GOLD_DIR)
                .help("The directory with the reference alignments.")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(ARG_ID_OUT_DIR)
                .action(ArgAction::Set)
                .value_name(ARG_ID_OUT_DIR)
                .help("The directory with the computed alignments.")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(ARG_ID_OUTPUT_SUFFIX)
                .long(ARG_ID_OUTPUT_SUFFIX)
                .action(ArgAction::Set)
                .value_name("SUFFIX")
                .help("File-name suffix of computed alignment files.")
                .default_value(DEFAULT_OUTPUT_SUFFIX),
        )
        .arg(
            Arg::new(ARG_ID_GOLD_SUFFIX)
                .long(ARG_ID_GOLD_SUFFIX)
                .action(ArgAction::Set)
                .value_name("SUFFIX")
                .help("File-name suffix of reference alignment files.")
                .default_value(DEFAULT_GOLD_SUFFIX),
        )
        .arg(
            Arg::new(ARG_ID_JSON)
                .short(ARG_SHORT_JSON)
                .long(ARG_ID_JSON)
                .action(ArgAction::SetTrue)
                .help("Write the report as JSON instead of text."),
        )
        .arg(
            Arg::new(ARG_ID_PARALLEL)
                .short(ARG_SHORT_PARALLEL)
                .long(ARG_ID_PARALLEL)
                .action(ArgAction::SetTrue)
                .help("Evaluate file pairs concurrently. The report is the same as for a sequential run."),
        )
}

impl EvaluationConfig {
    pub fn from_matches(cli_matches: &ArgMatches) -> Result<Self> {
        let gold_dir = cli_matches
            .get_one::<PathBuf>(ARG_ID_GOLD_DIR)
            .ok_or_else(|| anyhow!("no gold directory given"))?;
        let out_dir = cli_matches
            .get_one::<PathBuf>(ARG_ID_OUT_DIR)
            .ok_or_else(|| anyhow!("no output directory given"))?;

        let mut config = Self::new(gold_dir, out_dir);
        if let Some(suffix) = cli_matches.get_one::<String>(ARG_ID_OUTPUT_SUFFIX) {
            config.output_suffix = suffix.clone();
        }
        if let Some(suffix) = cli_matches.get_one::<String>(ARG_ID_GOLD_SUFFIX) {
            config.gold_suffix = suffix.clone();
        }
        if cli_matches.get_flag(ARG_ID_JSON) {
            config.report_format = ReportFormat::Json;
        }
        config.parallel = cli_matches.get_flag(ARG_ID_PARALLEL);
        Ok(config)
    }
}

pub fn evaluate(config: &EvaluationConfig) -> Result<Aggregator> {
    let pairs = discover_file_pairs(config)?;
    log::info!(
        "found {} output files in `{}`",
        pairs.len(),
        config.out_dir.display()
    );
    Ok(evaluate_file_pairs(&pairs, config.parallel))
}

pub fn execute(cli_matches: &ArgMatches, f: &mut impl Write) -> Result<()> {
    let config = EvaluationConfig::from_matches(cli_matches)?;
    let aggregator = evaluate(&config)?;

    let result = match config.report_format {
        ReportFormat::Text => aggregator.report(f),
        ReportFormat::Json => write_json_report(f, &aggregator),
    };
    result.context("writing report")
}
