use anyhow::{Context, Result};
use clap::{Args, FromArgMatches, crate_version};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use env_logger::Builder;

use alignment_evaluation::eval_commands::eval_command_evaluate;

pub fn main() -> Result<()> {
    let command = eval_command_evaluate::build_cli();
    let command = Verbosity::<WarnLevel>::augment_args(command).version(crate_version!());
    let cli_matches = command.get_matches();

    let verbosity = Verbosity::<WarnLevel>::from_arg_matches(&cli_matches)?;
    Builder::new()
        .filter_level(verbosity.log_level_filter())
        .init();

    log::info!("evaluate starting");

    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    eval_command_evaluate::execute(&cli_matches, &mut lock).context("Evaluating alignments")
}
