mod assemble;
mod ranks;

use anyhow::Result;
use clap::{Command, arg};

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "varjson";
    pub const BIN_NAME: &str = "varjson";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Databio")
        .about("Reshape annotated genomic variants into one nested JSON record per variant.")
        .subcommand_required(true)
        .arg(
            arg!(-v --verbose)
                .help("Log dropped sub-fields and per-variant progress")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .subcommand(assemble::cli::create_assemble_cli())
        .subcommand(ranks::cli::create_ranks_cli())
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    let default_level = if matches.get_flag("verbose") { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match matches.subcommand() {
        //
        // ASSEMBLE
        //
        Some((assemble::cli::ASSEMBLE_CMD, matches)) => {
            assemble::handlers::run_assemble(matches)?;
        }

        //
        // RANKS
        //
        Some((ranks::cli::RANKS_CMD, matches)) => {
            ranks::handlers::run_ranks(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
