use clap::{Command, arg};

pub const RANKS_CMD: &str = "ranks";

pub fn create_ranks_cli() -> Command {
    Command::new(RANKS_CMD)
        .author("Databio")
        .about("Print the severity table in effect, most severe first.")
        .arg(arg!(--ranks <ranks>).help("Severity table to print instead of the Ensembl ranking"))
}
