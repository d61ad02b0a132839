use clap::{Arg, Command, arg};

pub const ASSEMBLE_CMD: &str = "assemble";

pub fn create_assemble_cli() -> Command {
    Command::new(ASSEMBLE_CMD)
        .author("Databio")
        .about("Assemble annotated variants (one JSON object per line) into nested JSON records.")
        .arg(
            Arg::new("input")
                .required(true)
                .help("Annotated variants as JSON lines, or - for stdin"),
        )
        .arg(arg!(--output <output>).help("Write records here instead of stdout"))
        .arg(arg!(--config <config>).help("TOML file with assembler settings"))
        .arg(
            arg!(--ranks <ranks>)
                .help("Severity table (term<TAB>rank, or a .json object); defaults to the Ensembl ranking"),
        )
        .arg(arg!(--delimiter <delimiter>).help("Joins raw input tokens; + means a space"))
        .arg(arg!(--assembly <assembly>).help("Assembly name reported on every record"))
        .arg(
            Arg::new("cache-assembly")
                .long("cache-assembly")
                .help("Assembly to report when neither --assembly nor the variant gives one"),
        )
        .arg(
            Arg::new("af-1kg")
                .long("af-1kg")
                .help("Include 1000 Genomes population frequencies")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("af-esp")
                .long("af-esp")
                .help("Include ESP population frequencies")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("af-exac")
                .long("af-exac")
                .help("Include ExAC population frequencies")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("af-gnomad")
                .long("af-gnomad")
                .help("Include gnomAD population frequencies")
                .action(clap::ArgAction::SetTrue),
        )
}
