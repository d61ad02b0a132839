use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;

use varjson_core::SeverityRanks;

/// The table at `path`, or the built-in Ensembl ranking.
pub fn load_ranks(path: Option<&String>) -> Result<SeverityRanks> {
    match path {
        Some(path) => SeverityRanks::from_path(Path::new(path))
            .with_context(|| format!("Couldn't read severity table: {:?}", path)),
        None => Ok(SeverityRanks::ensembl_default()),
    }
}

pub fn run_ranks(matches: &ArgMatches) -> Result<()> {
    let ranks = load_ranks(matches.get_one::<String>("ranks"))?;

    let mut out = BufWriter::new(io::stdout().lock());
    for (term, rank) in ranks.iter() {
        writeln!(out, "{}\t{}", term, rank)?;
    }
    out.flush()?;

    Ok(())
}
