use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use flate2::read::MultiGzDecoder;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use varjson_core::{
    AnnotatedVariant, AssemblerConfig, FrequencySource, NamingPolicy, PopulationFrequencies,
    RecordAssembler,
};

use crate::ranks::handlers::load_ranks;

///
/// Get a reader for the input, gzip'd or not; `-` reads stdin.
///
fn open_input(path: &str) -> Result<Box<dyn BufRead>> {
    if path == "-" {
        return Ok(Box::new(BufReader::new(io::stdin().lock())));
    }
    let path = Path::new(path);
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).with_context(|| format!("Couldn't open input: {:?}", path))?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };
    Ok(Box::new(BufReader::with_capacity(256 * 1024, file)))
}

fn open_output(path: Option<&String>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("Couldn't create output: {:?}", path))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

/// Settings file first, then any command line overrides.
fn build_config(matches: &ArgMatches) -> Result<AssemblerConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => AssemblerConfig::try_from(Path::new(path))
            .with_context(|| format!("Couldn't load config: {:?}", path))?,
        None => AssemblerConfig::default(),
    };

    if let Some(delimiter) = matches.get_one::<String>("delimiter") {
        if delimiter.is_empty() {
            anyhow::bail!("--delimiter must not be empty");
        }
        config.delimiter = delimiter.clone();
    }
    if let Some(assembly) = matches.get_one::<String>("assembly") {
        config.assembly = Some(assembly.clone());
    }
    if let Some(cache_assembly) = matches.get_one::<String>("cache-assembly") {
        config.cache_assembly = Some(cache_assembly.clone());
    }

    let flags = &mut config.frequencies;
    flags.af_1kg |= matches.get_flag("af-1kg");
    flags.af_esp |= matches.get_flag("af-esp");
    flags.af_exac |= matches.get_flag("af-exac");
    flags.af_gnomad |= matches.get_flag("af-gnomad");

    Ok(config)
}

pub fn run_assemble(matches: &ArgMatches) -> Result<()> {
    let input = matches
        .get_one::<String>("input")
        .expect("A path to annotated variants is required.");

    let config = build_config(matches)?;
    let ranks = load_ranks(matches.get_one::<String>("ranks"))?;
    let frequencies = PopulationFrequencies::new(config.frequencies);
    let assembler = RecordAssembler::new(NamingPolicy::default(), ranks, config, frequencies)?;

    let reader = open_input(input)?;
    let mut writer = open_output(matches.get_one::<String>("output"))?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg} ({pos} variants)")
            .unwrap(),
    );
    pb.set_message(format!("Assembling records from {}", input));

    let n_records = assemble_lines(&assembler, reader, &mut writer, &pb)?;

    pb.finish_and_clear();
    info!("Wrote {} records", n_records);

    Ok(())
}

///
/// Assemble every annotated variant in `reader`, writing one record per line.
///
/// Blank lines are skipped. The first line that cannot be read or deserialized
/// stops the batch, and the error names its (1-based) line number.
///
/// # Arguments
/// * `assembler` - the record assembler for this batch
/// * `reader` - annotated variants as JSON lines
/// * `writer` - destination for the serialized records
/// * `pb` - progress bar advanced once per record
///
pub fn assemble_lines<F: FrequencySource>(
    assembler: &RecordAssembler<F>,
    reader: impl BufRead,
    mut writer: impl Write,
    pb: &ProgressBar,
) -> Result<u64> {
    let mut n_records: u64 = 0;
    for (index, line) in reader.lines().enumerate() {
        let line =
            line.with_context(|| format!("There was an error reading line {}", index + 1))?;
        if line.trim().is_empty() {
            continue;
        }

        let mut variant: AnnotatedVariant = serde_json::from_str(&line)
            .with_context(|| format!("Invalid annotated variant on line {}", index + 1))?;
        let record = assembler.assemble(&mut variant);

        writeln!(writer, "{}", record.to_json_line()?)?;
        n_records += 1;
        pb.inc(1);
    }
    writer.flush()?;

    Ok(n_records)
}
