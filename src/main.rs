use anyhow::{bail, Context, Result};
use clap::Parser;
use faifetch::{shannon_entropy, FastaIndex, IndexedFasta};
use log::{debug, info};
use std::{
    io::{self, BufRead, BufWriter, Read, Seek, Write},
    path::PathBuf,
};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// FASTA or FASTQ reference file
    fasta: PathBuf,

    /// Build the index and write it to <FASTA>.fai
    #[arg(short, long)]
    index: bool,

    /// Print a region: name, name:pos, name:start..end or name:start-end
    #[arg(short, long, value_name = "REGION")]
    region: Option<String>,

    /// Read regions from stdin, one per line, and print one sequence per line
    #[arg(short = 'c', long = "stdin")]
    stdin: bool,

    /// Print every sequence as name<TAB>sequence
    #[arg(short, long)]
    dump: bool,

    /// Print the Shannon entropy of each result instead of its residues
    #[arg(short, long)]
    entropy: bool,

    /// Print a sequence's full header name and its length, as `name: ...`
    /// and `length: ...` lines
    #[arg(short, long, value_name = "NAME")]
    stats: Option<String>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}
impl Cli {
    fn fetches(&self) -> bool {
        self.region.is_some() || self.stdin || self.dump || self.stats.is_some()
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Write a result line: the residues, or their entropy.
fn emit<W: Write>(out: &mut W, seq: &[u8], entropy: bool) -> io::Result<()> {
    if entropy {
        writeln!(out, "{}", shannon_entropy(seq).bits)
    } else {
        out.write_all(seq)?;
        writeln!(out)
    }
}

/// Print the full stored name and the length of one sequence.
fn write_stats<R: Read + Seek, W: Write>(
    faidx: &IndexedFasta<R>,
    name: &str,
    out: &mut W,
) -> Result<()> {
    let full_name = faidx.index().name_starting_with(name).with_context(|| {
        format!("could not find sequence named or starting with {}", name)
    })?;
    writeln!(out, "name: {}", full_name)?;
    writeln!(out, "length: {}", faidx.sequence_length(name)?)?;
    Ok(())
}

/// Fetch one region per non-blank input line.
fn fetch_lines<R: Read + Seek, B: BufRead, W: Write>(
    faidx: &mut IndexedFasta<R>,
    input: B,
    out: &mut W,
    entropy: bool,
) -> Result<()> {
    for line in input.lines() {
        let line = line?;
        let region = line.trim();
        if region.is_empty() {
            continue;
        }
        debug!("fetching {}", region);
        let seq = faidx.query(region)?;
        emit(out, seq, entropy)?;
    }
    Ok(())
}

/// Print every sequence as `name<TAB>sequence`, in index order.
fn dump<R: Read + Seek, W: Write>(
    faidx: &mut IndexedFasta<R>,
    out: &mut W,
    entropy: bool,
) -> Result<()> {
    let names = faidx.index().names().to_vec();
    for name in names {
        let seq = faidx.sequence(&name)?;
        write!(out, "{}\t", name)?;
        emit(out, seq, entropy)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    if cli.index {
        info!("generating fasta index file from {}", cli.fasta.display());
        let index = FastaIndex::build(&cli.fasta)
            .with_context(|| format!("could not index {}", cli.fasta.display()))?;
        let sidecar = FastaIndex::sidecar_path(&cli.fasta);
        index.write_filepath(&sidecar)?;
        info!("wrote {} entries to {}", index.len(), sidecar.display());
        if !cli.fetches() {
            return Ok(());
        }
    } else if !cli.fetches() {
        bail!("nothing to do: pass one of --index, --region, --stdin, --dump or --stats");
    }

    let mut faidx = IndexedFasta::open(&cli.fasta)
        .with_context(|| format!("could not open reference {}", cli.fasta.display()))?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if let Some(name) = &cli.stats {
        write_stats(&faidx, name, &mut out)
            .with_context(|| format!("in reference {}", cli.fasta.display()))?;
    }

    if let Some(region) = &cli.region {
        let seq = faidx.query(region)?;
        emit(&mut out, seq, cli.entropy)?;
    }

    if cli.stdin {
        fetch_lines(&mut faidx, io::stdin().lock(), &mut out, cli.entropy)?;
    }

    if cli.dump {
        dump(&mut faidx, &mut out, cli.entropy)?;
    }

    out.flush()?;
    Ok(())
}
