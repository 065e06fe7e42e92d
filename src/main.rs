//! linesplit: split chunked byte streams into delimiter-terminated lines
//!
//! Usage: linesplit <COMMAND> [OPTIONS]

use clap::{Parser, Subcommand, ValueEnum};
use std::io;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use linesplit::commands::{CountCommand, SplitCommand};
use linesplit::io::buffers::DEFAULT_CHUNK_SIZE;
use linesplit::{Delimiter, PendingStrategy, SplitConfig, SplitError};

#[derive(Parser)]
#[command(name = "linesplit")]
#[command(version)]
#[command(about = "Split arbitrarily chunked byte streams into delimiter-terminated lines", long_about = None)]
struct Cli {
    /// Number of threads to use (default: number of CPUs)
    #[arg(long, short = 't', global = true)]
    threads: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    /// Collect fragments, concatenate once per line
    Lazy,
    /// Re-concatenate into one buffer on every chunk
    Eager,
}

impl From<StrategyArg> for PendingStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Lazy => PendingStrategy::Lazy,
            StrategyArg::Eager => PendingStrategy::Eager,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Re-emit the input line by line
    Split {
        /// Input file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Line delimiter; escapes \n \r \t \0 \\ \xHH are recognized
        #[arg(short, long, default_value = "\\n")]
        delimiter: String,

        /// Bytes read per chunk
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Pending buffer strategy
        #[arg(long, value_enum, default_value = "lazy")]
        strategy: StrategyArg,

        /// Prefix each line with its number and a tab
        #[arg(short, long)]
        number: bool,

        /// Use a smaller output buffer
        #[arg(long)]
        low_memory: bool,

        /// Print splitter statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Count lines in one or more files
    Count {
        /// Input files (stdin when none are given)
        files: Vec<PathBuf>,

        /// Line delimiter; escapes \n \r \t \0 \\ \xHH are recognized
        #[arg(short, long, default_value = "\\n")]
        delimiter: String,

        /// Bytes read per chunk
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Print totals to stderr
        #[arg(long)]
        stats: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Configure thread pool if --threads specified
    if let Some(n) = cli.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
        {
            eprintln!("Error: failed to initialize thread pool: {}", e);
            process::exit(1);
        }
    }

    let result = match cli.command {
        Commands::Split {
            input,
            delimiter,
            chunk_size,
            strategy,
            number,
            low_memory,
            stats,
        } => run_split(
            input, &delimiter, chunk_size, strategy, number, low_memory, stats,
        ),

        Commands::Count {
            files,
            delimiter,
            chunk_size,
            stats,
        } => run_count(files, &delimiter, chunk_size, stats),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_split(
    input: Option<PathBuf>,
    delimiter: &str,
    chunk_size: usize,
    strategy: StrategyArg,
    number: bool,
    low_memory: bool,
    stats: bool,
) -> Result<(), SplitError> {
    let config = SplitConfig::new()
        .with_delimiter(Delimiter::parse_escaped(delimiter)?)
        .with_strategy(strategy.into());

    let mut cmd = SplitCommand::new()
        .with_config(config)
        .with_chunk_size(chunk_size)
        .with_numbering(number);
    cmd.low_memory = low_memory;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    let result = match input {
        Some(path) if path.to_string_lossy() != "-" => cmd.run(&path, &mut handle),
        _ => cmd.run_stdin(&mut handle),
    };

    // A closed stdout (e.g. `| head`) is not an error.
    let result = match result {
        Err(SplitError::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe => return Ok(()),
        other => other?,
    };

    if stats {
        eprintln!("Split stats: {}", result);
    }
    Ok(())
}

fn run_count(
    files: Vec<PathBuf>,
    delimiter: &str,
    chunk_size: usize,
    stats: bool,
) -> Result<(), SplitError> {
    let config = SplitConfig::new().with_delimiter(Delimiter::parse_escaped(delimiter)?);
    let cmd = CountCommand::new()
        .with_config(config)
        .with_chunk_size(chunk_size);

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if files.is_empty() {
        let stdin = io::stdin();
        let count = cmd.count_reader(stdin.lock())?;
        let mut writer = linesplit::io::LineWriter::new(&mut handle);
        writer.write_count(count.lines, b"-")?;
        writer.flush()?;
        if stats {
            eprintln!("Count stats: Files: 1, Lines: {}, Bytes: {}", count.lines, count.bytes);
        }
        return Ok(());
    }

    let result = cmd.run(&files, &mut handle)?;
    if stats {
        eprintln!("Count stats: {}", result);
    }
    Ok(())
}
