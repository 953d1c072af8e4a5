// Command-line front end for Earl.
//
// `earl pack` turns a JSON document into an ETF stream; `earl unpack`
// decodes ETF back into Erlang-like text or JSON.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use log::LevelFilter;

use crate::etf::DEFAULT_MAX_DEPTH;
use crate::json;
use crate::{DecodeOptions, EncodeOptions, Term};

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Erlang external term format encoder/decoder.
#[derive(Parser, Debug)]
#[command(
    name = "earl",
    version,
    about = "Erlang external term format encoder/decoder",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (errors only).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Encode a JSON document as an ETF stream.
    Pack(PackArgs),
    /// Decode an ETF stream.
    Unpack(UnpackArgs),
}

#[derive(Args, Debug)]
struct PackArgs {
    /// JSON input file (default: stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(long, short = 'o', value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Wrap the term in a zlib-compressed envelope at this level (0-9)
    /// when that is smaller.
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=9))]
    compress: Option<u32>,
}

#[derive(Args, Debug)]
struct UnpackArgs {
    /// ETF input file (default: stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Print JSON instead of Erlang notation.
    #[arg(long)]
    json: bool,

    /// Decode every concatenated term in the input.
    #[arg(long)]
    all: bool,

    /// Render big integers as decimal strings.
    #[arg(long)]
    big_int_as_string: bool,

    /// Render atoms as strings.
    #[arg(long)]
    atom_as_string: bool,

    /// Render maps as objects with text keys.
    #[arg(long)]
    map_as_object: bool,

    /// Maximum term nesting.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

impl UnpackArgs {
    fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            big_int_as_string: self.big_int_as_string,
            atom_as_string: self.atom_as_string,
            map_as_object: self.map_as_object,
            max_depth: self.max_depth,
        }
    }
}

fn log_filter(quiet: bool, verbose: u8) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

// ---------------------------------------------------------------------------
// I/O helpers
// ---------------------------------------------------------------------------

fn read_input(path: Option<&Path>) -> Result<Vec<u8>, String> {
    let mut data = Vec::new();
    match path {
        Some(path) => {
            let mut f = File::open(path).map_err(|e| format!("input file: {}: {e}", path.display()))?;
            f.read_to_end(&mut data)
                .map_err(|e| format!("input file: {}: {e}", path.display()))?;
        }
        None => {
            io::stdin()
                .lock()
                .read_to_end(&mut data)
                .map_err(|e| format!("stdin: {e}"))?;
        }
    }
    Ok(data)
}

fn open_output(path: Option<&Path>, force: bool) -> Result<Box<dyn Write>, String> {
    match path {
        None => Ok(Box::new(BufWriter::with_capacity(BUF_SIZE, io::stdout().lock()))),
        Some(path) => {
            if path.exists() && !force {
                return Err(format!(
                    "output file exists, use -f to overwrite: {}",
                    path.display()
                ));
            }
            let f = File::create(path).map_err(|e| format!("output file: {}: {e}", path.display()))?;
            Ok(Box::new(BufWriter::with_capacity(BUF_SIZE, f)))
        }
    }
}

// ---------------------------------------------------------------------------
// Pack command
// ---------------------------------------------------------------------------

fn cmd_pack(args: &PackArgs, force: bool) -> Result<(), String> {
    let input = read_input(args.input.as_deref())?;
    let doc: serde_json::Value =
        serde_json::from_slice(&input).map_err(|e| format!("invalid JSON input: {e}"))?;
    let term = json::from_json(&doc);

    let options = EncodeOptions {
        compression: args.compress,
        ..Default::default()
    };
    let bytes = crate::pack_with(&term, &options).map_err(|e| format!("pack error: {e}"))?;
    log::info!("packed {} JSON bytes into {} ETF bytes", input.len(), bytes.len());

    let mut out = open_output(args.output.as_deref(), force)?;
    out.write_all(&bytes)
        .and_then(|()| out.flush())
        .map_err(|e| format!("write error: {e}"))
}

// ---------------------------------------------------------------------------
// Unpack command
// ---------------------------------------------------------------------------

fn render(term: &Term, as_json: bool) -> Result<String, String> {
    if as_json {
        serde_json::to_string_pretty(&json::to_json(term)).map_err(|e| format!("JSON output: {e}"))
    } else {
        Ok(term.to_string())
    }
}

fn cmd_unpack(args: &UnpackArgs) -> Result<(), String> {
    let input = read_input(args.input.as_deref())?;
    let options = args.decode_options();
    let mut out = BufWriter::with_capacity(BUF_SIZE, io::stdout().lock());

    let mut offset = 0;
    let mut count = 0usize;
    loop {
        let (term, used) = crate::unpack_prefix(&input[offset..], &options)
            .map_err(|e| format!("unpack error at byte {offset}: {e}"))?;
        writeln!(out, "{}", render(&term, args.json)?).map_err(|e| format!("write error: {e}"))?;
        offset += used;
        count += 1;
        if !args.all || offset >= input.len() {
            break;
        }
    }

    if offset < input.len() {
        log::warn!("{} trailing bytes after the first term ignored", input.len() - offset);
    }
    log::info!("decoded {count} term(s) from {offset} bytes");
    out.flush().map_err(|e| format!("write error: {e}"))
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run() -> ! {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(log_filter(cli.quiet, cli.verbose))
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();

    let result = match &cli.command {
        Cmd::Pack(args) => cmd_pack(args, cli.force),
        Cmd::Unpack(args) => cmd_unpack(args),
    };

    match result {
        Ok(()) => process::exit(0),
        Err(msg) => {
            eprintln!("earl: {msg}");
            process::exit(1);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let argv = std::iter::once("earl").chain(args.iter().copied());
        Cli::try_parse_from(argv).expect("cli parse failed")
    }

    #[test]
    fn unpack_flags_map_to_options() {
        let cli = parse(&["unpack", "in.etf", "--map-as-object", "--max-depth", "8"]);
        let Cmd::Unpack(args) = cli.command else {
            panic!("expected unpack");
        };
        assert_eq!(args.input.as_deref(), Some(Path::new("in.etf")));
        let opts = args.decode_options();
        assert!(opts.map_as_object);
        assert!(!opts.atom_as_string);
        assert_eq!(opts.max_depth, 8);
    }

    #[test]
    fn pack_compress_level_is_bounded() {
        let cli = parse(&["pack", "-o", "out.etf", "--compress", "9"]);
        let Cmd::Pack(args) = cli.command else {
            panic!("expected pack");
        };
        assert_eq!(args.compress, Some(9));
        assert!(Cli::try_parse_from(["earl", "pack", "--compress", "10"]).is_err());
    }

    #[test]
    fn verbosity_levels() {
        assert_eq!(log_filter(false, 0), LevelFilter::Warn);
        assert_eq!(log_filter(false, 2), LevelFilter::Debug);
        assert_eq!(log_filter(false, 5), LevelFilter::Trace);
        assert_eq!(log_filter(true, 0), LevelFilter::Error);
        assert!(Cli::try_parse_from(["earl", "-q", "-v", "unpack"]).is_err());
    }

    #[test]
    fn render_modes() {
        let t = Term::List(vec![Term::Integer(1), Term::atom("a")]);
        assert_eq!(render(&t, false).unwrap(), "[1,a]");
        assert_eq!(render(&t, true).unwrap(), "[\n  1,\n  \"a\"\n]");
    }
}
