//! ptx-format - Canonical PreTeXt XML formatter

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use ptx_format::{Config, Result};

#[derive(Parser)]
#[command(name = "ptx-format")]
#[command(version, about = "Canonical PreTeXt XML formatter", long_about = None)]
#[command(after_help = "EXAMPLES:
    ptx-format book.ptx out.ptx     Format book.ptx into out.ptx
    ptx-format -p book.ptx          Format book.ptx in place
    ptx-format -r src/              Format every .ptx file under src/
    cat book.ptx | ptx-format       Format stdin to stdout")]
struct Cli {
    /// Input file, or a directory with --recursive (stdin if omitted)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output file (stdout if omitted)
    #[arg(value_name = "OUTPUT", conflicts_with = "in_place")]
    output: Option<PathBuf>,

    /// Overwrite the input file with the formatted output
    #[arg(short = 'p', long, requires = "input")]
    in_place: bool,

    /// Format every .ptx file under INPUT in place
    #[arg(short, long, conflicts_with_all = ["output", "in_place"])]
    recursive: bool,

    /// Number of spaces per indent level
    #[arg(short, long, value_name = "COUNT", conflicts_with = "tab_indent")]
    indent: Option<usize>,

    /// Indent with tabs
    #[arg(short, long)]
    tab_indent: bool,

    /// Read options from a TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config_file: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    show_config: bool,

    /// Force the XML declaration line on
    #[arg(long, overrides_with = "skip_doc_type")]
    add_doc_type: bool,

    /// Force the XML declaration line off
    #[arg(long)]
    skip_doc_type: bool,

    /// Suppress per-file messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    // Writing to a file gets the XML declaration by default; stdout stays
    // clean for piping. The explicit flags win either way.
    let writes_file = cli.in_place || cli.recursive || cli.output.is_some();
    let config = build_config(cli, writes_file)?;

    if cli.show_config {
        print!("{}", config.to_toml());
        return Ok(());
    }

    if cli.recursive {
        let dir = cli.input.clone().unwrap_or_else(|| PathBuf::from("."));
        let mut files = Vec::new();
        collect_ptx_files(&dir, &mut files)?;
        for file in &files {
            format_file(file, &config)?;
            if !cli.quiet {
                println!("formatted {}", file.display());
            }
        }
        return Ok(());
    }

    let source = match &cli.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let formatted = ptx_format::format_pretext_with(&source, &config)?;

    let destination = if cli.in_place {
        cli.input.as_deref()
    } else {
        cli.output.as_deref()
    };
    match destination {
        Some(path) => fs::write(path, format!("{formatted}\n"))?,
        None => println!("{formatted}"),
    }
    Ok(())
}

fn build_config(cli: &Cli, writes_file: bool) -> Result<Config> {
    let mut config = match &cli.config_file {
        Some(path) => Config::from_file(path)?,
        None => Config::standard(),
    };
    if cli.tab_indent {
        config.set_indent_literal("\t");
    } else if let Some(count) = cli.indent {
        config.set_indent_spaces(count);
    }
    if cli.add_doc_type {
        config.set_include_doc_id(true);
    } else if cli.skip_doc_type {
        config.set_include_doc_id(false);
    } else if cli.config_file.is_none() {
        // A configuration file owns this setting when present.
        config.set_include_doc_id(writes_file);
    }
    Ok(config)
}

fn format_file(path: &Path, config: &Config) -> Result<()> {
    let source = fs::read_to_string(path)?;
    let formatted = ptx_format::format_pretext_with(&source, config)?;
    fs::write(path, format!("{formatted}\n"))?;
    Ok(())
}

/// Gather .ptx files under a directory, depth-first in name order so runs
/// are deterministic.
fn collect_ptx_files(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());
    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            collect_ptx_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "ptx") {
            files.push(path);
        }
    }
    Ok(())
}
