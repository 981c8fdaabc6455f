use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use golden_patcher::{backup_path, CallSite, PatchRequest, Patcher};
use golden_patcher::{refine_span, rewrite_literal, LineSpan, SourceParser};
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "golden-patcher")]
#[command(about = "Rewrite golden-value expectation literals in test sources", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite the block literal at a call site to hold a new value
    Apply {
        /// Source file containing the expectation literal
        file: PathBuf,

        /// 1-indexed line the expectation's statement starts on
        #[arg(short, long)]
        line: usize,

        /// New literal value (mutually exclusive with --value-file)
        #[arg(short, long)]
        value: Option<String>,

        /// Read the new value from a file, or from stdin with "-"
        #[arg(long)]
        value_file: Option<PathBuf>,

        /// Identifier printed in the acceptance notice
        #[arg(long, default_value = "golden-patcher")]
        test_id: String,

        /// Show what would change without modifying the file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Restore a file from the .bak backup left by a previous accept run
    Restore {
        /// File to restore (the backup is <file>.bak)
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            file,
            line,
            value,
            value_file,
            test_id,
            dry_run,
            diff,
        } => cmd_apply(file, line, value, value_file, test_id, dry_run, diff),
        Commands::Restore { file } => cmd_restore(file),
    }
}

fn read_value(value: Option<String>, value_file: Option<PathBuf>) -> Result<String> {
    match (value, value_file) {
        (Some(v), None) => Ok(v),
        (None, Some(path)) if path.as_os_str() == "-" => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read value from stdin")?;
            Ok(buf)
        }
        (None, Some(path)) => fs::read_to_string(&path)
            .with_context(|| format!("failed to read value from {}", path.display())),
        (Some(_), Some(_)) => bail!("--value and --value-file are mutually exclusive"),
        (None, None) => bail!("one of --value or --value-file is required"),
    }
}

fn cmd_apply(
    file: PathBuf,
    line: usize,
    value: Option<String>,
    value_file: Option<PathBuf>,
    test_id: String,
    dry_run: bool,
    diff: bool,
) -> Result<()> {
    let value = read_value(value, value_file)?;

    if dry_run || diff {
        let old = fs::read_to_string(&file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let mut parser = SourceParser::new()?;
        let parsed = parser.parse_with_source(&old)?;
        let span = refine_span(&parsed, LineSpan::single(line)?);
        let rewritten = rewrite_literal(&old, span, &value)?;

        if diff {
            print_diff(&old, &rewritten.source);
        }
        if dry_run {
            println!(
                "{} would rewrite {}:{} (line delta {:+})",
                "dry-run:".yellow(),
                file.display(),
                line,
                rewritten.delta
            );
            return Ok(());
        }
    }

    let mut patcher = Patcher::new()?;
    let request = PatchRequest::new(test_id, CallSite::new(&file, line), value);
    let _outcome = patcher
        .patch(&request)
        .with_context(|| format!("failed to patch {}:{}", file.display(), line))?;

    Ok(())
}

fn cmd_restore(file: PathBuf) -> Result<()> {
    let bak = backup_path(&file);
    if !bak.exists() {
        bail!("no backup found at {}", bak.display());
    }
    fs::copy(&bak, &file)
        .with_context(|| format!("failed to restore {} from {}", file.display(), bak.display()))?;
    println!(
        "{} {} from {}",
        "restored".green(),
        file.display(),
        bak.display()
    );
    Ok(())
}

fn print_diff(original: &str, modified: &str) {
    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}
