use super::{load_document, loader};
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use trellis_loader::{DiagnosticLevel, Loader};
use walkdir::WalkDir;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Document or directory to check (defaults to the configured source directory)
    pub path: Option<PathBuf>,

    /// Treat diagnostics as failures (overrides config)
    #[arg(long)]
    pub strict: bool,
}

/// Summary of one file
#[derive(Debug, Default, PartialEq)]
pub(crate) struct FileOutcome {
    pub widgets: usize,
    pub warnings: usize,
    pub failed: bool,
}

pub fn check(args: CheckArgs, cwd: &Path) -> Result<bool> {
    let mut config = Config::load(cwd)?;
    config.strict |= args.strict;
    let loader = loader(&config)?;

    let input = args.path.unwrap_or_else(|| config.src_dir(cwd));
    let files = if input.is_file() {
        vec![input.clone()]
    } else if input.is_dir() {
        find_documents(&input, &config)
    } else {
        return Err(anyhow!("Input path does not exist: {}", input.display()));
    };

    println!("{}", "🔍 Checking Trellis documents...".bright_blue().bold());
    if files.is_empty() {
        println!("{}", format!("⚠️  No .{} files found", config.extension).yellow());
        return Ok(true);
    }

    let mut failures = 0;
    let mut warnings = 0;
    let mut widgets = 0;
    for file in &files {
        let relative = file.strip_prefix(&input).unwrap_or(file);
        let outcome = check_file(&loader, file, relative, config.strict);
        warnings += outcome.warnings;
        widgets += outcome.widgets;
        if outcome.failed {
            failures += 1;
        }
    }

    println!();
    if failures == 0 {
        println!(
            "{} Checked {} files ({} widgets), {} warnings",
            "✅".green(),
            files.len(),
            widgets,
            warnings
        );
    } else {
        println!(
            "{} Checked {} files, {} failed",
            "✗".red(),
            files.len(),
            failures
        );
    }
    Ok(failures == 0)
}

pub(crate) fn check_file(loader: &Loader, file: &Path, display: &Path, strict: bool) -> FileOutcome {
    let report = match load_document(loader, file) {
        Ok((_, report)) => report,
        Err(e) => {
            eprintln!("  {} {} - {}", "✗".red(), display.display(), e.to_string().red());
            return FileOutcome {
                failed: true,
                ..FileOutcome::default()
            };
        }
    };

    let warnings = report
        .diagnostics
        .iter()
        .filter(|d| d.level == DiagnosticLevel::Warning)
        .count();
    let failed = report.diagnostics.iter().any(|d| d.is_error()) || (strict && warnings > 0);

    let mark = if failed { "✗".red() } else { "✓".green() };
    println!(
        "  {} {} ({} widgets)",
        mark,
        display.display(),
        report.widgets.len()
    );
    for diagnostic in &report.diagnostics {
        let line = diagnostic.to_string();
        if diagnostic.is_error() {
            println!("    {}", line.red());
        } else {
            println!("    {}", line.yellow());
        }
    }

    FileOutcome {
        widgets: report.widgets.len(),
        warnings,
        failed,
    }
}

pub(crate) fn find_documents(dir: &Path, config: &Config) -> Vec<PathBuf> {
    let mut files: Vec<_> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && config.is_document(path))
        .collect();
    files.sort();
    files
}
