//! Command-line interface for sectmd.
//!
//! Usage:
//!   sectmd convert `<input>` `<output>` --section `<title>`   - Convert one section
//!   sectmd batch `<manifest>`                                - Run every job in a YAML manifest

mod manifest;
mod options;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand};

use sectmd_core::{ConversionOptions, Converter};

use crate::manifest::Manifest;
use crate::options::{FrontmatterArgs, OptionsBuilder};

#[derive(Parser)]
#[command(name = "sectmd")]
#[command(about = "Convert a section of a generated HTML chapter into Markdown with frontmatter")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one section of one file
    Convert(ConvertArgs),
    /// Run every conversion listed in a YAML manifest
    Batch {
        /// Manifest path
        manifest: PathBuf,
        /// Print the Markdown instead of writing output files
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Args)]
struct ConvertArgs {
    /// HTML chapter to read
    input: PathBuf,
    /// Markdown file to write (replaced if present)
    output: PathBuf,
    /// Title of the heading that opens the section, e.g. "9. Directories"
    #[arg(short, long)]
    section: String,
    #[command(flatten)]
    frontmatter: FrontmatterArgs,
    /// Language hint for screen code blocks; empty for none
    #[arg(long = "lang", default_value = "pike")]
    language: String,
    /// Keep line breaks in screen code blocks instead of flattening them
    /// (indentation is still stripped from every line)
    #[arg(long)]
    keep_screen_lines: bool,
    /// Regex that ends the section (repeatable; replaces the defaults)
    #[arg(long = "end-anchor")]
    end_anchors: Vec<String>,
    /// Print the Markdown instead of writing the output file
    #[arg(long)]
    dry_run: bool,
}

impl ConvertArgs {
    fn options(&self) -> ConversionOptions {
        OptionsBuilder {
            section: self.section.clone(),
            frontmatter: self.frontmatter.clone(),
            language: self.language.clone(),
            keep_screen_lines: self.keep_screen_lines,
            end_anchors: self.end_anchors.clone(),
        }
        .build()
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Convert(args) => {
            let options = args.options();
            run_one(options, &args.input, &args.output, args.dry_run)
        }
        Commands::Batch { manifest, dry_run } => run_batch(&manifest, dry_run),
    }
}

fn run_one(options: ConversionOptions, input: &Path, output: &Path, dry_run: bool) -> Result<()> {
    let converter = Converter::new(options).context("compiling conversion patterns")?;

    let report = if dry_run {
        let conversion = converter
            .convert_path(input)
            .with_context(|| format!("converting {}", input.display()))?;
        print!("{}", conversion.markdown);
        conversion.report
    } else {
        converter
            .convert_file(input, output)
            .with_context(|| format!("converting {}", input.display()))?
    };

    for warning in &report.warnings {
        log::info!("{}: {}", input.display(), warning);
    }
    if !dry_run {
        eprintln!(
            "Converted {} characters to {}",
            report.chars,
            output.display()
        );
    }
    Ok(())
}

fn run_batch(manifest_path: &Path, dry_run: bool) -> Result<()> {
    let manifest = Manifest::load(manifest_path)?;
    let total = manifest.jobs.len();
    let mut failed = 0usize;

    for job in &manifest.jobs {
        if let Err(err) = run_one(job.builder().build(), &job.input, &job.output, dry_run) {
            eprintln!("Error: {err:#}");
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{failed} of {total} jobs failed");
    }
    log::info!("{total} jobs converted");
    Ok(())
}
