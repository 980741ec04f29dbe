//! promptsafe CLI - text sanitizer for language-model prompts
//!
//! A command-line tool for cleaning scraped or extracted text before it is
//! placed into a prompt.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use promptsafe::{analyze_impact, clean_with_report, debug_steps_with, CleanOptions, Outcome};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Sanitize noisy text into bounded, prompt-safe prose
#[derive(Parser)]
#[command(
    name = "promptsafe",
    version,
    about = "Sanitize extracted text before prompting a language model",
    long_about = "promptsafe - strips markup, citations, LaTeX and formula noise from text.\n\n\
                  Reads a file or standard input and writes cleaned text.\n\n\
                  Usage:\n  \
                  promptsafe clean page.txt          Clean a file to stdout\n  \
                  cat page.txt | promptsafe clean    Clean standard input\n  \
                  promptsafe debug page.txt          Show the text after every stage"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file with cleaning options
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Option preset used when no config file is given
    #[arg(long, global = true, default_value = "default")]
    preset: Preset,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    /// Log every stage (sets RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a file or standard input
    Clean {
        /// Input file path (default: stdin)
        input: Option<PathBuf>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Show how much a cleaning pass removes
    Analyze {
        /// Input file path (default: stdin)
        input: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Show the text after every stage
    Debug {
        /// Input file path (default: stdin)
        input: Option<PathBuf>,

        /// Only print this stage (e.g. "latex", "unicode-math")
        #[arg(short, long)]
        stage: Option<String>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Clean many files into a directory
    Batch {
        /// Input files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = "cleaned")]
        output: PathBuf,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Print the effective options as JSON
    Config,

    /// Show version information
    Version,
}

/// Option overrides shared by the cleaning commands
#[derive(clap::Args, Clone, Default)]
struct Overrides {
    /// Maximum output length in characters
    #[arg(long)]
    max_length: Option<usize>,

    /// Minimum words required to accept the cleaned text
    #[arg(long)]
    min_words: Option<usize>,

    /// Minimum characters required to accept the cleaned text
    #[arg(long)]
    min_chars: Option<usize>,

    /// Strip every non-ASCII character
    #[arg(long)]
    ascii: bool,

    /// Keep Unicode math symbols
    #[arg(long)]
    preserve_equations: bool,

    /// Do not log or report fallbacks
    #[arg(long)]
    silent: bool,

    /// Single letters in a row that collapse to [equation]
    #[arg(long)]
    letter_run: Option<usize>,

    /// Length at which an lhs=rhs fragment becomes [equation]
    #[arg(long)]
    max_fragment_length: Option<usize>,

    /// Letter ratio a long line needs to survive the noise filter
    #[arg(long)]
    min_letter_ratio: Option<f64>,
}

/// Option preset
#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    /// Default options
    Default,
    /// Plain ASCII, more words required
    Strict,
    /// Short selections, equations kept
    Lenient,
}

impl From<Preset> for CleanOptions {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Default => CleanOptions::default(),
            Preset::Strict => CleanOptions::strict(),
            Preset::Lenient => CleanOptions::lenient(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let base = load_options(cli.config.as_deref(), cli.preset)?;

    match cli.command {
        Commands::Clean {
            input,
            output,
            overrides,
        } => {
            let options = apply_overrides(base, &overrides);
            let text = read_input(input.as_deref())?;
            let report = clean_with_report(&text, &options);

            if cli.json {
                write_output(output.as_ref(), &serde_json::to_string_pretty(&report)?)?;
            } else {
                write_output(output.as_ref(), &report.text)?;
            }

            if let Outcome::Fallback { reason } = &report.outcome {
                if !options.silent {
                    eprintln!("{} Fallback used: {}", "!".yellow().bold(), reason);
                }
            }
            if let Some(path) = output {
                println!("{} Cleaned text: {}", "✓".green().bold(), path.display());
            }
        }

        Commands::Analyze { input, overrides } => {
            let options = apply_overrides(base, &overrides);
            let text = read_input(input.as_deref())?;
            let report = clean_with_report(&text, &options);
            let impact = analyze_impact(&text, &report.text);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&impact)?);
                return Ok(());
            }

            println!("{}", "Cleaning Impact".cyan().bold());
            println!("{}", "─".repeat(40));
            println!(
                "{}: {} chars, {} lines, {} words",
                "Original".bold(),
                impact.original.length,
                impact.original.lines,
                impact.original.words
            );
            println!(
                "{}: {} chars, {} lines, {} words",
                "Cleaned".bold(),
                impact.cleaned.length,
                impact.cleaned.lines,
                impact.cleaned.words
            );
            println!(
                "{}: {} chars ({:.1}%)",
                "Removed".bold(),
                impact.removed.length,
                impact.removed.percentage
            );

            println!("\n{}", "Placeholders".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "Equations".bold(), impact.placeholders.equations);
            println!("{}: {}", "Math".bold(), impact.placeholders.math);
            println!("{}: {}", "Code".bold(), impact.placeholders.code);
            println!("{}: {}", "Links".bold(), impact.placeholders.links);

            let outcome = match &report.outcome {
                Outcome::Accepted => "accepted".green().to_string(),
                Outcome::Fallback { reason } => format!("fallback ({})", reason).yellow().to_string(),
            };
            println!("\n{}: {}", "Outcome".bold(), outcome);
        }

        Commands::Debug {
            input,
            stage,
            overrides,
        } => {
            let options = apply_overrides(base, &overrides);
            let text = read_input(input.as_deref())?;
            let trace = debug_steps_with(&text, &options);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&trace)?);
                return Ok(());
            }

            if let Some(name) = stage {
                let snapshot = trace
                    .get(&name)
                    .ok_or_else(|| format!("stage '{}' did not run", name))?;
                println!("{}", snapshot);
                return Ok(());
            }

            for step in &trace.steps {
                println!(
                    "{} {} ({} chars)",
                    "──".dimmed(),
                    step.stage.cyan().bold(),
                    step.text.chars().count()
                );
                println!("{}\n", step.text);
            }

            let validation = &trace.validation;
            let status = if validation.valid {
                "valid".green()
            } else {
                "invalid".red()
            };
            println!(
                "{}: {} ({} words, {} placeholders)",
                "Validation".bold(),
                status,
                validation.word_count,
                validation.placeholder_count
            );
            for warning in &validation.warnings {
                println!("  {} {}", "!".yellow(), warning);
            }
            if let Some(error) = &trace.error {
                println!("{}: {}", "Error".red().bold(), error);
            }
        }

        Commands::Batch {
            inputs,
            output,
            overrides,
        } => {
            let options = apply_overrides(base, &overrides);
            let names = output_names(&inputs)?;
            fs::create_dir_all(&output)?;

            let pb = create_progress(inputs.len() as u64);
            let mut fallbacks = 0;
            for (input, name) in inputs.iter().zip(&names) {
                pb.set_message(display_name(input));
                let text = fs::read_to_string(input)?;
                let report = clean_with_report(&text, &options);
                if report.is_fallback() {
                    fallbacks += 1;
                }
                fs::write(output.join(name), &report.text)?;
                pb.inc(1);
            }
            pb.finish_and_clear();

            println!("{}", "Batch Complete".green().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "Output".bold(), output.display());
            println!("{}: {}", "Files".bold(), inputs.len());
            println!("{}: {}", "Fallbacks".bold(), fallbacks);
        }

        Commands::Config => {
            println!("{}", base.to_json()?);
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn load_options(
    config: Option<&Path>,
    preset: Preset,
) -> Result<CleanOptions, Box<dyn std::error::Error>> {
    match config {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            Ok(CleanOptions::from_json(&json)?)
        }
        None => Ok(preset.into()),
    }
}

fn apply_overrides(mut options: CleanOptions, overrides: &Overrides) -> CleanOptions {
    if let Some(max_length) = overrides.max_length {
        options.max_length = max_length;
    }
    if let Some(min_words) = overrides.min_words {
        options.min_words = min_words;
    }
    if let Some(min_chars) = overrides.min_chars {
        options.min_chars = min_chars;
    }
    if overrides.ascii {
        options.aggressive_unicode = true;
    }
    if overrides.preserve_equations {
        options.preserve_equations = true;
    }
    if overrides.silent {
        options.silent = true;
    }
    if let Some(letter_run) = overrides.letter_run {
        options.thresholds.letter_run = letter_run;
    }
    if let Some(length) = overrides.max_fragment_length {
        options.thresholds.max_fragment_length = length;
    }
    if let Some(ratio) = overrides.min_letter_ratio {
        options.thresholds.min_letter_ratio = ratio;
    }
    options
}

/// File names used inside the batch output directory, one per input.
///
/// Two inputs with the same base name would write the same output file, so
/// that is rejected before anything is written.
fn output_names(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, String> {
    let mut seen: HashMap<&OsStr, &Path> = HashMap::new();
    let mut names = Vec::with_capacity(inputs.len());
    for input in inputs {
        let name = input
            .file_name()
            .ok_or_else(|| format!("{} has no file name", input.display()))?;
        if let Some(first) = seen.insert(name, input) {
            return Err(format!(
                "{} and {} would both write {}",
                first.display(),
                input.display(),
                name.to_string_lossy()
            ));
        }
        names.push(PathBuf::from(name));
    }
    Ok(names)
}

fn read_input(path: Option<&Path>) -> io::Result<String> {
    match path {
        Some(p) if p != Path::new("-") => fs::read_to_string(p),
        _ => {
            let mut text = String::new();
            io::stdin().lock().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

fn print_version() {
    println!("{} {}", "promptsafe".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Text sanitizer for language-model prompts");
    println!();
    println!(
        "Stages: {}",
        promptsafe::Stage::ALL
            .iter()
            .map(|stage| stage.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
}

fn create_progress(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.blue} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=> "),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}
