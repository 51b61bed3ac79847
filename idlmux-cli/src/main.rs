use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use idlmux_codegen::emitters;
use idlmux_codegen::CodeGenerator;
use idlmux_spec::loader::{self, LoadedModel};
use idlmux_spec::types::common::{Severity, Target};
use idlmux_spec::types::config::GeneratorConfig;
use idlmux_spec::types::error::{ErrorEntry, ValidationReport};
use idlmux_valid::ValidateOptions;

#[derive(Parser)]
#[command(name = "idlmux", about = "idlmux – one IDL model, three schema languages")]
#[command(version, propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate Protobuf, GraphQL and OpenAPI schemas from a model
    Generate {
        /// Model file or directory (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Output directory (defaults to the configured directory next to the model)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Target to generate; repeat for several (defaults to the configured targets)
        #[arg(short = 't', long = "target", value_parser = parse_target)]
        targets: Vec<Target>,
        /// Emit one .proto file per namespace
        #[arg(long)]
        split_proto: bool,
    },
    /// Validate a model
    Validate {
        /// Model file or directory (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Check a model and show summary info
    Check {
        /// Model file or directory (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Print the JSON Schema of model documents
    Schema {
        /// Print the schema of the generator config file instead
        #[arg(long)]
        config: bool,
    },
}

fn parse_target(s: &str) -> Result<Target, String> {
    s.parse()
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Generate {
            path,
            out,
            targets,
            split_proto,
        } => cmd_generate(&path, out.as_deref(), &targets, split_proto),
        Command::Validate { path } => cmd_validate(&path),
        Command::Check { path } => cmd_check(&path),
        Command::Schema { config } => cmd_schema(config),
    };

    match result {
        Ok(success) => {
            if success {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::from(1)
        }
    }
}

fn load(path: &Path) -> Result<(LoadedModel, ValidationReport)> {
    loader::load_model(path)
        .with_context(|| format!("Failed to load model at '{}'", path.display()))
}

fn validate_options(config: &GeneratorConfig) -> ValidateOptions {
    ValidateOptions {
        targets: config.output.targets.clone(),
        split_proto: config.proto.split_by_namespace,
    }
}

/// Load and validate against the model's own config, merging both reports.
fn load_and_validate(path: &Path) -> Result<(LoadedModel, ValidationReport)> {
    let (model, mut report) = load(path)?;
    report.merge(idlmux_valid::validate(
        &model.schema,
        &validate_options(&model.config),
    ));
    Ok((model, report))
}

/// Print every entry and return the error and warning counts.
fn print_entries(entries: &[ErrorEntry]) -> (usize, usize) {
    for entry in entries {
        let severity_str = match entry.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Info => "info".blue().bold(),
        };

        println!(
            "  {} [{}] {} ({}:{})",
            severity_str,
            entry.code.dimmed(),
            entry.message,
            entry.file.dimmed(),
            entry.path.dimmed(),
        );

        if let Some(suggestion) = &entry.suggestion {
            println!("    {} {}", "hint:".cyan(), suggestion);
        }
    }

    let count = |severity| entries.iter().filter(|e| e.severity == severity).count();
    (count(Severity::Error), count(Severity::Warning))
}

fn display_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn cmd_validate(path: &Path) -> Result<bool> {
    println!("{} {}", "Validating".bold(), display_path(path).display());

    let (model, report) = load_and_validate(path)?;
    let (error_count, warning_count) = print_entries(&report.errors);
    let schema = &model.schema;

    println!();
    if error_count == 0 && warning_count == 0 {
        println!(
            "{} Model is valid ({} types, {} enums, {} unions, {} services)",
            "✓".green().bold(),
            schema.types.len(),
            schema.enums.len(),
            schema.unions.len(),
            schema.services.len(),
        );
        Ok(true)
    } else if error_count == 0 {
        println!(
            "{} Valid with {} warning(s)",
            "⚠".yellow().bold(),
            warning_count,
        );
        Ok(true)
    } else {
        println!(
            "{} {} error(s), {} warning(s)",
            "✗".red().bold(),
            error_count,
            warning_count,
        );
        Ok(false)
    }
}

fn cmd_check(path: &Path) -> Result<bool> {
    let (model, report) = load_and_validate(path)?;
    let schema = &model.schema;
    let config = &model.config;

    println!("{}", "Model Info".bold().underline());
    println!("  Namespace: {}", schema.namespace);
    println!(
        "  Version:   {}",
        schema.version.as_deref().unwrap_or("(none)")
    );
    println!("  Documents: {}", model.files.len());
    for file in &model.files {
        println!("    {} {}", "→".dimmed(), file);
    }

    println!();
    println!("{}", "Declarations".bold().underline());
    println!("  Types:     {}", schema.types.len());
    println!("  Enums:     {}", schema.enums.len());
    println!("  Unions:    {}", schema.unions.len());
    println!("  Services:  {}", schema.services.len());

    println!();
    println!("{}", "Targets".bold().underline());
    for &target in &config.output.targets {
        let file = match emitters::create_emitter(target, config) {
            Ok(_) if target == Target::Protobuf && config.proto.split_by_namespace => {
                "one file per namespace".to_string()
            }
            Ok(emitter) => emitter.filename().to_string(),
            Err(e) => format!("{} {e}", "✗".red().bold()),
        };
        println!("  {:<9} {}", target.as_str(), file);
    }
    println!("  Output:    {}", config.output.directory);

    println!();
    let error_count = report.count(Severity::Error);
    if error_count > 0 {
        println!(
            "{} {} validation error(s) found",
            "✗".red().bold(),
            error_count
        );
        Ok(false)
    } else {
        println!("{} No validation errors", "✓".green().bold());
        Ok(true)
    }
}

fn cmd_generate(
    path: &Path,
    out: Option<&Path>,
    targets: &[Target],
    split_proto: bool,
) -> Result<bool> {
    println!(
        "{} {}",
        "Generating schemas from".bold(),
        display_path(path).display()
    );

    // 1. Load, apply CLI overrides & validate
    let (model, mut report) = load(path)?;
    let mut config = model.config.clone();
    if !targets.is_empty() {
        config.output.targets = targets.to_vec();
    }
    if split_proto {
        config.proto.split_by_namespace = true;
    }

    report.merge(idlmux_valid::validate(
        &model.schema,
        &validate_options(&config),
    ));
    let (error_count, _) = print_entries(&report.errors);
    if error_count > 0 {
        eprintln!(
            "{} {} validation error(s), fix them before generating",
            "✗".red().bold(),
            error_count
        );
        return Ok(false);
    }

    // 2. Emit every target
    let generator = CodeGenerator::new(&config).context("Invalid generator configuration")?;
    let output = generator.generate(&model.schema);
    print_entries(output.diagnostics());

    // 3. Write output
    let output_dir = match out {
        Some(d) => d.to_path_buf(),
        None => model_dir(path).join(&config.output.directory),
    };

    output
        .write_to_disk(&output_dir)
        .with_context(|| format!("Failed to write to '{}'", output_dir.display()))?;

    println!(
        "{} Generated {} file(s) → {}",
        if output.has_errors() {
            "⚠".yellow().bold()
        } else {
            "✓".green().bold()
        },
        output.file_count(),
        output_dir.display()
    );

    for file_path in output.files().keys() {
        println!("  {} {}", "→".dimmed(), file_path);
    }

    Ok(!output.has_errors())
}

/// Directory the configured output directory is relative to.
fn model_dir(path: &Path) -> PathBuf {
    if path.is_file() {
        path.parent().map(Path::to_path_buf).unwrap_or_default()
    } else {
        path.to_path_buf()
    }
}

fn cmd_schema(config: bool) -> Result<bool> {
    let schema = if config {
        idlmux_spec::schema_def::generate_config_schema()
    } else {
        idlmux_spec::schema_def::generate_model_schema()
    }
    .context("Failed to build JSON Schema")?;

    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(true)
}
