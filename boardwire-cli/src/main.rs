//! Boardwire CLI - edit board projects, check wiring and generate firmware
//! from the command line.

use anyhow::{bail, Context};
use boardwire::catalog::PinRole;
use boardwire::{
    save_project, BoardModel, BoardwireCore, CheckResult, EditorSettings, GenerationOptions,
    GenerationResult, Issue, Netlist, Point, Severity,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "boardwire")]
#[command(about = "Microcontroller board wiring and code generation tool", long_about = None)]
#[command(version)]
struct Cli {
    /// Editor settings file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available boards
    Boards {
        /// Show every pin with its role and position
        #[arg(long)]
        pins: bool,
    },

    /// List available component types
    Components,

    /// Create an empty project
    New {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Board type (arduino, esp32, teensy, daisy)
        #[arg(short, long, default_value = "arduino")]
        board: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Place a component
    Add {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Component type (led, button, ...)
        #[arg(value_name = "TYPE")]
        component_type: String,

        /// Left edge; defaults to the configured drop position
        #[arg(long, allow_negative_numbers = true)]
        x: Option<f64>,

        /// Top edge; defaults to the configured drop position
        #[arg(long, allow_negative_numbers = true)]
        y: Option<f64>,
    },

    /// Move a component
    Move {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(value_name = "ID")]
        id: String,

        #[arg(long, allow_negative_numbers = true)]
        x: f64,

        #[arg(long, allow_negative_numbers = true)]
        y: f64,
    },

    /// Remove a component and its connections
    Remove {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(value_name = "ID")]
        id: String,
    },

    /// Wire two pins together
    Connect {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(value_name = "SOURCE")]
        source: String,

        #[arg(value_name = "TARGET")]
        target: String,
    },

    /// Remove a connection
    Disconnect {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(value_name = "ID")]
        id: String,
    },

    /// Change the board. Discards all components and connections.
    SwitchBoard {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(value_name = "BOARD")]
        board: String,
    },

    /// Show the nets formed by the connections
    Nets {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Run the wiring checks
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Exit with error code if issues found at this severity or higher
        #[arg(long, value_enum)]
        fail_on: Option<FailOnSeverity>,
    },

    /// Generate firmware source
    Generate {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Write the source here instead of stdout
        #[arg(short, long, value_name = "PATH")]
        out: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Fail on warnings as well as errors
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for scripts
    Json,
}

#[derive(Clone, ValueEnum)]
enum FailOnSeverity {
    Error,
    Warning,
    Info,
}

impl From<&FailOnSeverity> for Severity {
    fn from(value: &FailOnSeverity) -> Self {
        match value {
            FailOnSeverity::Error => Severity::Error,
            FailOnSeverity::Warning => Severity::Warning,
            FailOnSeverity::Info => Severity::Info,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("BOARDWIRE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    process::exit(exit_code);
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let settings = match &cli.config {
        Some(path) => EditorSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => EditorSettings::default(),
    };
    tracing::debug!(
        "Catalog dir: {:?}, lookup policy: {:?}",
        settings.catalog_dir,
        settings.lookup_policy
    );

    match cli.command {
        Commands::Boards { pins } => {
            handle_boards(&settings, pins);
            Ok(0)
        }
        Commands::Components => {
            handle_components(&settings);
            Ok(0)
        }
        Commands::New { file, board, force } => handle_new(&settings, &file, &board, force),
        Commands::Add {
            file,
            component_type,
            x,
            y,
        } => edit(&settings, &file, |model| {
            let position = Point::new(
                x.unwrap_or(settings.default_drop_position.x),
                y.unwrap_or(settings.default_drop_position.y),
            );
            let component = model.add_component(&component_type, position)?;
            let pins: Vec<&str> = component.pins.iter().map(|p| p.id.as_str()).collect();
            Ok(format!(
                "Added {} at {} (pins: {})",
                component.id,
                component.position,
                pins.join(", ")
            ))
        }),
        Commands::Move { file, id, x, y } => edit(&settings, &file, |model| {
            model.move_component(&id, Point::new(x, y))?;
            Ok(format!("Moved {} to {}", id, Point::new(x, y)))
        }),
        Commands::Remove { file, id } => edit(&settings, &file, |model| {
            let before = model.connections().len();
            model.remove_component(&id)?;
            Ok(format!(
                "Removed {} and {} connection(s)",
                id,
                before - model.connections().len()
            ))
        }),
        Commands::Connect {
            file,
            source,
            target,
        } => edit(&settings, &file, |model| {
            let connection = model.add_connection(&source, &target)?;
            Ok(format!(
                "Connected {} -> {} as {}",
                connection.source_pin, connection.target_pin, connection.id
            ))
        }),
        Commands::Disconnect { file, id } => edit(&settings, &file, |model| {
            let connection = model.remove_connection(&id)?;
            Ok(format!(
                "Removed {} ({} -> {})",
                connection.id, connection.source_pin, connection.target_pin
            ))
        }),
        Commands::SwitchBoard { file, board } => edit(&settings, &file, |model| {
            let dropped = model.components().len();
            model.set_board(&board)?;
            Ok(format!(
                "Switched to {} ({} component(s) removed)",
                model.board().name,
                dropped
            ))
        }),
        Commands::Nets { file } => {
            let model = load(&settings, &file)?;
            output_nets(&model);
            Ok(0)
        }
        Commands::Check {
            file,
            format,
            fail_on,
        } => {
            let result = BoardwireCore::check_project(&file, &settings)
                .with_context(|| format!("Failed to check {}", file.display()))?;
            match format {
                OutputFormat::Human => output_check_human(&result),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
            }
            let failed = fail_on
                .map(|s| result.stats.at_least(Severity::from(&s)) > 0)
                .unwrap_or(false);
            Ok(if failed { 1 } else { 0 })
        }
        Commands::Generate {
            file,
            out,
            format,
            strict,
        } => {
            let options = GenerationOptions {
                strict,
                ..GenerationOptions::default()
            };
            let result = BoardwireCore::generate_project(&file, &settings, &options)
                .with_context(|| format!("Failed to generate code for {}", file.display()))?;
            handle_generated(&result, out.as_deref(), &format)?;
            Ok(if result.passed(&options) { 0 } else { 1 })
        }
    }
}

fn load(settings: &EditorSettings, file: &Path) -> anyhow::Result<BoardModel> {
    BoardwireCore::load_project(file, settings)
        .with_context(|| format!("Failed to load {}", file.display()))
}

/// Load, mutate and save a project, printing the edit's summary
fn edit<F>(settings: &EditorSettings, file: &Path, apply: F) -> anyhow::Result<i32>
where
    F: FnOnce(&mut BoardModel) -> Result<String, boardwire::BoardwireError>,
{
    let mut model = load(settings, file)?;
    let summary = apply(&mut model)?;
    save_project(&model, file).with_context(|| format!("Failed to save {}", file.display()))?;
    println!("{}", summary);
    Ok(0)
}

fn handle_new(
    settings: &EditorSettings,
    file: &Path,
    board: &str,
    force: bool,
) -> anyhow::Result<i32> {
    if file.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", file.display());
    }
    let model = BoardModel::with_settings(Arc::new(settings.catalog()), board, settings)?;
    save_project(&model, file).with_context(|| format!("Failed to write {}", file.display()))?;
    println!("Created {} for {}", file.display(), model.board().name);
    Ok(0)
}

fn handle_boards(settings: &EditorSettings, pins: bool) {
    let catalog = settings.catalog();
    println!("Available boards:\n");
    for board in catalog.boards.boards() {
        println!(
            "  {:<10} {:<14} {:<8} {} ({} pins)",
            board.id,
            board.name,
            board.platform.to_string(),
            board.fqbn,
            board.pins.len()
        );
        if pins {
            for pin in &board.pins {
                println!(
                    "      {:<6} {:<8} {}",
                    pin.id,
                    pin.role.to_string(),
                    pin.position
                );
            }
        }
    }
    if pins {
        let roles = [
            PinRole::Digital,
            PinRole::Analog,
            PinRole::Power,
            PinRole::Ground,
            PinRole::Control,
        ];
        let names: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
        println!("\nPin roles: {}", names.join(", "));
    }
}

fn handle_components(settings: &EditorSettings) {
    let catalog = settings.catalog();
    println!("Available components:\n");
    for def in catalog.components.get_component_types() {
        let pins: Vec<String> = def
            .pins
            .iter()
            .map(|p| format!("{} ({})", p.name, p.direction))
            .collect();
        println!("  {:<12} {:<18} {}", def.id, def.name, pins.join(", "));
    }
}

fn output_nets(model: &BoardModel) {
    let nets = Netlist::from_model(model).nets();
    if nets.is_empty() {
        println!("No connections");
        return;
    }
    for (i, net) in nets.iter().enumerate() {
        let names: Vec<String> = net
            .pins
            .iter()
            .map(|p| {
                model
                    .resolve_pin(p)
                    .map(|r| r.display_name())
                    .unwrap_or_else(|| p.clone())
            })
            .collect();
        println!("Net {}: {}", i + 1, names.join(", "));
    }
}

fn print_issue_group(title: &str, issues: &[&Issue]) {
    if issues.is_empty() {
        return;
    }
    println!("\n  {}:", title);
    for issue in issues {
        println!("    - {}", issue.message);
        if let Some(ref comp) = issue.component {
            println!("      Component: {}", comp);
        }
        if let Some(ref suggestion) = issue.suggestion {
            println!("      Suggestion: {}", suggestion);
        }
    }
}

fn output_check_human(result: &CheckResult) {
    println!("\nFile: {}", result.file.display());
    println!("{}", "─".repeat(60));

    if result.stats.total() == 0 {
        println!("  No issues found");
        return;
    }

    for (title, severity) in [
        ("ERRORS", Severity::Error),
        ("WARNINGS", Severity::Warning),
        ("INFO", Severity::Info),
        ("SUGGESTIONS", Severity::Suggestion),
    ] {
        let group: Vec<&Issue> = result
            .issues
            .iter()
            .filter(|i| i.severity == severity)
            .collect();
        print_issue_group(title, &group);
    }

    println!("\n  Summary:");
    println!("    Errors:      {}", result.stats.errors);
    println!("    Warnings:    {}", result.stats.warnings);
    println!("    Info:        {}", result.stats.info);
    println!("    Suggestions: {}", result.stats.suggestions);
}

fn handle_generated(
    result: &GenerationResult,
    out: Option<&Path>,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    if let Some(path) = out {
        std::fs::write(path, &result.code.source)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
        OutputFormat::Human => {
            match out {
                Some(path) => println!(
                    "Wrote {} bytes to {}",
                    result.code.source.len(),
                    path.display()
                ),
                None => print!("{}", result.code.source),
            }
            for issue in &result.code.issues {
                eprintln!("{}: {}", issue.severity, issue.message);
            }
        }
    }
    Ok(())
}
