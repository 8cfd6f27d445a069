mod options;
mod trace;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use combo_core::{CompileError, CompileOptions, CompileResult, ValidationError};
use serde_json::json;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Combo controller-input compiler.
#[derive(Parser)]
#[command(name = "combo", version, about = "Combo controller-input compiler")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log pipeline progress to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// TOML file with compile options
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Maximum number of validation branches (overrides --config)
    #[arg(long, global = true)]
    max_branches: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Source {
    /// Path to a .combo source file
    #[arg(required_unless_present = "expr", conflicts_with = "expr")]
    file: Option<PathBuf>,

    /// Inline combo source instead of a file
    #[arg(long)]
    expr: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile source to the executable action tree
    Compile {
        #[command(flatten)]
        source: Source,
    },

    /// Validate source and report every error found
    Check {
        #[command(flatten)]
        source: Source,
    },

    /// Print the validation branches of a source
    Branches {
        #[command(flatten)]
        source: Source,
    },

    /// Dry-run the compiled actions and print each controller step
    Play {
        #[command(flatten)]
        source: Source,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let options = match options::resolve(cli.config.as_deref(), cli.max_branches) {
        Ok(o) => o,
        Err(e) => {
            report_error(&e.to_string(), cli.output, cli.quiet);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Compile { source } => {
            let src = read_source(&source, cli.output, cli.quiet);
            cmd_compile(&src, &options, cli.output, cli.quiet);
        }
        Commands::Check { source } => {
            let src = read_source(&source, cli.output, cli.quiet);
            cmd_check(&src, &options, cli.output, cli.quiet);
        }
        Commands::Branches { source } => {
            let src = read_source(&source, cli.output, cli.quiet);
            cmd_branches(&src, &options, cli.output, cli.quiet);
        }
        Commands::Play { source } => {
            let src = read_source(&source, cli.output, cli.quiet);
            cmd_play(&src, &options, cli.output, cli.quiet);
        }
    }
}

fn read_source(source: &Source, output: OutputFormat, quiet: bool) -> String {
    if let Some(expr) = &source.expr {
        return expr.clone();
    }
    let Some(path) = source.file.as_deref() else {
        report_error("no source given; pass a file or --expr", output, quiet);
        process::exit(1);
    };
    match std::fs::read_to_string(path) {
        Ok(s) => {
            tracing::debug!(path = %path.display(), bytes = s.len(), "read source file");
            s
        }
        Err(e) => {
            let msg = format!("error reading '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

fn print_errors(errors: &[ValidationError], quiet: bool) {
    if quiet {
        return;
    }
    for e in errors {
        eprintln!("{}", e);
    }
}

fn print_json(value: &serde_json::Value) {
    let pretty = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
    println!("{}", pretty);
}

fn cmd_compile(src: &str, options: &CompileOptions, output: OutputFormat, quiet: bool) {
    let result = combo_core::compile_with(src, options);
    match output {
        OutputFormat::Json => print_json(&json!({
            "ast": result.ast.to_json_value(),
            "errors": errors_json(&result.errors),
        })),
        OutputFormat::Text => {
            for line in result.ast.lines() {
                println!("{}", line);
            }
            print_errors(&result.errors, quiet);
        }
    }
    if !result.is_ok() {
        process::exit(1);
    }
}

fn cmd_check(src: &str, options: &CompileOptions, output: OutputFormat, quiet: bool) {
    let result = combo_core::compile_with(src, options);
    match output {
        OutputFormat::Json => print_json(&json!({
            "branch_count": result.branch_count,
            "errors": errors_json(&result.errors),
        })),
        OutputFormat::Text => {
            print_errors(&result.errors, quiet);
            if !quiet {
                println!("{}", summary(&result));
            }
        }
    }
    if !result.is_ok() {
        process::exit(1);
    }
}

fn cmd_branches(src: &str, options: &CompileOptions, output: OutputFormat, quiet: bool) {
    let branches = combo_core::compile_plain_ast(src).and_then(|ast| {
        combo_core::create_debug_branches(ast, options).map_err(CompileError::from)
    });
    let branches = match branches {
        Ok(b) => b,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };

    match output {
        OutputFormat::Json => print_json(&json!({
            "branches": branches.to_json_value(),
            "truncated": branches.truncated,
        })),
        OutputFormat::Text => {
            for i in 0..branches.len() {
                println!("branch {}:", i);
                for line in branches.lines(i) {
                    println!("  {}", line);
                }
            }
            if branches.truncated && !quiet {
                eprintln!(
                    "warning: stopped at {} branches (raise --max-branches to see more)",
                    branches.len()
                );
            }
        }
    }
}

fn cmd_play(src: &str, options: &CompileOptions, output: OutputFormat, quiet: bool) {
    let result = combo_core::compile_with(src, options);
    if !result.is_ok() {
        match output {
            OutputFormat::Json => print_json(&json!({ "errors": errors_json(&result.errors) })),
            OutputFormat::Text => {
                print_errors(&result.errors, quiet);
                report_error("refusing to play a combo with errors", output, quiet);
            }
        }
        process::exit(1);
    }

    let mut player = trace::TracePlayer::default();
    if let Err(e) = combo_core::play(&result.ast, &mut player) {
        report_error(&format!("play failed: {}", e), output, quiet);
        process::exit(1);
    }

    match output {
        OutputFormat::Json => print_json(&json!({ "steps": player.steps() })),
        OutputFormat::Text => {
            for step in player.steps() {
                println!("{}", step);
            }
        }
    }
}

fn errors_json(errors: &[ValidationError]) -> Vec<serde_json::Value> {
    errors.iter().map(ValidationError::to_json_value).collect()
}

fn summary(result: &CompileResult) -> String {
    let branches = match result.branch_count {
        1 => "1 branch".to_string(),
        n => format!("{} branches", n),
    };
    match result.errors.len() {
        0 => format!("ok: {} checked, no errors", branches),
        1 => format!("{} checked, 1 error", branches),
        n => format!("{} checked, {} errors", branches, n),
    }
}

/// Report an error message to stderr, respecting output format and quiet flag.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("error: {}", msg),
        OutputFormat::Json => {
            eprintln!("{}", json!({ "error": msg }));
        }
    }
}
