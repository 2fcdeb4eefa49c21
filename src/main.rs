//! kawesome - generate Kusion resources for the kawesome module

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kawesome_common::{GeneratorRequest, GeneratorResponse, ModuleGenerator};
use kawesome_module::KawesomeGenerator;

/// kawesome - generate a Service and a random password for an application
#[derive(Parser, Debug)]
#[command(name = "kawesome", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate resources for one request
    ///
    /// Reads a generator request (YAML or JSON) and prints the generated
    /// resources and patch. Logs go to stderr.
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Path to the request document, or `-` for stdin
    #[arg(short = 'f', long, env = "KAWESOME_REQUEST", default_value = "-")]
    request: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, env = "KAWESOME_OUTPUT", default_value_t)]
    output: OutputFormat,
}

/// Output format
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum OutputFormat {
    /// YAML (default)
    #[default]
    Yaml,
    /// Pretty-printed JSON
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => run_generate(args),
    }
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let request = read_request(&args.request)?;
    let generator = KawesomeGenerator::new();
    info!(module = generator.name(), "running module generator");

    let response = generator.generate(&request).map_err(|e| {
        error!(error = %e, category = e.category(), "generation failed");
        e
    })?;

    print!("{}", render(&response, args.output)?);
    Ok(())
}

fn read_request(path: &Path) -> Result<GeneratorRequest> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read request {}", path.display()))?
    };

    serde_yaml::from_str(&raw).context("failed to parse generator request")
}

fn render(response: &GeneratorResponse, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(response).context("failed to encode response"),
        OutputFormat::Json => {
            let mut out =
                serde_json::to_string_pretty(response).context("failed to encode response")?;
            out.push('\n');
            Ok(out)
        }
    }
}
