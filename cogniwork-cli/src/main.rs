mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use cogniwork_core::prelude::*;
use cogniwork_export::ExportFormat;
use commands::{ExportRequest, ExportTarget};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "cogniwork")]
#[command(about = "Validate form submissions and export HR records")]
struct Cli {
    /// TOML settings file
    #[arg(long, global = true)]
    config_file: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a JSON object of form values against a schema
    Validate {
        #[arg(long)]
        values: PathBuf,
        #[arg(long)]
        schema: PathBuf,
    },
    /// Format records and write them as CSV or JSON
    Export {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
        /// Output path, "-" for stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List keyboard shortcuts
    Shortcuts {
        /// Only show shortcuts triggered by this chord, e.g. "ctrl+k"
        #[arg(long)]
        press: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Json => ExportFormat::Json,
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut settings = Settings::load(cli.config_file.as_deref())
        .context("Failed to load settings")?;
    if let Some(level) = &cli.log_level {
        settings.logging.level = level.parse::<LogLevel>()?;
    }
    settings.logging.clone().init()?;

    match cli.command {
        Commands::Validate { values, schema } => {
            let validation = commands::validate(&values, &schema)?;
            println!("{}", serde_json::to_string_pretty(&validation)?);
            Ok(if validation.is_valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Export {
            input,
            config,
            format,
            output,
        } => {
            let request = ExportRequest {
                input,
                config,
                format: format.map(ExportFormat::from),
                output,
            };
            match commands::export(&request, &settings.export)? {
                ExportTarget::Stdout(content) => println!("{}", content),
                ExportTarget::File(path) => eprintln!("Exported to {}", path.display()),
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Shortcuts { press } => {
            for line in commands::shortcuts(press.as_deref())? {
                println!("{}", line);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
