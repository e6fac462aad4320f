//! cpaudit - Firewall policy export auditor
//!
//! Reads an object export and an access-rule export, then reports which
//! objects a target is attached to and which accept rules carry traffic out
//! of or into that set.
//!
//! # Usage
//!
//! ```bash
//! cpaudit --objs objects.json --acls rules.json -t web-01
//! cpaudit --objs objects.json --acls rules.json --uid 3f2a...  # ambiguous names
//! cpaudit --objs objects.json --acls rules.json -t web-01 --format json
//! cpaudit --print-config
//! ```
//!
//! Reports go to stdout; logs go to stderr (`-v`, `-vv`, `-vvv`, `-q`).

use clap::{ArgAction, Parser};
use cpaudit::audit::{self, AuditRequest, TargetSelector};
use cpaudit::config::{self, AuditConfig, LogLevel, OutputFormat};
use cpaudit::validators::validate_target;
use std::path::PathBuf;
use std::process::ExitCode;

shadow_rs::shadow!(build);

const LONG_VERSION: &str = shadow_rs::formatcp!(
    "{}\ncommit: {}{}\nbuilt: {}",
    build::PKG_VERSION,
    build::SHORT_COMMIT,
    if build::GIT_CLEAN { "" } else { " (dirty)" },
    build::BUILD_TIME
);

#[derive(Parser)]
#[command(name = "cpaudit", version, long_version = LONG_VERSION)]
#[command(about = "Audit a firewall policy export around one object", long_about = None)]
struct Cli {
    /// Object export (JSON array of object records)
    #[arg(long, value_name = "FILE", required_unless_present = "print_config")]
    objs: Option<PathBuf>,

    /// Access rule export (JSON array of rule records)
    #[arg(long, value_name = "FILE", required_unless_present = "print_config")]
    acls: Option<PathBuf>,

    /// Target object, by name
    #[arg(
        short = 't',
        long = "target",
        value_name = "NAME",
        conflicts_with = "uid",
        required_unless_present_any = ["uid", "print_config"]
    )]
    target: Option<String>,

    /// Target object, by identifier
    #[arg(long, value_name = "UID")]
    uid: Option<String>,

    /// Output format (defaults to the configured format)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More log output on stderr (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Less log output on stderr (repeatable)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "verbose")]
    quiet: u8,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn target_selector(&self) -> Result<TargetSelector, String> {
        match (&self.target, &self.uid) {
            (Some(name), _) => Ok(TargetSelector::Name(validate_target(name)?.to_string())),
            (None, Some(uid)) => Ok(TargetSelector::Uid(validate_target(uid)?.to_string())),
            (None, None) => Err("A target is required (-t NAME or --uid UID)".to_string()),
        }
    }

    fn request(&self) -> Result<AuditRequest, String> {
        let (Some(objects_path), Some(acls_path)) = (&self.objs, &self.acls) else {
            return Err("Both --objs and --acls are required".to_string());
        };
        Ok(AuditRequest {
            objects_path: objects_path.clone(),
            acls_path: acls_path.clone(),
            target: self.target_selector()?,
        })
    }
}

fn init_logging(config: &AuditConfig, cli: &Cli) -> LogLevel {
    let steps = i8::try_from(cli.verbose).unwrap_or(i8::MAX)
        - i8::try_from(cli.quiet).unwrap_or(i8::MAX);
    let level = config.log_level.adjusted(steps);

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level.as_tracing())
        .with_target(false)
        .init();
    level
}

fn report_error(error: &cpaudit::Error) {
    let translation = error.translate();
    eprintln!("Error: {}", translation.user_message);
    for suggestion in &translation.suggestions {
        eprintln!("  - {suggestion}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            report_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let level = init_logging(&config, &cli);
    let format = cli.format.unwrap_or(config.default_format);
    tracing::debug!("Log level {}, output format {}", level, format);

    if cli.print_config {
        return match serde_json::to_string_pretty(&config) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                report_error(&e.into());
                ExitCode::FAILURE
            }
        };
    }

    let request = match cli.request() {
        Ok(request) => request,
        Err(message) => {
            eprintln!("Error: {message}");
            return ExitCode::FAILURE;
        }
    };

    let report = match audit::run(&request, &config) {
        Ok(report) => report,
        Err(e) => {
            report_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let rendered = match format {
        OutputFormat::Text => Ok(report.to_text()),
        OutputFormat::Json => report.to_json(),
    };

    match rendered {
        Ok(output) => {
            print!("{output}");
            if !output.ends_with('\n') {
                println!();
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}
