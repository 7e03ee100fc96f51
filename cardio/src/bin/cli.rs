//! CardioAnalyzer command-line front end.
//!
//! # Usage
//!
//! ```bash
//! # One-shot analysis against the development service
//! cargo run --bin cardio-cli -- --age 61 --gender female --chest-pain 2
//!
//! # Interactive form against an explicit service
//! cargo run --bin cardio-cli -- --base-url http://10.0.0.5:5000 --interactive
//! ```
//!
//! # Environment Variables
//!
//! - `CARDIO_ENV`, `CARDIO_API_URL`, `CARDIO_TIMEOUT_SECS`,
//!   `CARDIO_ENFORCE_RANGES`: see `cardio_rust::config`
//! - `RUST_LOG`: log level (default: warn)

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cardio_rust::config::{AppConfig, ConfigOverrides, Environment, ResetPolicy};
use cardio_rust::form::{AppView, InputCollector, RejectReason, SubmitOutcome};
use cardio_rust::models::{Field, Sex};
use cardio_rust::presentation::{self, ResultCard};

#[derive(Debug, Parser)]
#[command(
    name = "cardio-cli",
    version,
    about = "Cardiovascular risk analysis against a remote prediction service",
    after_help = presentation::DISCLAIMER
)]
struct Cli {
    /// Increase verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (default: ./cardio.toml or ./config/cardio.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Base URL of the prediction service
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// development | production (selects the default base URL)
    #[arg(long = "env", value_name = "ENV")]
    environment: Option<Environment>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Refuse to submit values outside the advisory ranges
    #[arg(long)]
    enforce_ranges: bool,

    /// restore-defaults | keep-edits
    #[arg(long, value_name = "POLICY")]
    reset_policy: Option<ResetPolicy>,

    /// Prompt for every field and allow repeated analyses
    #[arg(short, long)]
    interactive: bool,

    /// Print the result as JSON instead of a card
    #[arg(long, conflicts_with = "interactive")]
    json: bool,

    #[command(flatten)]
    fields: FieldArgs,
}

#[derive(Debug, Args)]
struct FieldArgs {
    #[arg(long)]
    age: Option<f64>,
    #[arg(long, value_name = "male|female")]
    gender: Option<Sex>,
    #[arg(long, value_name = "0-3")]
    chest_pain: Option<f64>,
    #[arg(long, value_name = "mmHg")]
    resting_bp: Option<f64>,
    #[arg(long, value_name = "mg/dL")]
    serum_cholesterol: Option<f64>,
    #[arg(long, value_name = "0-1")]
    fasting_blood_sugar: Option<f64>,
    #[arg(long, value_name = "0-2")]
    resting_ecg: Option<f64>,
    #[arg(long)]
    max_heart_rate: Option<f64>,
    #[arg(long, value_name = "0-1")]
    exercise_angina: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    oldpeak: Option<f64>,
    #[arg(long, value_name = "0-2")]
    slope: Option<f64>,
    #[arg(long, value_name = "0-4")]
    major_vessels: Option<f64>,
}

impl FieldArgs {
    fn values(&self) -> [(Field, Option<f64>); 11] {
        [
            (Field::Age, self.age),
            (Field::ChestPain, self.chest_pain),
            (Field::RestingBp, self.resting_bp),
            (Field::SerumCholesterol, self.serum_cholesterol),
            (Field::FastingBloodSugar, self.fasting_blood_sugar),
            (Field::RestingEcg, self.resting_ecg),
            (Field::MaxHeartRate, self.max_heart_rate),
            (Field::ExerciseAngina, self.exercise_angina),
            (Field::Oldpeak, self.oldpeak),
            (Field::Slope, self.slope),
            (Field::MajorVessels, self.major_vessels),
        ]
    }

    fn apply(&self, collector: &InputCollector) -> Result<()> {
        if let Some(sex) = self.gender {
            collector.set_sex(sex);
        }
        for (field, value) in self.values() {
            let Some(value) = value else { continue };
            if !value.is_finite() {
                bail!("{} must be a finite number", field.label());
            }
            collector.set(field, value);
        }
        Ok(())
    }
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            environment: self.environment,
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout,
            enforce_ranges: self.enforce_ranges,
            reset_policy: self.reset_policy,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => std::env::var("RUST_LOG")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(Level::WARN),
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.overrides().apply(&mut config);
    config.validate().context("Invalid configuration")?;
    info!(
        base_url = config.service.resolved_base_url(),
        timeout_secs = config.service.timeout_secs,
        "Configuration resolved"
    );

    let mut app = AppView::from_config(&config)?;
    cli.fields.apply(app.collector())?;

    if cli.interactive {
        run_interactive(&mut app).await
    } else {
        run_once(&mut app, cli.json).await
    }
}

/// Submit, cancelling the request on Ctrl-C.
async fn submit_with_interrupt(app: &mut AppView) -> SubmitOutcome {
    let handle = app.collector_handle();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.abort();
        }
    });
    let outcome = app.submit().await;
    watcher.abort();
    outcome
}

fn describe_rejection(reason: &RejectReason) -> String {
    match reason {
        RejectReason::Busy => "A prediction is already in progress".to_string(),
        RejectReason::OutOfRange(violations) => violations.to_string(),
        RejectReason::ResultVisible => "Reset the current result first".to_string(),
    }
}

async fn run_once(app: &mut AppView, json: bool) -> Result<()> {
    eprintln!("{}", presentation::submit_label(true));

    match submit_with_interrupt(app).await {
        SubmitOutcome::Delivered => {
            let Some(result) = app.result() else {
                bail!("Prediction finished without a result");
            };
            if json {
                println!("{}", serde_json::to_string_pretty(result)?);
            } else {
                println!("{}", ResultCard::new(result));
                println!();
                println!("{}", presentation::DISCLAIMER);
            }
            Ok(())
        }
        SubmitOutcome::Failed(message) => bail!(message),
        SubmitOutcome::Rejected(reason) => bail!(describe_rejection(&reason)),
        SubmitOutcome::Cancelled => bail!("Prediction cancelled"),
    }
}

fn current_value(collector: &InputCollector, field: Field) -> String {
    let value = collector.get(field);
    match field {
        Field::Gender => Sex::from_code(value).to_string(),
        _ => value.to_string(),
    }
}

fn prompt(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{}", text)?;
    stdout.flush()?;
    Ok(())
}

/// Read one line; `None` on end of input.
async fn read_line(lines: &mut Lines<BufReader<Stdin>>) -> Result<Option<String>> {
    Ok(lines
        .next_line()
        .await?
        .map(|line| line.trim().to_string()))
}

/// Walk the form. Returns `false` when input ended.
async fn fill_form(app: &AppView, lines: &mut Lines<BufReader<Stdin>>) -> Result<bool> {
    println!();
    println!("Cardiovascular Risk Analysis");
    println!("(press Enter to keep the value in brackets)");
    for field in Field::ALL {
        loop {
            if let Some(hint) = field.hint() {
                println!("  {}", hint);
            }
            prompt(&format!(
                "{} [{}]: ",
                field.label(),
                current_value(app.collector(), field)
            ))?;
            let Some(line) = read_line(lines).await? else {
                return Ok(false);
            };
            if line.is_empty() {
                break;
            }
            match app.collector().set_from_input(field.wire_name(), &line) {
                Ok(_) => break,
                Err(e) => eprintln!("{}", e),
            }
        }
    }
    Ok(true)
}

async fn run_interactive(app: &mut AppView) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if !fill_form(app, &mut lines).await? {
            return Ok(());
        }

        println!("{}", presentation::submit_label(true));
        match submit_with_interrupt(app).await {
            SubmitOutcome::Delivered => {}
            SubmitOutcome::Failed(message) => {
                eprintln!("{}", message);
                continue;
            }
            SubmitOutcome::Rejected(reason) => {
                eprintln!("{}", describe_rejection(&reason));
                continue;
            }
            SubmitOutcome::Cancelled => {
                eprintln!("Prediction cancelled");
                continue;
            }
        }

        if let Some(result) = app.result() {
            println!();
            println!("{}", ResultCard::new(result));
        }

        prompt(&format!("{}? [y/N]: ", presentation::RESET_LABEL))?;
        match read_line(&mut lines).await? {
            Some(answer) if answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes") => {
                app.reset();
            }
            _ => {
                println!("{}", presentation::DISCLAIMER);
                return Ok(());
            }
        }
    }
}
