//! Aegis - Event Safety Alerting Console
//!
//! Compose, preview and send safety alerts to event attendees.
//!
//! ## Usage
//!
//! ```bash
//! # Preview an alert without sending it
//! aegis preview "Severe weather, move indoors" --priority warning
//!
//! # Send an emergency voice call to attendees near a point
//! aegis send "Evacuate the north lawn" --priority emergency --method call \
//!     --lat 37.7749 --lon -122.4194 --radius 500
//!
//! # Schedule an alert for later
//! aegis send "Shuttles leave in 5 minutes" --in 25m
//!
//! # Inspect the roster and backend
//! aegis users
//! aegis locations --near 37.7749,-122.4194 --within 1000
//! aegis health
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use aegis_backend::{AegisClient, BackendError, Registration, within_radius};
use aegis_compose::{
    AlertDispatcher, AlertDraft, ComposeSession, DeliveryMethod, Priority, SubmitOutcome,
    TargetKind, ValidationError,
};
use aegis_config::AegisConfig;
use aegis_core::{GeoPoint, LogGuard, init_logging};
use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

/// Aegis event-safety alerting console
///
/// Compose targeted alerts, preview them, and deliver them by text or
/// voice call through the Aegis alert backend.
#[derive(Parser, Debug)]
#[command(name = "aegis")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory for log files (defaults to ~/.aegis/logs/)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Configuration file (defaults to ~/.aegis/config.yaml)
    #[arg(short, long, global = true, env = "AEGIS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Subcommand)]
#[command(rename_all = "kebab-case")]
enum Command {
    /// Show what an alert will look like, and any problems with it.
    Preview(PreviewArgs),
    /// Validate, preview and send an alert.
    Send(SendArgs),
    /// List registered attendees.
    Users,
    /// List attendee locations, optionally near a point.
    Locations(LocationsArgs),
    /// Register an attendee.
    Register(RegisterArgs),
    /// Check the alert backend.
    Health,
}

#[derive(Debug, clap::Args)]
struct AlertArgs {
    /// Alert message delivered to recipients
    message: String,

    /// Short event name (defaults to backend.default_event_name)
    #[arg(long)]
    title: Option<String>,

    /// info, warning or emergency
    #[arg(short, long, default_value = "info")]
    priority: Priority,

    /// text or call
    #[arg(short, long, default_value = "text")]
    method: DeliveryMethod,

    /// all, medical_condition, age_group, location or custom
    #[arg(short, long)]
    target: Option<TargetKind>,

    /// Medical condition for medical_condition targets
    #[arg(long)]
    condition: Option<String>,

    /// minors, adults or seniors for age_group targets
    #[arg(long)]
    age_group: Option<String>,

    /// Latitude for location targets
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude for location targets
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Radius in meters for location targets
    #[arg(long)]
    radius: Option<i64>,

    /// Free-text criteria for custom targets
    #[arg(long)]
    criteria: Option<String>,

    /// Deliver after this delay (e.g. 15m, 1h30m)
    #[arg(long = "in", value_parser = humantime::parse_duration)]
    delay: Option<std::time::Duration>,

    /// Event FAQ slug for voice calls
    #[arg(long)]
    event_slug: Option<String>,
}

#[derive(Debug, clap::Args)]
struct PreviewArgs {
    #[command(flatten)]
    alert: AlertArgs,

    /// Print the preview as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, clap::Args)]
struct SendArgs {
    #[command(flatten)]
    alert: AlertArgs,

    /// Run the full workflow without contacting the backend
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, clap::Args)]
struct LocationsArgs {
    /// Center point as LAT,LON
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    near: Option<GeoPoint>,

    /// Radius in meters around --near
    #[arg(long, default_value_t = 1000.0, requires = "near")]
    within: f64,
}

#[derive(Debug, clap::Args)]
struct RegisterArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    phone: String,

    #[arg(long)]
    age: Option<u32>,

    #[arg(long)]
    gender: Option<String>,

    /// Medical information shared with responders
    #[arg(long)]
    medical: Option<String>,

    #[arg(long)]
    emergency_contact: Option<String>,
}

/// Exit code for drafts that fail validation.
const EXIT_INVALID: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AegisConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Some(hint) = e.guidance() {
                eprintln!("{}", hint);
            }
            return ExitCode::from(1);
        }
    };

    // Initialize logging
    let _guard = match setup_logging(&cli, &config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::from(1);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            return ExitCode::from(1);
        }
    };

    match runtime.block_on(run(cli.command, &config)) {
        Ok(code) => code,
        Err(e) => {
            error!("aegis error: {:#}", e);
            eprintln!("Error: {:#}", e);
            if let Some(hint) = e.downcast_ref::<BackendError>().map(BackendError::suggested_action) {
                eprintln!("{}", hint);
            }
            ExitCode::from(1)
        }
    }
}

/// Set up logging based on CLI arguments and config.
fn setup_logging(cli: &Cli, config: &AegisConfig) -> aegis_core::Result<LogGuard> {
    let log_dir = cli.log_dir.clone().or_else(|| config.logging.log_dir.clone());
    init_logging(log_dir, cli.verbose > 0)
}

async fn run(command: Command, config: &AegisConfig) -> anyhow::Result<ExitCode> {
    match command {
        Command::Preview(args) => preview(args),
        Command::Send(args) => send(args, config).await,
        Command::Users => users(config).await,
        Command::Locations(args) => locations(args, config).await,
        Command::Register(args) => register(args, config).await,
        Command::Health => health(config).await,
    }
}

fn client(config: &AegisConfig) -> anyhow::Result<AegisClient> {
    AegisClient::from_config(&config.backend).context("creating backend client")
}

/// Build a draft through the same setters an interactive form would use.
fn build_draft(args: AlertArgs) -> anyhow::Result<AlertDraft> {
    let mut draft = AlertDraft::new(args.message)
        .with_priority(args.priority)
        .with_delivery_method(args.method);

    if let Some(title) = args.title {
        draft.set_title(title);
    }
    if let Some(slug) = args.event_slug {
        draft.set_event_slug(slug);
    }
    if let Some(kind) = args.target {
        draft.select_target(kind);
    }
    if let Some(condition) = args.condition {
        draft.set_medical_condition(&condition);
    }
    if let Some(group) = args.age_group {
        draft.set_age_group(&group);
    }
    if args.lat.is_some() || args.lon.is_some() || args.radius.is_some() {
        draft.set_latitude(args.lat);
        draft.set_longitude(args.lon);
        draft.set_radius_meters(args.radius);
    }
    if let Some(criteria) = args.criteria {
        draft.set_criteria(criteria);
    }
    if let Some(delay) = args.delay {
        draft.set_schedule(Some(schedule_after(chrono::Utc::now(), delay)?));
    }

    Ok(draft)
}

/// Delivery time `delay` after `now`.
fn schedule_after(
    now: chrono::DateTime<chrono::Utc>,
    delay: std::time::Duration,
) -> anyhow::Result<chrono::DateTime<chrono::Utc>> {
    chrono::TimeDelta::from_std(delay)
        .ok()
        .and_then(|delay| now.checked_add_signed(delay))
        .with_context(|| format!("--in {} is too far in the future", humantime::format_duration(delay)))
}

/// How long a delivered alert stays on screen.
fn success_display(secs: u64) -> anyhow::Result<chrono::TimeDelta> {
    i64::try_from(secs)
        .ok()
        .and_then(chrono::TimeDelta::try_seconds)
        .with_context(|| format!("compose.success_display_secs {secs} is out of range"))
}

fn print_validation_errors(errors: &[ValidationError]) {
    eprintln!("Alert not sent, fix the following:");
    for err in errors {
        eprintln!("  - {}", err);
    }
}

fn preview(args: PreviewArgs) -> anyhow::Result<ExitCode> {
    let session = ComposeSession::with_draft(build_draft(args.alert)?);
    let summary = session.preview();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary);
    }

    if let Err(errors) = session.validate() {
        print_validation_errors(&errors);
        return Ok(ExitCode::from(EXIT_INVALID));
    }
    Ok(ExitCode::SUCCESS)
}

async fn send(args: SendArgs, config: &AegisConfig) -> anyhow::Result<ExitCode> {
    let display = success_display(config.compose.success_display_secs)?;
    let mut session =
        ComposeSession::with_draft(build_draft(args.alert)?).with_success_display(display);

    println!("{}\n", session.preview());

    let client = client(config)?;
    let dispatcher: Box<dyn AlertDispatcher> = if args.dry_run {
        Box::new(client.dry_run())
    } else {
        Box::new(client)
    };
    info!(dispatcher = dispatcher.name(), "sending alert");

    match session.submit(dispatcher.as_ref()).await {
        SubmitOutcome::Completed(result) if result.success => {
            match result.recipients_contacted {
                Some(count) => println!("Alert sent to {} recipients", count),
                None => println!("Alert sent"),
            }
            if args.dry_run {
                println!("(dry run, nothing was delivered)");
            }
            Ok(ExitCode::SUCCESS)
        }
        SubmitOutcome::Completed(result) => {
            eprintln!(
                "Failed: {}",
                result.error_message.as_deref().unwrap_or_default()
            );
            Ok(ExitCode::from(1))
        }
        SubmitOutcome::Invalid(errors) => {
            print_validation_errors(&errors);
            Ok(ExitCode::from(EXIT_INVALID))
        }
        SubmitOutcome::Ignored => Ok(ExitCode::SUCCESS),
    }
}

async fn users(config: &AegisConfig) -> anyhow::Result<ExitCode> {
    let roster = client(config)?.list_users().await?;

    println!("{} registered ({} reachable)", roster.total_users, roster.reachable_count());
    for user in &roster.users {
        let medical = if user.has_medical_information() { " [medical]" } else { "" };
        let age = user.age.map(|a| format!(", {a}")).unwrap_or_default();
        println!(
            "  {:<24} {:<16} registered {}{}{}",
            user.full_name, user.phone_number, user.registered_at, age, medical
        );
    }
    if !roster.hardcoded_numbers.is_empty() {
        println!("  + {} always-notified numbers", roster.hardcoded_numbers.len());
    }
    Ok(ExitCode::SUCCESS)
}

async fn locations(args: LocationsArgs, config: &AegisConfig) -> anyhow::Result<ExitCode> {
    let locations = client(config)?.list_locations().await?;
    let online = locations.iter().filter(|l| l.is_online()).count();
    println!("{} attendees, {} online", locations.len(), online);

    match args.near {
        Some(center) => {
            let nearby = within_radius(&locations, center, args.within);
            println!("{} within {}m of {}", nearby.len(), args.within, center);
            for (loc, distance) in nearby {
                println!(
                    "  {:<24} {:>7.0}m  {} ({})",
                    loc.full_name, distance, loc.status, loc.last_updated
                );
            }
        }
        None => {
            for loc in &locations {
                println!(
                    "  {:<24} {}  {} ({})",
                    loc.full_name,
                    loc.point(),
                    loc.status,
                    loc.last_updated
                );
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn register(args: RegisterArgs, config: &AegisConfig) -> anyhow::Result<ExitCode> {
    let mut registration = Registration::new(args.name, args.phone);
    if let Some(age) = args.age {
        registration = registration.with_age(age);
    }
    if let Some(gender) = args.gender {
        registration = registration.with_gender(gender);
    }
    if let Some(medical) = args.medical {
        registration = registration.with_medical_information(medical);
    }
    if let Some(contact) = args.emergency_contact {
        registration = registration.with_emergency_contact(contact);
    }

    let receipt = client(config)?.register_user(&registration).await?;
    println!(
        "Registered{}",
        receipt.user_id.map(|id| format!(" as {id}")).unwrap_or_default()
    );
    if let Some(message) = receipt.message {
        println!("{}", message);
    }
    Ok(ExitCode::SUCCESS)
}

async fn health(config: &AegisConfig) -> anyhow::Result<ExitCode> {
    let client = client(config)?;
    let health = client.health().await?;

    println!("{}: {}", client.base_url(), health.status);
    println!("  registered numbers: {}", health.registered_numbers);
    println!("  text service:  {}", availability(health.supports(DeliveryMethod::Text)));
    println!("  voice service: {}", availability(health.supports(DeliveryMethod::Call)));

    Ok(if health.is_healthy() { ExitCode::SUCCESS } else { ExitCode::from(1) })
}

fn availability(up: bool) -> &'static str {
    if up { "available" } else { "not configured" }
}

/// Parse `LAT,LON`.
fn parse_point(s: &str) -> Result<GeoPoint, String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got '{s}'"))?;
    let point = GeoPoint::new(
        lat.trim().parse().map_err(|e| format!("latitude: {e}"))?,
        lon.trim().parse().map_err(|e| format!("longitude: {e}"))?,
    );
    if !point.is_valid() {
        return Err(format!("{point} is not a valid coordinate"));
    }
    Ok(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_compose::TargetSpec;

    #[test]
    fn test_cli_parses_location_alert() {
        let cli = Cli::try_parse_from([
            "aegis", "send", "Evacuate", "--priority", "emergency", "--lat", "37.7749", "--lon",
            "-122.4194", "--radius", "1000", "--dry-run",
        ])
        .unwrap();

        let Command::Send(args) = cli.command else {
            panic!("expected send");
        };
        assert!(args.dry_run);
        let draft = build_draft(args.alert).unwrap();
        assert_eq!(draft.priority, Priority::Emergency);
        assert_eq!(draft.target, TargetSpec::location(37.7749, -122.4194, 1000));
    }

    #[test]
    fn test_cli_schedule_and_target() {
        let cli = Cli::try_parse_from([
            "aegis", "preview", "Shuttles leaving", "--target", "age_group", "--age-group",
            "seniors", "--in", "15m",
        ])
        .unwrap();

        let Command::Preview(args) = cli.command else {
            panic!("expected preview");
        };
        let draft = build_draft(args.alert).unwrap();
        assert_eq!(draft.target.selector_value().as_deref(), Some("seniors"));
        assert!(draft.scheduled_for.unwrap() > chrono::Utc::now());
    }

    #[test]
    fn test_huge_delay_is_an_error() {
        let cli = Cli::try_parse_from(["aegis", "send", "Shuttles leaving", "--in", "1000000years"])
            .unwrap();

        let Command::Send(args) = cli.command else {
            panic!("expected send");
        };
        let err = build_draft(args.alert).unwrap_err();
        assert!(err.to_string().contains("too far in the future"));
    }

    #[test]
    fn test_schedule_after() {
        let now = chrono::Utc::now();
        assert_eq!(
            schedule_after(now, std::time::Duration::from_secs(900)).unwrap(),
            now + chrono::TimeDelta::minutes(15)
        );
        assert!(schedule_after(now, std::time::Duration::MAX).is_err());
    }

    #[test]
    fn test_success_display_out_of_range() {
        assert_eq!(success_display(5).unwrap(), chrono::TimeDelta::seconds(5));
        assert!(success_display(10_000_000_000_000_000).is_err());
        assert!(success_display(u64::MAX).is_err());
    }

    #[test]
    fn test_parse_point() {
        assert_eq!(
            parse_point("37.7749, -122.4194"),
            Ok(GeoPoint::new(37.7749, -122.4194))
        );
        assert!(parse_point("91,0").is_err());
        assert!(parse_point("nowhere").is_err());
    }
}
