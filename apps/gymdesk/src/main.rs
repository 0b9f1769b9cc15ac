use anyhow::{bail, Context};
use chrono::Local;
use clap::{Parser, Subcommand};
use gymdesk_config::load as load_config;
use gymdesk_dashboard::{
    recent_check_ins, weekly_schedule, EntityRecord, StatusFilter, RECENT_CHECK_INS_LIMIT,
};
use gymdesk_database::{EntityKind, Member};
use gymdesk_runtime::{telemetry, GymServices};
use serde_json::{Map, Value};
use tracing::info;

#[derive(Parser)]
#[command(name = "gymdesk")]
#[command(about = "Gym front desk: members, equipment, classes and check-ins")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the dashboard counters
    Stats,
    /// List a collection (members, equipment, classes, checkins)
    List {
        kind: EntityKind,
        /// Case-insensitive match on name or email
        #[arg(long, default_value = "")]
        search: String,
        /// Exact status, or "all"
        #[arg(long, default_value = "all")]
        status: String,
    },
    /// Show the weekly class schedule
    Schedule,
    /// Show the most recent check-ins
    Recent {
        #[arg(long, default_value_t = RECENT_CHECK_INS_LIMIT)]
        limit: usize,
    },
    /// Check in a member by id
    CheckIn { member_id: String },
    /// Simulate a QR scan of a random member
    Scan,
    /// Create a record from a JSON object
    Add { kind: EntityKind, json: String },
    /// Merge a JSON object into an existing record
    Update {
        kind: EntityKind,
        id: String,
        json: String,
    },
    /// Delete a record
    Delete { kind: EntityKind, id: String },
    /// Write the bundled fixture data
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing().context("failed to initialise tracing")?;

    let mut config = load_config().context("failed to load configuration")?;
    if matches!(cli.command, Commands::Seed) {
        config.store.seed_fixtures = false;
    }

    let services = GymServices::initialise(&config)
        .await
        .context("failed to initialise gym services")?;

    match cli.command {
        Commands::Stats => show_stats(&services).await,
        Commands::List {
            kind,
            search,
            status,
        } => list_records(&services, kind, &search, &status.as_str().into()).await,
        Commands::Schedule => show_schedule(&services).await,
        Commands::Recent { limit } => show_recent(&services, limit).await,
        Commands::CheckIn { member_id } => check_in(&services, &member_id).await,
        Commands::Scan => scan(&services).await,
        Commands::Add { kind, json } => add_record(&services, kind, &json).await,
        Commands::Update { kind, id, json } => update_record(&services, kind, &id, &json).await,
        Commands::Delete { kind, id } => delete_record(&services, kind, &id).await,
        Commands::Seed => seed(&services).await,
    }
}

async fn show_stats(services: &GymServices) -> anyhow::Result<()> {
    let stats = services
        .stores
        .dashboard_stats(&Local::now())
        .await
        .context("failed to compute dashboard stats")?;

    println!("=== DASHBOARD ===");
    println!("{:<20} {}", "Today's check-ins", stats.today_check_ins);
    println!("{:<20} {}", "Active members", stats.active_members);
    println!("{:<20} {}", "Classes today", stats.classes_today);
    println!("{:<20} {}", "Equipment alerts", stats.equipment_alerts);
    Ok(())
}

async fn list_records(
    services: &GymServices,
    kind: EntityKind,
    search: &str,
    status: &StatusFilter,
) -> anyhow::Result<()> {
    let records = services
        .stores
        .search(kind, search, status)
        .await
        .with_context(|| format!("failed to load {}", kind.label()))?;

    println!("=== {} ===", kind.label().to_uppercase());
    if records.is_empty() {
        println!("No {} found", kind.label());
        return Ok(());
    }

    let members = if kind == EntityKind::CheckIn {
        services.stores.members.get_all().await?
    } else {
        Vec::new()
    };

    println!("Found {} {}:", records.len(), kind.label());
    print_header(kind);
    for record in &records {
        print_row(record, &members);
    }
    Ok(())
}

fn print_header(kind: EntityKind) {
    let (header, width) = match kind {
        EntityKind::Member => (
            format!(
                "{:<26} {:<24} {:<30} {:<8} {:<10} {:<12}",
                "ID", "Name", "Email", "Plan", "Status", "Joined"
            ),
            115,
        ),
        EntityKind::Equipment => (
            format!(
                "{:<26} {:<26} {:<13} {:<12} {:<18} {:<12} {:<4}",
                "ID", "Name", "Category", "Status", "Location", "Next Service", "Due"
            ),
            117,
        ),
        EntityKind::Class => (
            format!(
                "{:<26} {:<22} {:<16} {:<10} {:<6} {:<6} {:<8}",
                "ID", "Name", "Instructor", "Day", "Start", "Mins", "Enrolled"
            ),
            100,
        ),
        EntityKind::CheckIn => (
            format!(
                "{:<26} {:<24} {:<8} {:<25}",
                "ID", "Member", "Method", "Timestamp"
            ),
            86,
        ),
    };
    println!("{header}");
    println!("{}", "-".repeat(width));
}

fn print_row(record: &EntityRecord, members: &[Member]) {
    match record {
        EntityRecord::Member(m) => println!(
            "{:<26} {:<24} {:<30} {:<8} {:<10} {:<12}",
            m.id,
            m.full_name(),
            m.email,
            m.membership_type.as_str(),
            m.status.as_str(),
            m.join_date.to_string()
        ),
        EntityRecord::Equipment(e) => println!(
            "{:<26} {:<26} {:<13} {:<12} {:<18} {:<12} {:<4}",
            e.id,
            e.name,
            e.category.as_str(),
            e.status.as_str(),
            e.location,
            e.next_maintenance.to_string(),
            if e.is_maintenance_due(Local::now().date_naive()) {
                "yes"
            } else {
                ""
            }
        ),
        EntityRecord::Class(c) => println!(
            "{:<26} {:<22} {:<16} {:<10} {:<6} {:<6} {:<8}",
            c.id,
            c.name,
            c.instructor,
            c.day_of_week.as_str(),
            c.start_time,
            c.duration,
            format!("{}/{}", c.enrolled, c.capacity)
        ),
        EntityRecord::CheckIn(c) => {
            let member = members
                .iter()
                .find(|m| m.id == c.member_id)
                .map(Member::full_name)
                .unwrap_or_else(|| "Unknown Member".to_string());
            println!(
                "{:<26} {:<24} {:<8} {:<25}",
                c.id,
                member,
                c.method.as_str(),
                c.timestamp.to_rfc3339()
            );
        }
    }
}

async fn show_schedule(services: &GymServices) -> anyhow::Result<()> {
    let classes = services
        .stores
        .classes
        .get_all()
        .await
        .context("failed to load classes")?;

    println!("=== WEEKLY SCHEDULE ===");
    for (day, sessions) in weekly_schedule(&classes) {
        println!("\n{day}");
        if sessions.is_empty() {
            println!("  No classes");
            continue;
        }
        for class in sessions {
            println!(
                "  {:<6} {:<24} {:<16} {:<14} {} spots left",
                class.start_time,
                class.name,
                class.instructor,
                class.room,
                class.spots_left()
            );
        }
    }
    Ok(())
}

async fn show_recent(services: &GymServices, limit: usize) -> anyhow::Result<()> {
    let check_ins = services
        .stores
        .check_ins
        .get_all()
        .await
        .context("failed to load check-ins")?;
    let members = services
        .stores
        .members
        .get_all()
        .await
        .context("failed to load members")?;

    println!("=== RECENT CHECK-INS ===");
    let feed = recent_check_ins(&check_ins, &members, limit);
    if feed.is_empty() {
        println!("No check-ins yet");
    }
    for entry in feed {
        println!(
            "{:<24} {:<8} {}",
            entry.member_name.as_deref().unwrap_or("Unknown Member"),
            entry.check_in.method.as_str(),
            entry
                .check_in
                .timestamp
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

async fn check_in(services: &GymServices, member_id: &str) -> anyhow::Result<()> {
    let members = services.stores.members.get_all().await?;
    let check_in = services
        .recorder
        .check_in_member(member_id, &members)
        .await
        .context("check-in failed")?;

    println!("Checked in member {} ({})", check_in.member_id, check_in.id);
    Ok(())
}

async fn scan(services: &GymServices) -> anyhow::Result<()> {
    let members = services.stores.members.get_all().await?;

    println!("Scanning QR code...");
    tokio::select! {
        result = services.recorder.check_in_random(&members) => {
            let check_in = result.context("QR check-in failed")?;
            let name = members
                .iter()
                .find(|m| m.id == check_in.member_id)
                .map(Member::full_name)
                .unwrap_or_default();
            println!("Checked in {name} via QR ({})", check_in.id);
        }
        _ = gymdesk_runtime::shutdown_signal() => {
            info!("scan cancelled");
            println!("Scan cancelled");
        }
    }
    Ok(())
}

fn parse_payload(json: &str) -> anyhow::Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(json).context("payload is not valid JSON")?;
    match value {
        Value::Object(map) => Ok(map),
        other => bail!("payload must be a JSON object, got {other}"),
    }
}

async fn add_record(services: &GymServices, kind: EntityKind, json: &str) -> anyhow::Result<()> {
    let payload = parse_payload(json)?;
    let record = services
        .stores
        .create_from_payload(kind, &payload)
        .await
        .with_context(|| format!("failed to create {kind}"))?;

    println!("Created {kind} {}", record.id());
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn update_record(
    services: &GymServices,
    kind: EntityKind,
    id: &str,
    json: &str,
) -> anyhow::Result<()> {
    let payload = parse_payload(json)?;
    let record = services
        .stores
        .update_from_payload(kind, id, &payload)
        .await
        .with_context(|| format!("failed to update {kind} {id}"))?;

    println!("Updated {kind} {id}");
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn delete_record(services: &GymServices, kind: EntityKind, id: &str) -> anyhow::Result<()> {
    let record = services
        .stores
        .delete(kind, id)
        .await
        .with_context(|| format!("failed to delete {kind} {id}"))?;

    println!("Deleted {kind} {}", record.id());
    Ok(())
}

async fn seed(services: &GymServices) -> anyhow::Result<()> {
    info!("seeding record store with fixture data");

    let report = services.seed_fixtures().await?;

    println!("Record store seeded:");
    println!("- {} members created", report.members);
    println!("- {} equipment items created", report.equipment);
    println!("- {} classes created", report.classes);
    println!("- {} check-ins created", report.check_ins);
    Ok(())
}
