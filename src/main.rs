use anyhow::Context;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;

mod db;
mod models;
mod schedule;
mod subject;

use db::Warehouse;
use subject::TermInstructors;

#[derive(Parser)]
#[command(name = "fireroad-warehouse-export")]
#[command(about = "Export a subject from the course warehouse as a FireRoad record", long_about = None)]
struct Cli {
    /// Subject ID to export, e.g. "18.02"
    subject_id: String,
    /// Academic year to fetch schedules for; defaults to the year of the
    /// subject's most recent catalog row
    #[arg(long)]
    year: Option<i32>,
    /// Print compact JSON on a single line
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to the warehouse mirror")?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to the warehouse")?;
    let warehouse = Warehouse::new(pool);

    let row = warehouse
        .catalog_row(&cli.subject_id)
        .await?
        .with_context(|| format!("subject {} not found in the catalog", cli.subject_id))?;
    let year = cli.year.unwrap_or(row.academic_year);

    let year_schedule = schedule::compute_year_schedule(&warehouse, &row.subject_id, year).await?;
    let instructors = TermInstructors {
        fall: warehouse
            .master_instructor(&row.subject_id, &format!("{year}FA"))
            .await?,
        iap: warehouse
            .master_instructor(&row.subject_id, &format!("{year}JA"))
            .await?,
        spring: warehouse
            .master_instructor(&row.subject_id, &format!("{year}SP"))
            .await?,
    };
    let hass_attribute = match row.hass_attribute.as_deref() {
        Some(raw) => warehouse.hass_attribute(raw).await?,
        None => None,
    };

    let subject = subject::assemble_subject(&row, &year_schedule, instructors, hass_attribute)
        .with_context(|| format!("subject {} has been renumbered", cli.subject_id))?;

    if cli.compact {
        println!("{}", serde_json::to_string(&subject)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&subject)?);
    }

    Ok(())
}
