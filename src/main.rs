pub mod types;
pub mod config;
pub mod data;
pub mod processing;
pub mod render;
pub mod server;

use clap::Parser;
use server::DashboardContext;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let app_config = config::AppConfig::load_or_default(&cli.config)?;

    let records = data::load_or_fallback(&app_config)?;
    let ctx = DashboardContext::new(records, app_config.render.table_row_cap);
    tracing::info!(
        "Dashboard ready: {} municipalities, {} ha, {} categories",
        ctx.metrics.municipality_count,
        processing::format_grouped(ctx.metrics.total_area_ha),
        ctx.metrics.category_count
    );

    server::start_server(app_config, ctx).await?;

    Ok(())
}
