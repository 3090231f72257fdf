use crate::config::AppConfig;
use crate::processing::{self, format_grouped};
use crate::render::{self, Artifacts};
use crate::types::{MapRecord, Record, SuitabilityCategory, SummaryMetrics};
use anyhow::Result;
use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

/// Immutable process-wide state: the canonical dataset and everything derived
/// from it once at startup. Handlers only read from it.
pub struct DashboardContext {
    pub records: Vec<Record>,
    pub map_records: Vec<MapRecord>,
    pub metrics: SummaryMetrics,
    pub categories: Vec<SuitabilityCategory>,
    pub table_row_cap: Option<usize>,
}

impl DashboardContext {
    pub fn new(records: Vec<Record>, table_row_cap: Option<usize>) -> Self {
        let map_records = processing::build_map_view(&records);
        let metrics = processing::compute_metrics(&records);
        let categories = processing::categories_present(&records);
        DashboardContext {
            records,
            map_records,
            metrics,
            categories,
            table_row_cap,
        }
    }
}

#[derive(Deserialize)]
pub struct DashboardParams {
    filter: Option<String>,
}

#[derive(Serialize)]
pub struct FilterOption {
    value: String,
    label: String,
}

#[derive(Serialize)]
pub struct MetricsView {
    municipality_count: usize,
    total_area: String,
    category_count: usize,
}

#[derive(Serialize)]
pub struct DashboardResponse {
    metrics: MetricsView,
    options: Vec<FilterOption>,
    #[serde(flatten)]
    artifacts: Artifacts,
}

pub async fn start_server(config: AppConfig, ctx: DashboardContext) -> Result<()> {
    let state = Arc::new(ctx);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));

    tracing::info!("Starting server on http://{}", addr);

    let app = Router::new()
        .route("/api/dashboard", get(dashboard_handler))
        .fallback_service(ServeDir::new(&config.server.static_dir))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// The interaction boundary: one filter value in, four artifacts plus the
/// summary metrics out. Render failures are logged and converted to degraded
/// placeholder artifacts; this handler itself never fails.
async fn dashboard_handler(
    State(ctx): State<Arc<DashboardContext>>,
    Query(params): Query<DashboardParams>,
) -> Json<DashboardResponse> {
    let filter = params.filter.as_deref().unwrap_or("all");

    let artifacts = match render::render_dashboard(
        &ctx.records,
        &ctx.map_records,
        ctx.table_row_cap,
        filter,
    ) {
        Ok(artifacts) => artifacts,
        Err(err) => {
            tracing::error!("Render failed for filter '{}': {}", filter, err);
            render::error_artifacts(&err)
        }
    };

    Json(DashboardResponse {
        metrics: metrics_view(&ctx.metrics),
        options: filter_options(&ctx.categories),
        artifacts,
    })
}

fn metrics_view(metrics: &SummaryMetrics) -> MetricsView {
    MetricsView {
        municipality_count: metrics.municipality_count,
        total_area: format!("{} ha", format_grouped(metrics.total_area_ha)),
        category_count: metrics.category_count,
    }
}

/// "Todas las zonas" plus one option per category present in the data.
fn filter_options(categories: &[SuitabilityCategory]) -> Vec<FilterOption> {
    let mut options = vec![FilterOption {
        value: "all".to_string(),
        label: "Todas las zonas".to_string(),
    }];
    options.extend(categories.iter().map(|category| FilterOption {
        value: category.slug().to_string(),
        label: category.label().to_string(),
    }));
    options
}
