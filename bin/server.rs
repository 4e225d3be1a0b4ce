// Essay Ranking - Web Server
// JSON API over the in-memory dataset with Axum

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use clap::Parser;
use essay_ranking::config::{DataArgs, DEFAULT_ADDR};
use essay_ranking::logging::init_logging;
use essay_ranking::{
    city_options, find_school, load_or_empty, paginate, parse_min_sample_size, query,
    state_options, CategoryAnalysis, Comparison, Filters, OverviewStats, School, SchoolProfile,
    Segment, SortConfig, SortDirection, SortKey, DATASET_PATH, DEFAULT_MIN_SAMPLE_SIZE,
    DEFAULT_PAGE_SIZE, MAX_COMPARED,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeFile;

#[derive(Debug, Parser)]
#[command(name = "ranking-server", version, about = "API do ranking de redação")]
struct Args {
    #[command(flatten)]
    data: DataArgs,

    /// Address to listen on
    #[arg(long, env = "ESSAY_RANKING_ADDR", default_value = DEFAULT_ADDR)]
    addr: String,
}

/// Shared application state, read-only after startup
#[derive(Clone)]
struct AppState {
    schools: Arc<[School]>,
    digest: Arc<str>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn not_found(message: String) -> Response {
        (
            StatusCode::NOT_FOUND,
            Json(Self {
                success: false,
                data: (),
                error: Some(message),
            }),
        )
            .into_response()
    }
}

#[derive(Serialize)]
struct HealthResponse<'a> {
    status: &'static str,
    schools: usize,
    digest: &'a str,
}

/// Query string of /api/schools, names as in the dataset
#[derive(Debug, Default, Deserialize)]
struct SchoolsQuery {
    search: Option<String>,
    uf: Option<String>,
    cidade: Option<String>,
    min: Option<String>,
    segment: Option<Segment>,
    sort: Option<SortKey>,
    dir: Option<SortDirection>,
    page: Option<usize>,
    per_page: Option<usize>,
}

impl SchoolsQuery {
    fn filters(&self) -> Filters {
        // "todos" and empty selects mean no filter
        let select = |v: &Option<String>| {
            v.as_ref()
                .filter(|s| !s.is_empty() && s.as_str() != "todos")
                .cloned()
        };
        let state = select(&self.uf);
        let city = state.as_ref().and(select(&self.cidade));

        Filters {
            search: self.search.clone().unwrap_or_default(),
            state,
            city,
            min_sample_size: self
                .min
                .as_deref()
                .map(parse_min_sample_size)
                .unwrap_or(DEFAULT_MIN_SAMPLE_SIZE),
            segment: self.segment.unwrap_or_default(),
        }
    }

    fn sort(&self) -> SortConfig {
        SortConfig::new(self.sort.unwrap_or_default(), self.dir.unwrap_or_default())
    }
}

#[derive(Serialize)]
struct SchoolsResponse<'a> {
    schools: Vec<&'a School>,
    page: usize,
    per_page: usize,
    total_pages: usize,
    total: usize,
    stats: OverviewStats,
}

#[derive(Debug, Deserialize)]
struct CitiesQuery {
    uf: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompareQuery {
    #[serde(default)]
    ids: String,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "OK",
        schools: state.schools.len(),
        digest: &state.digest,
    }))
    .into_response()
}

/// GET /api/schools - Filtered, sorted, paginated ranking
async fn get_schools(
    State(state): State<AppState>,
    Query(params): Query<SchoolsQuery>,
) -> impl IntoResponse {
    let filters = params.filters();
    let view = query(&state.schools, &filters, params.sort());
    let per_page = params.per_page.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
    let page = paginate(&view, params.page.unwrap_or(1), per_page);

    let response = SchoolsResponse {
        stats: OverviewStats::from_view(&view),
        total: view.len(),
        page: page.page,
        per_page,
        total_pages: page.total_pages,
        schools: page.rows,
    };

    (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
}

/// GET /api/schools/:id - School profile
async fn get_school(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match find_school(&state.schools, &id) {
        Some(school) => Json(ApiResponse::ok(SchoolProfile::build(school))).into_response(),
        None => {
            tracing::debug!(%id, "school not found");
            ApiResponse::<()>::not_found(format!("Escola não encontrada: {}", id))
        }
    }
}

/// GET /api/states - State codes for the filter select
async fn get_states(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state_options(&state.schools)))
}

/// GET /api/cities?uf= - Cities of one state
async fn get_cities(
    State(state): State<AppState>,
    Query(params): Query<CitiesQuery>,
) -> impl IntoResponse {
    Json(ApiResponse::ok(city_options(&state.schools, params.uf.as_deref())))
}

/// GET /api/analysis - Public vs private breakdown
async fn get_analysis(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(CategoryAnalysis::build(&state.schools)))
}

/// GET /api/compare?ids=a,b,c - Comparison of up to five schools
async fn get_comparison(
    State(state): State<AppState>,
    Query(params): Query<CompareQuery>,
) -> impl IntoResponse {
    let mut comparison = Comparison::new();
    for id in params.ids.split(',').map(str::trim).filter(|id| !id.is_empty()) {
        if comparison.len() == MAX_COMPARED {
            break;
        }
        let Some(school) = find_school(&state.schools, id) else {
            tracing::debug!(%id, "skipping unknown school in comparison");
            continue;
        };
        // Duplicates are ignored
        let _ = comparison.add(school);
    }

    Json(ApiResponse::ok(serde_json::json!({
        "schools": comparison.selected(),
        "competencies": comparison.competency_rows(),
        "metrics": comparison.metric_table(),
    })))
}

// ============================================================================
// Main Server
// ============================================================================

/// `dataset_file` is published at `DATASET_PATH` and nothing else on disk is
fn app(state: AppState, dataset_file: PathBuf) -> Router {
    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/schools", get(get_schools))
        .route("/schools/:id", get(get_school))
        .route("/states", get(get_states))
        .route("/cities", get(get_cities))
        .route("/analysis", get(get_analysis))
        .route("/compare", get(get_comparison))
        .with_state(state);

    // Build main router
    Router::new()
        .nest("/api", api_routes)
        .route_service(DATASET_PATH, ServeFile::new(dataset_file))
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging("info");
    let args = Args::parse();

    println!("🌐 Essay Ranking - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Remote loading uses a blocking client
    let source = args.data.source();
    let dataset = tokio::task::spawn_blocking(move || load_or_empty(&source))
        .await
        .context("Dataset loader task failed")?;
    println!("✓ Dataset loaded: {} schools", dataset.len());

    let state = AppState {
        schools: dataset.schools.into(),
        digest: dataset.digest.into(),
    };

    let listener = tokio::net::TcpListener::bind(&args.addr)
        .await
        .with_context(|| format!("Failed to bind to {}", args.addr))?;

    println!("\n🚀 Server running on http://{}", args.addr);
    println!("   API:  http://{}/api/schools", args.addr);
    println!("   Data: http://{}{}", args.addr, DATASET_PATH);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app(state, args.data.data.clone()))
        .await
        .context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use essay_ranking::Category;
    use tower::ServiceExt;

    fn school(
        id: &str,
        name: &str,
        uf: &str,
        category: Category,
        sample_size: u32,
        overall: f64,
        rank: u32,
    ) -> School {
        School {
            id: id.to_string(),
            name: name.to_string(),
            state: uf.to_string(),
            city: "Cidade".to_string(),
            category,
            sample_size,
            overall,
            comp1: overall / 5.0,
            comp2: overall / 5.0,
            comp3: overall / 5.0,
            comp4: overall / 5.0,
            comp5: overall / 5.0,
            rank,
            socioeconomic: None,
            history: None,
        }
    }

    fn create_test_state() -> AppState {
        let schools = vec![
            school("a", "Colégio Alfa", "SP", Category::Private, 80, 900.0, 1),
            school("b", "Escola Beta", "RJ", Category::Public, 40, 800.0, 2),
            school("c", "Escola Gama", "SP", Category::Public, 10, 700.0, 3),
        ];
        AppState {
            schools: schools.into(),
            digest: "abc".into(),
        }
    }

    fn create_test_app() -> Router {
        app(create_test_state(), PathBuf::from("missing/escolas.json"))
    }

    async fn send_get(router: Router, uri: &str) -> axum::response::Response {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = send_get(create_test_app(), uri).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["schools"], 3);
        assert_eq!(body["data"]["digest"], "abc");
    }

    #[tokio::test]
    async fn test_schools_default_threshold() {
        let (status, body) = get_json("/api/schools").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 2);
        assert_eq!(body["data"]["schools"][0]["id"], "a");
        assert_eq!(body["data"]["stats"]["total_students"], 120);
    }

    #[tokio::test]
    async fn test_schools_filters_and_sort() {
        let (_, body) =
            get_json("/api/schools?min=abc&segment=publica&sort=media_geral&dir=asc").await;
        assert_eq!(body["data"]["total"], 2);
        assert_eq!(body["data"]["schools"][0]["id"], "c");
        assert_eq!(body["data"]["schools"][1]["id"], "b");

        let (_, body) = get_json("/api/schools?uf=SP&min=0&per_page=1&page=9").await;
        assert_eq!(body["data"]["total"], 2);
        assert_eq!(body["data"]["page"], 2);
        assert_eq!(body["data"]["schools"][0]["id"], "c");
    }

    #[tokio::test]
    async fn test_school_profile_and_not_found() {
        let (status, body) = get_json("/api/schools/b").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["school"]["nome"], "Escola Beta");
        assert_eq!(body["data"]["efficiency"], 200.0);

        let (status, body) = get_json("/api/schools/zzz").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("zzz"));
    }

    #[tokio::test]
    async fn test_states_and_cities() {
        let (_, body) = get_json("/api/states").await;
        assert_eq!(body["data"], serde_json::json!(["RJ", "SP"]));

        let (_, body) = get_json("/api/cities?uf=SP").await;
        assert_eq!(body["data"], serde_json::json!(["Cidade"]));

        let (_, body) = get_json("/api/cities").await;
        assert_eq!(body["data"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_compare_skips_unknown_and_duplicates() {
        let (_, body) = get_json("/api/compare?ids=a,zzz,a,b").await;
        assert_eq!(body["data"]["schools"].as_array().unwrap().len(), 2);
        assert_eq!(body["data"]["competencies"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_analysis() {
        let (_, body) = get_json("/api/analysis").await;
        assert_eq!(body["data"]["public_count"], 2);
        assert_eq!(body["data"]["private_count"], 1);
    }

    #[tokio::test]
    async fn test_data_path_serves_only_the_dataset_file() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("ranking-2024.json");
        std::fs::write(&dataset, "[]").unwrap();
        std::fs::write(dir.path().join("escolas.json"), "[1]").unwrap();
        std::fs::write(dir.path().join("secrets.env"), "TOKEN=x").unwrap();
        let router = app(create_test_state(), dataset);

        let response = send_get(router.clone(), DATASET_PATH).await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"[]");

        for uri in ["/data/secrets.env", "/data/ranking-2024.json", "/data/"] {
            let status = send_get(router.clone(), uri).await.status();
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        }
    }
}
