use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::{
    config::Config,
    consumer::{version_check::CheckVersionResult, viewer::Viewer},
    models::{
        filters::{FilterSet, SortOrder},
        property::{MapPoint, Property},
    },
    producer::admin::{AdminService, MutationReport},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub admin: Arc<AdminService>,
    pub viewer: Arc<Viewer>,
}

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

#[derive(Deserialize)]
pub struct ViewQuery {
    pub search: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePropertyRequest {
    pub property: Property,
    #[serde(default)]
    pub image_paths: Vec<String>,
}

#[derive(Serialize)]
pub struct PropertiesResponse {
    pub properties: Vec<Property>,
}

#[derive(Serialize)]
pub struct MapResponse {
    pub points: Vec<MapPoint>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FiltersResponse {
    pub filters: FilterSet,
    pub active_count: usize,
}

/// Mutation outcome as data. A failed git sync or a rejected record shows
/// up here, never as a bare 500 with no body.
#[derive(Serialize)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<MutationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MutationResponse {
    fn from_result(result: anyhow::Result<MutationReport>) -> MutationResponse {
        match result {
            Ok(report) => MutationResponse {
                success: report.succeeded(),
                report: Some(report),
                error: None,
            },
            Err(e) => MutationResponse {
                success: false,
                report: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[derive(Serialize)]
pub struct SyncResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/properties",
            get(list_properties).post(create_property),
        )
        .route(
            "/api/properties/:id",
            put(update_property).delete(delete_property),
        )
        .route("/api/git/pull", post(git_pull))
        .route("/api/view", get(get_view))
        .route("/api/map", get(get_map))
        .route("/api/version", get(get_version))
        .route("/api/filters", get(get_filters).put(put_filters))
        .route("/api/sort", put(put_sort))
        .layer(middleware::from_fn(cors_layer))
        .with_state(state)
}

pub async fn start_http_server(
    state: AppState,
    mut shutdown_rx: tokio::sync::broadcast::Receiver<()>,
) {
    let bind_addr = state
        .config
        .http_bind_address
        .clone()
        .unwrap_or_else(|| "0.0.0.0:8080".to_string());

    let listener = TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|err| panic!("failed to bind http listener on {}: {}", bind_addr, err));
    let app = router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await
        .expect("HTTP server crashed");
}

async fn cors_layer(req: axum::http::Request<axum::body::Body>, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        let mut response = Response::new(axum::body::Body::empty());
        apply_cors_headers(response.headers_mut());
        *response.status_mut() = StatusCode::NO_CONTENT;
        response
    } else {
        let mut response = next.run(req).await;
        apply_cors_headers(response.headers_mut());
        response
    }
}

fn apply_cors_headers(headers: &mut axum::http::HeaderMap) {
    headers.insert(
        axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        axum::http::header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("content-type"),
    );
    headers.insert(
        axum::http::header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
}

async fn list_properties(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PropertiesResponse>>, StatusCode> {
    state
        .admin
        .properties()
        .map(|properties| {
            Json(ApiResponse {
                data: PropertiesResponse { properties },
            })
        })
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn create_property(
    State(state): State<AppState>,
    Json(body): Json<SavePropertyRequest>,
) -> Json<MutationResponse> {
    let image_paths: Vec<PathBuf> = body.image_paths.iter().map(PathBuf::from).collect();
    let result = state
        .admin
        .create_property(body.property, image_paths)
        .await;
    Json(MutationResponse::from_result(result))
}

async fn update_property(
    State(state): State<AppState>,
    axum::extract::Path(id): axum::extract::Path<String>,
    Json(body): Json<SavePropertyRequest>,
) -> Json<MutationResponse> {
    let image_paths: Vec<PathBuf> = body.image_paths.iter().map(PathBuf::from).collect();
    let result = state
        .admin
        .update_property(&id, body.property, image_paths)
        .await;
    Json(MutationResponse::from_result(result))
}

async fn delete_property(
    State(state): State<AppState>,
    axum::extract::Path(id): axum::extract::Path<String>,
) -> Json<MutationResponse> {
    let result = state.admin.delete_property(&id).await;
    Json(MutationResponse::from_result(result))
}

async fn git_pull(State(state): State<AppState>) -> Json<SyncResponse> {
    match state.admin.pull_latest().await {
        Ok(()) => Json(SyncResponse {
            success: true,
            error: None,
        }),
        Err(e) => Json(SyncResponse {
            success: false,
            error: Some(e.to_string()),
        }),
    }
}

async fn get_view(
    State(state): State<AppState>,
    axum::extract::Query(ViewQuery { search }): axum::extract::Query<ViewQuery>,
) -> Json<ApiResponse<PropertiesResponse>> {
    let properties = state.viewer.view(search.as_deref().unwrap_or(""));
    Json(ApiResponse {
        data: PropertiesResponse { properties },
    })
}

async fn get_map(
    State(state): State<AppState>,
    axum::extract::Query(ViewQuery { search }): axum::extract::Query<ViewQuery>,
) -> Json<ApiResponse<MapResponse>> {
    let points = state.viewer.points(search.as_deref().unwrap_or(""));
    Json(ApiResponse {
        data: MapResponse { points },
    })
}

async fn get_version(State(state): State<AppState>) -> Json<ApiResponse<CheckVersionResult>> {
    let check = state.viewer.check().await;
    Json(ApiResponse { data: check })
}

async fn get_filters(State(state): State<AppState>) -> Json<ApiResponse<FiltersResponse>> {
    let filters = state.viewer.filters();
    let active_count = filters.active_count();
    Json(ApiResponse {
        data: FiltersResponse {
            filters,
            active_count,
        },
    })
}

async fn put_filters(
    State(state): State<AppState>,
    Json(filters): Json<FilterSet>,
) -> Result<Json<ApiResponse<FiltersResponse>>, StatusCode> {
    state
        .viewer
        .set_filters(&filters)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let active_count = filters.active_count();
    Ok(Json(ApiResponse {
        data: FiltersResponse {
            filters,
            active_count,
        },
    }))
}

async fn put_sort(
    State(state): State<AppState>,
    Json(order): Json<SortOrder>,
) -> Result<StatusCode, StatusCode> {
    state
        .viewer
        .set_sort_order(order)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(StatusCode::NO_CONTENT)
}
