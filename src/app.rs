use axum::{
    Extension, Json, Router,
    extract::{RawQuery, State},
    http::{StatusCode, header},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use handlebars::{Handlebars, RenderError, TemplateError, html_escape};
use log::{error, info};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::dataset::{Dataset, DatasetCache};
use crate::downloader::{self, CSV_FILENAME, XLSX_FILENAME};
use crate::error::{DataError, DownloadError};
use crate::login::{self, CredentialList, SessionStore, SignedIn};
use crate::lookup::{LookupOutcome, lookup};
use crate::record::{Source, normalize_title};
use crate::table::to_display_table;

/// Query parameter carrying one selected journal title.
pub const SELECTION_PARAM: &str = "journal";

/// Application state shared across HTTP handlers
pub struct AppState {
    pub dataset: DatasetCache,
    pub credentials: CredentialList,
    pub sessions: SessionStore,
    pub templates: Handlebars<'static>,
}

impl AppState {
    pub fn new(
        dataset: DatasetCache,
        credentials: CredentialList,
        sessions: SessionStore,
    ) -> Result<Self, TemplateError> {
        Ok(AppState {
            dataset,
            credentials,
            sessions,
            templates: templates()?,
        })
    }
}

fn templates() -> Result<Handlebars<'static>, TemplateError> {
    let mut handlebars = Handlebars::new();
    handlebars.register_template_string("login", include_str!("./static/login.html"))?;
    handlebars.register_template_string("lookup", include_str!("./static/lookup.html"))?;
    Ok(handlebars)
}

/// Failure of a request after the access check
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Journal list unavailable: {0}")]
    DataUnavailable(#[from] DataError),

    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("Template error: {0}")]
    Render(#[from] RenderError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("{}", self);
        let status = match self {
            AppError::DataUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Download(_) | AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = format!(
            "<!DOCTYPE html><html><body><h1>Something went wrong</h1><p>{}</p>\
             <p>Please try again later.</p></body></html>",
            html_escape(&self.to_string())
        );
        (status, Html(body)).into_response()
    }
}

/// Build application router
///
/// `/login`, `/logout`, `/health` and `/static` are public; the lookup page
/// and the downloads sit behind [`login::require_auth`].
pub fn build_router(state: Arc<AppState>, static_dir: impl AsRef<Path>) -> Router {
    let protected = Router::new()
        .route("/", get(serve_lookup))
        .route("/download.csv", get(download_csv))
        .route("/download.xlsx", get(download_xlsx))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            login::require_auth,
        ));

    let public = Router::new()
        .route(
            "/login",
            get(login::serve_login_page).post(login::handle_login),
        )
        .route(
            "/logout",
            get(login::handle_logout).post(login::handle_logout),
        )
        .route("/health", get(health))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()));

    Router::new()
        .merge(protected)
        .merge(public)
        .with_state(state)
}

/// Start the web server and serve until the process stops.
pub async fn run(
    state: Arc<AppState>,
    bind: &str,
    static_dir: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(state, static_dir);

    let listener = TcpListener::bind(bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Selected titles from a raw query string: every `journal=` value, decoded.
pub fn selection_from_query(query: Option<&str>) -> Vec<String> {
    let Some(query) = query else {
        return Vec::new();
    };

    query
        .split('&')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if decode_component(key) != SELECTION_PARAM {
                return None;
            }
            let value = decode_component(value);
            (!value.trim().is_empty()).then_some(value)
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}

/// Query string reproducing `selected`, for the download links.
pub fn selection_query(selected: &[String]) -> String {
    selected
        .iter()
        .map(|title| format!("{}={}", SELECTION_PARAM, urlencoding::encode(title)))
        .collect::<Vec<_>>()
        .join("&")
}

#[derive(Debug, Serialize)]
struct TitleOption<'a> {
    title: &'a str,
    selected: bool,
}

#[derive(Debug, Serialize)]
struct LegendEntry {
    code: &'static str,
    legend: String,
}

/// Everything the lookup page shows for one selection
#[derive(Debug, Serialize)]
pub struct LookupView<'a> {
    email: String,
    legends: Vec<LegendEntry>,
    titles: Vec<TitleOption<'a>>,
    no_matches: bool,
    table: Option<String>,
    download_query: String,
}

/// Build the page model for `selected` over `dataset`.
pub fn lookup_view<'a>(dataset: &'a Dataset, selected: &[String], email: &str) -> LookupView<'a> {
    let chosen: HashSet<String> = selected.iter().map(|title| normalize_title(title)).collect();
    let titles = dataset
        .titles()
        .iter()
        .map(|title| TitleOption {
            title: title.as_str(),
            selected: chosen.contains(&normalize_title(title)),
        })
        .collect();

    let outcome = lookup(dataset, selected);
    let table = match &outcome {
        LookupOutcome::Table(rows) => Some(to_display_table(rows)),
        LookupOutcome::NoSelection | LookupOutcome::NoMatches => None,
    };

    LookupView {
        email: email.to_string(),
        legends: Source::ALL
            .into_iter()
            .map(|source| LegendEntry {
                code: source.code(),
                legend: source.legend(),
            })
            .collect(),
        titles,
        no_matches: outcome == LookupOutcome::NoMatches,
        table,
        download_query: selection_query(selected),
    }
}

async fn serve_lookup(
    State(state): State<Arc<AppState>>,
    Extension(SignedIn(email)): Extension<SignedIn>,
    RawQuery(query): RawQuery,
) -> Result<Html<String>, AppError> {
    let dataset = state.dataset.get_or_load()?;
    let selected = selection_from_query(query.as_deref());

    let view = lookup_view(&dataset, &selected, &email);
    let page = state.templates.render("lookup", &view)?;
    Ok(Html(page))
}

async fn download_csv(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    let dataset = state.dataset.get_or_load()?;
    let selected = selection_from_query(query.as_deref());

    match lookup(&dataset, &selected) {
        LookupOutcome::Table(rows) => Ok(attachment(
            "text/csv; charset=utf-8",
            CSV_FILENAME,
            downloader::to_csv(&rows),
        )),
        outcome => Ok(nothing_to_download(&outcome)),
    }
}

async fn download_xlsx(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    let dataset = state.dataset.get_or_load()?;
    let selected = selection_from_query(query.as_deref());

    match lookup(&dataset, &selected) {
        LookupOutcome::Table(rows) => Ok(attachment(
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            XLSX_FILENAME,
            downloader::to_xlsx(&rows)?,
        )),
        outcome => Ok(nothing_to_download(&outcome)),
    }
}

fn attachment(content_type: &str, filename: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

fn nothing_to_download(outcome: &LookupOutcome) -> Response {
    match outcome {
        LookupOutcome::NoMatches => (StatusCode::NOT_FOUND, "No matches found.").into_response(),
        _ => (StatusCode::BAD_REQUEST, "No journals selected.").into_response(),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
