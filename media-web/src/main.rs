//! Servidor web Axum expondo o motor de análise de mídia como API JSON.
//!
//! Variáveis de ambiente:
//! - `MEDIA_CONFIG`: caminho de um `EngineConfig` em JSON (opcional);
//! - `MEDIA_ADDR`: endereço de escuta (padrão `0.0.0.0:3000`);
//! - `RUST_LOG`: filtro de logs (padrão `info`).

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use media_core::{
    corpus::demo_texts,
    engine::TestPrediction,
    perceptron::AveragedPerceptronRecognizer,
    report::EntityReport,
    AnalysisError, DetectorMode, EngineConfig, ErrorKind, Language, MediaEngine, SpotterInfo,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Estado compartilhado da aplicação
struct AppState {
    engine: MediaEngine,
}

/// Erro da API: status HTTP + corpo `{"error", "kind"}`.
struct ApiError {
    status: StatusCode,
    message: String,
    kind: Option<ErrorKind>,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into(), kind: None }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(error: AnalysisError) -> Self {
        let kind = error.kind();
        let status = match kind {
            ErrorKind::ModelNotFound => StatusCode::NOT_FOUND,
            ErrorKind::EmptyDocument
            | ErrorKind::UnknownTopicId
            | ErrorKind::InvalidArgument
            | ErrorKind::InvalidPipeline
            | ErrorKind::UntokenizedCorpus => StatusCode::BAD_REQUEST,
            ErrorKind::NoContent => StatusCode::BAD_GATEWAY,
            ErrorKind::PipelineStageFailure => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::ModelKindMismatch | ErrorKind::Io | ErrorKind::Serialization => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self { status, message: error.to_string(), kind: Some(kind) }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(status = %self.status, error = %self.message, "request failed");
        }
        let body = serde_json::json!({ "error": self.message, "kind": self.kind });
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn parse_language(language: Option<&str>) -> Result<Language, ApiError> {
    match language {
        None => Ok(Language::English),
        Some(code) => Language::parse(code).ok_or_else(|| ApiError::bad_request(format!("unknown language '{code}'"))),
    }
}

fn require_text(text: &str) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::bad_request("Texto vazio"));
    }
    Ok(())
}

/// Executa trabalho síncrono do motor fora do runtime assíncrono.
async fn blocking<T, F>(state: &Arc<AppState>, job: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&MediaEngine) -> Result<T, AnalysisError> + Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || job(&state.engine))
        .await
        .map_err(|e| ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("worker panicked: {e}"),
            kind: None,
        })?
        .map_err(ApiError::from)
}

#[derive(Deserialize)]
struct EntitiesRequest {
    text: String,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Deserialize)]
struct SpotterRequest {
    text: String,
    #[serde(default)]
    language: Option<String>,
    spotter: SpotterInfo,
}

#[derive(Deserialize)]
struct UrlRequest {
    url: String,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Deserialize)]
struct LanguageRequest {
    text: String,
    #[serde(default)]
    mode: DetectorMode,
}

#[derive(Serialize)]
struct LanguageResponse {
    language: Language,
    code: &'static str,
    candidates: Vec<(Language, f64)>,
}

#[derive(Deserialize)]
struct TrainRequest {
    training: Vec<String>,
    #[serde(default)]
    test: Vec<String>,
    #[serde(default = "default_topic_tag")]
    tag: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default = "default_topic_count")]
    topic_count: usize,
}

fn default_topic_tag() -> String {
    "my-lda".to_string()
}

fn default_topic_count() -> usize {
    20
}

#[derive(Serialize)]
struct TrainResponse {
    success: bool,
    cause: Option<String>,
    cause_kind: Option<ErrorKind>,
    predictions: Vec<TestPrediction>,
}

#[derive(Deserialize)]
struct PredictRequest {
    text: String,
    #[serde(default = "default_topic_tag")]
    tag: String,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Serialize)]
struct TopicScoreResponse {
    topic: String,
    score: f64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::var("MEDIA_CONFIG") {
        Ok(path) => EngineConfig::from_json_file(path)?,
        Err(_) => EngineConfig::default(),
    };
    let addr = std::env::var("MEDIA_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    let engine = MediaEngine::new(config)?;
    ensure_recognizer(&engine)?;
    let state = Arc::new(AppState { engine });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/entities", post(entities_handler))
        .route("/entities/spotter", post(spotter_handler))
        .route("/entities/url", post(url_handler))
        .route("/language", post(language_handler))
        .route("/topics/train", post(train_handler))
        .route("/topics/predict", post(predict_handler))
        .route("/demo-texts", get(demo_texts_handler))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Servidor de análise iniciado em http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Se um reconhecedor estatístico está configurado mas ainda não existe no
/// armazenamento, treina e grava o modelo de exemplo.
fn ensure_recognizer(engine: &MediaEngine) -> Result<(), AnalysisError> {
    let Some(recognizer) = &engine.config().recognizer else {
        return Ok(());
    };
    match AveragedPerceptronRecognizer::from_store(engine.store(), Language::English, recognizer.version, &recognizer.tag) {
        Ok(_) => Ok(()),
        Err(AnalysisError::ModelNotFound(_)) => {
            let installed = engine.install_sample_recognizer()?;
            info!(tag = %installed.tag, version = installed.version, "sample recognizer installed");
            Ok(())
        }
        Err(error) => Err(error),
    }
}

/// Reconhecimento de entidades (padrão "is-a" + reconhecedor configurado)
async fn entities_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EntitiesRequest>,
) -> ApiResult<EntityReport> {
    require_text(&req.text)?;
    let language = parse_language(req.language.as_deref())?;
    let report = blocking(&state, move |engine| {
        engine.analyze_entities(&req.text, language).map(|d| EntityReport::from_document(&d))
    })
    .await?;
    Ok(Json(report))
}

/// Reconhecimento com gazetteer enviado na requisição
async fn spotter_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SpotterRequest>,
) -> ApiResult<EntityReport> {
    require_text(&req.text)?;
    let language = parse_language(req.language.as_deref())?;
    let report = blocking(&state, move |engine| {
        engine
            .analyze_with_spotter(&req.text, &req.spotter, language)
            .map(|d| EntityReport::from_document(&d))
    })
    .await?;
    Ok(Json(report))
}

/// Reconhecimento sobre o texto de uma página web
async fn url_handler(State(state): State<Arc<AppState>>, Json(req): Json<UrlRequest>) -> ApiResult<EntityReport> {
    let language = parse_language(req.language.as_deref())?;
    let report = blocking(&state, move |engine| {
        engine.analyze_url(&req.url, language).map(|d| EntityReport::from_document(&d))
    })
    .await?;
    Ok(Json(report))
}

async fn language_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LanguageRequest>,
) -> ApiResult<LanguageResponse> {
    require_text(&req.text)?;
    let response = blocking(&state, move |engine| {
        let language = engine.detect_language(&req.text, req.mode);
        let candidates = engine.detect_language_scores(&req.text, req.mode);
        Ok(LanguageResponse { language, code: language.code(), candidates })
    })
    .await?;
    Ok(Json(response))
}

/// Treino de modelo de tópicos. Falhas de treino vêm no corpo (`success: false`).
async fn train_handler(State(state): State<Arc<AppState>>, Json(req): Json<TrainRequest>) -> ApiResult<TrainResponse> {
    let language = parse_language(req.language.as_deref())?;
    let outcome = blocking(&state, move |engine| {
        Ok(engine.train_topic_model(&req.training, &req.test, &req.tag, language, req.topic_count))
    })
    .await?;
    Ok(Json(TrainResponse {
        success: outcome.success,
        cause: outcome.cause,
        cause_kind: outcome.cause_kind,
        predictions: outcome.predictions,
    }))
}

async fn predict_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PredictRequest>,
) -> ApiResult<Vec<TopicScoreResponse>> {
    require_text(&req.text)?;
    let language = parse_language(req.language.as_deref())?;
    let scores = blocking(&state, move |engine| engine.predict_topics(&req.text, &req.tag, language)).await?;
    Ok(Json(
        scores
            .into_iter()
            .map(|(topic, score)| TopicScoreResponse { topic, score })
            .collect(),
    ))
}

/// Retorna textos de demonstração
async fn demo_texts_handler() -> impl IntoResponse {
    let texts: Vec<serde_json::Value> = demo_texts()
        .iter()
        .map(|(domain, text)| {
            serde_json::json!({
                "domain": domain,
                "text": text
            })
        })
        .collect();
    Json(texts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(ApiError::from(AnalysisError::ModelNotFound("x".into())).status, StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(AnalysisError::EmptyDocument).status, StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(AnalysisError::NoContent("u".into())).status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_parse_language() {
        assert_eq!(parse_language(None).ok(), Some(Language::English));
        assert_eq!(parse_language(Some("pt")).ok(), Some(Language::Portuguese));
        assert!(parse_language(Some("klingon")).is_err());
    }
}
