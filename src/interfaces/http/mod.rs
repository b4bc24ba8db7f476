use crate::application::use_cases::summary;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::interfaces::state::AppState;
use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::{
    delete, dev::Server, get, post, web, App, HttpResponse, HttpServer, Responder,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use validator::Validate;

const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    pub app: Arc<AppState>,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

#[derive(Deserialize)]
pub struct UploadQuery {
    pub file_name: String,
}

#[derive(Deserialize, Validate)]
pub struct QueryRequest {
    #[validate(length(min = 1))]
    pub query: String,
    /// Overrides the configured model settings for this request.
    #[serde(default)]
    pub config: Option<LLMConfig>,
}

#[derive(Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
}

#[derive(Serialize)]
pub struct ReportResponse {
    pub report: String,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::LoadError(_) | AppError::UnsupportedVisualization { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AppError::LLMError(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(data: &HttpState, action: &str, err: &AppError) -> HttpResponse {
    add_log(
        &data.logs,
        "ERROR",
        "HttpApi",
        &format!("{} failed: {}", action, err),
    );
    HttpResponse::build(status_for(err)).json(ErrorBody {
        error: err.code().to_string(),
        message: err.localized(data.app.language()),
    })
}

fn respond<T: Serialize>(data: &HttpState, action: &str, result: Result<T>) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => error_response(data, action, &e),
    }
}

#[post("/sessions")]
async fn create_session(data: web::Data<HttpState>) -> impl Responder {
    let result = data.app.sessions.create_session().map(|session_id| {
        add_log(
            &data.logs,
            "INFO",
            "Sessions",
            &format!("Session created: {}", session_id),
        );
        SessionCreated { session_id }
    });
    respond(&data, "Create session", result)
}

#[delete("/sessions/{id}")]
async fn delete_session(data: web::Data<HttpState>, path: web::Path<Uuid>) -> impl Responder {
    match data.app.sessions.delete_session(*path) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&data, "Delete session", &e),
    }
}

#[post("/sessions/{id}/upload")]
async fn upload(
    data: web::Data<HttpState>,
    path: web::Path<Uuid>,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> impl Responder {
    add_log(
        &data.logs,
        "INFO",
        "Upload",
        &format!("Uploading {} ({} bytes)", query.file_name, body.len()),
    );

    let result = data
        .app
        .upload_use_case
        .execute(*path, &query.file_name, &body);
    respond(&data, "Upload", result)
}

#[get("/sessions/{id}/profile")]
async fn profile(data: web::Data<HttpState>, path: web::Path<Uuid>) -> impl Responder {
    let result = data
        .app
        .current_table(*path)
        .map(|table| data.app.profiler.profile(&table));
    respond(&data, "Profile", result)
}

#[get("/sessions/{id}/classify")]
async fn classify(data: web::Data<HttpState>, path: web::Path<Uuid>) -> impl Responder {
    let result = data
        .app
        .current_table(*path)
        .map(|table| data.app.profiler.classify(&table));
    respond(&data, "Classify", result)
}

#[get("/sessions/{id}/summary")]
async fn table_summary(data: web::Data<HttpState>, path: web::Path<Uuid>) -> impl Responder {
    let result = data.app.current_table(*path).map(|table| ReportResponse {
        report: summary::summary(&table, data.app.language()),
    });
    respond(&data, "Summary", result)
}

#[get("/sessions/{id}/statistics")]
async fn table_statistics(data: web::Data<HttpState>, path: web::Path<Uuid>) -> impl Responder {
    let result = data.app.current_table(*path).map(|table| ReportResponse {
        report: summary::statistics(&table, data.app.language()),
    });
    respond(&data, "Statistics", result)
}

fn validated_query<'r>(data: &HttpState, req: &'r QueryRequest) -> Result<&'r str> {
    req.validate().map_err(|_| {
        AppError::ValidationError(data.app.language().messages().empty_query.to_string())
    })?;
    Ok(&req.query)
}

#[post("/sessions/{id}/query")]
async fn ask(
    data: web::Data<HttpState>,
    path: web::Path<Uuid>,
    req: web::Json<QueryRequest>,
) -> impl Responder {
    let query = match validated_query(&data, req.req_data()) {
        Ok(query) => query,
        Err(e) => return error_response(&data, "Query", &e),
    };
    let config = req.config.as_ref().unwrap_or(&data.app.config.llm);

    add_log(
        &data.logs,
        "INFO",
        "DataChat",
        &format!(
            "Answering question (provider={:?} model={})",
            config.provider, config.model
        ),
    );

    let result = data.app.data_chat_use_case.ask(config, *path, query).await;
    respond(&data, "Query", result)
}

#[post("/sessions/{id}/chart")]
async fn chart(
    data: web::Data<HttpState>,
    path: web::Path<Uuid>,
    req: web::Json<QueryRequest>,
) -> impl Responder {
    let result = validated_query(&data, req.req_data())
        .and_then(|query| data.app.data_chat_use_case.chart(*path, query));
    respond(&data, "Chart", result)
}

#[get("/sessions/{id}/history")]
async fn history(data: web::Data<HttpState>, path: web::Path<Uuid>) -> impl Responder {
    let result = data.app.sessions.history(*path);
    respond(&data, "History", result)
}

#[post("/sessions/{id}/history/{entry}/restore")]
async fn restore(data: web::Data<HttpState>, path: web::Path<(Uuid, Uuid)>) -> impl Responder {
    let (session_id, entry_id) = path.into_inner();
    let result = data.app.sessions.restore(session_id, entry_id);
    respond(&data, "Restore", result)
}

#[delete("/sessions/{id}/history")]
async fn clear_history(data: web::Data<HttpState>, path: web::Path<Uuid>) -> impl Responder {
    match data.app.sessions.clear(*path) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&data, "Clear history", &e),
    }
}

#[post("/sessions/{id}/new-file")]
async fn new_file(data: web::Data<HttpState>, path: web::Path<Uuid>) -> impl Responder {
    match data.app.sessions.new_file(*path) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&data, "New file", &e),
    }
}

#[get("/sessions/{id}/chat")]
async fn chat_history(data: web::Data<HttpState>, path: web::Path<Uuid>) -> impl Responder {
    let result = data.app.sessions.chat_history(*path);
    respond(&data, "Chat history", result)
}

#[post("/models")]
async fn list_models(data: web::Data<HttpState>, config: web::Json<LLMConfig>) -> impl Responder {
    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!(
            "Fetching models (provider={:?} base_url={})",
            config.provider, config.base_url
        ),
    );

    let result = data.app.llm_client.list_models(&config).await;
    respond(&data, "List models", result)
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    match data.logs.lock() {
        Ok(logs) => HttpResponse::Ok().json(&*logs),
        Err(_) => HttpResponse::InternalServerError().finish(),
    }
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    if let Ok(mut logs) = logs.lock() {
        logs.push(entry);
        if logs.len() > MAX_LOG_ENTRIES {
            logs.remove(0);
        }
    }
}

/// Registers every `/api` route.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(create_session)
            .service(delete_session)
            .service(upload)
            .service(profile)
            .service(classify)
            .service(table_summary)
            .service(table_statistics)
            .service(ask)
            .service(chart)
            .service(history)
            .service(restore)
            .service(clear_history)
            .service(new_file)
            .service(chat_history)
            .service(list_models)
            .service(get_logs),
    );
}

fn http_state(app: Arc<AppState>, logs: Arc<Mutex<Vec<LogEntry>>>) -> web::Data<HttpState> {
    web::Data::new(HttpState { app, logs })
}

/// Raw upload bodies may reach one byte past the configured limit so the
/// upload use case reports the size error itself.
fn payload_config(app: &AppState) -> web::PayloadConfig {
    web::PayloadConfig::new(app.config.upload.max_file_size + 1)
}

pub fn start_server(app: Arc<AppState>, logs: Arc<Mutex<Vec<LogEntry>>>) -> std::io::Result<Server> {
    let bind = (app.config.server.host.clone(), app.config.server.port);
    let payload = payload_config(&app);
    let state = http_state(app, logs);

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Allow all origins for local tool

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .app_data(payload.clone())
            .configure(routes)
    })
    .bind(bind)?
    .run();

    Ok(server)
}

// Helper trait to avoid move issues in handlers
trait RequestData<T> {
    fn req_data(&self) -> &T;
}

impl<T> RequestData<T> for web::Json<T> {
    fn req_data(&self) -> &T {
        &**self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::{ChartKind, ChartSpec};
    use crate::domain::chat::QueryAnswer;
    use crate::infrastructure::config::AppConfig;
    use crate::infrastructure::llm_clients::LLMClient;
    use actix_web::test;
    use async_trait::async_trait;
    use rust_xlsxwriter::Workbook;

    struct CannedClient(&'static str);

    #[async_trait]
    impl LLMClient for CannedClient {
        async fn generate(&self, _config: &LLMConfig, _system: &str, _user: &str) -> Result<String> {
            Ok(self.0.to_string())
        }

        async fn list_models(&self, _config: &LLMConfig) -> Result<Vec<String>> {
            Ok(vec!["canned".to_string()])
        }
    }

    fn state(reply: &'static str) -> web::Data<HttpState> {
        let app = AppState::new(AppConfig::default(), Arc::new(CannedClient(reply)));
        http_state(Arc::new(app), Arc::new(Mutex::new(Vec::new())))
    }

    fn workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "region").unwrap();
        sheet.write_string(0, 1, "sales").unwrap();
        let rows = [
            ("Bakı", 10.0),
            ("Bakı", 20.0),
            ("Gəncə", 5.0),
            ("Bakı", 30.0),
            ("Gəncə", 15.0),
        ];
        for (i, (region, sales)) in rows.iter().enumerate() {
            sheet.write_string(i as u32 + 1, 0, *region).unwrap();
            sheet.write_number(i as u32 + 1, 1, *sales).unwrap();
        }
        workbook.save_to_buffer().unwrap()
    }

    macro_rules! service {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data($state.clone())
                    .app_data(web::PayloadConfig::new(1024 * 1024))
                    .configure(routes),
            )
            .await
        };
    }

    macro_rules! new_session {
        ($app:expr) => {{
            let req = test::TestRequest::post().uri("/api/sessions").to_request();
            let body: serde_json::Value = test::call_and_read_body_json(&$app, req).await;
            body["session_id"]
                .as_str()
                .unwrap()
                .parse::<Uuid>()
                .unwrap()
        }};
    }

    #[actix_web::test]
    async fn upload_then_ask_for_a_chart() {
        let state = state("Regionlar üzrə vizualizasiya faydalı olar.");
        let app = service!(state);
        let session = new_session!(app);

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/upload?file_name=sales.xlsx", session))
            .set_payload(workbook())
            .to_request();
        let summary: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(summary["row_count"], 5);
        assert_eq!(summary["columns"], serde_json::json!(["region", "sales"]));

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/query", session))
            .set_json(serde_json::json!({ "query": "regionlar üzrə sütun qrafiki" }))
            .to_request();
        let answer: QueryAnswer = test::call_and_read_body_json(&app, req).await;
        assert!(answer.needs_chart);
        let bar_chart = answer.chart.unwrap();
        assert_eq!(bar_chart.kind, ChartKind::Bar);
        assert_eq!(bar_chart.bars()[0].category, "Bakı");
        assert_eq!(bar_chart.bars()[0].mean, 20.0);

        let req = test::TestRequest::get()
            .uri(&format!("/api/sessions/{}/chat", session))
            .to_request();
        let chat: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(chat.as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn direct_chart_and_reports() {
        let state = state("ok");
        let app = service!(state);
        let session = new_session!(app);

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/upload?file_name=sales.xls", session))
            .set_payload(workbook())
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/chart", session))
            .set_json(serde_json::json!({ "query": "pasta" }))
            .to_request();
        let spec: ChartSpec = test::call_and_read_body_json(&app, req).await;
        assert_eq!(spec.kind, ChartKind::Pie);
        assert_eq!(spec.slices()[0].label, "Bakı");
        assert_eq!(spec.slices()[0].count, 3);

        let req = test::TestRequest::get()
            .uri(&format!("/api/sessions/{}/summary", session))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["report"]
            .as_str()
            .unwrap()
            .starts_with("Ümumi sətir sayı: 5"));

        let req = test::TestRequest::get()
            .uri(&format!("/api/sessions/{}/classify", session))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body[0]["kind"], "categorical");
        assert_eq!(body[1]["kind"], "numeric");
    }

    #[actix_web::test]
    async fn unsupported_chart_maps_to_422() {
        let state = state("ok");
        let app = service!(state);
        let session = new_session!(app);

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/upload?file_name=sales.xlsx", session))
            .set_payload(workbook())
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/chart", session))
            .set_json(serde_json::json!({ "query": "xətti" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: ErrorBody = test::read_body_json(resp).await;
        assert_eq!(body.error, "unsupported_visualization");
        assert_eq!(
            body.message,
            "Xətti qrafik üçün ən azı iki rəqəmsal sütun tələb olunur"
        );
    }

    #[actix_web::test]
    async fn upload_errors_map_to_status_codes() {
        let state = state("ok");
        let app = service!(state);
        let session = new_session!(app);

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/upload?file_name=data.csv", session))
            .set_payload("a,b")
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/upload?file_name=data.xlsx", session))
            .set_payload("not a workbook")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: ErrorBody = test::read_body_json(resp).await;
        assert_eq!(body.error, "load");
        assert!(body.message.starts_with("Yanlış fayl formatı"));

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/upload?file_name=data.xlsx", Uuid::new_v4()))
            .set_payload(workbook())
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[actix_web::test]
    async fn query_without_file_or_text_is_rejected() {
        let state = state("ok");
        let app = service!(state);
        let session = new_session!(app);

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/query", session))
            .set_json(serde_json::json!({ "query": "" }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/query", session))
            .set_json(serde_json::json!({ "query": "salam" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: ErrorBody = test::read_body_json(resp).await;
        assert_eq!(body.message, "Məlumat tapılmadı: Zəhmət olmasa əvvəlcə fayl yükləyin");
    }

    #[actix_web::test]
    async fn history_restore_and_clear() {
        let state = state("ok");
        let app = service!(state);
        let session = new_session!(app);

        for name in ["first.xlsx", "second.xlsx"] {
            let req = test::TestRequest::post()
                .uri(&format!("/api/sessions/{}/upload?file_name={}", session, name))
                .set_payload(workbook())
                .to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::get()
            .uri(&format!("/api/sessions/{}/history", session))
            .to_request();
        let entries: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(entries.as_array().unwrap().len(), 2);
        assert_eq!(entries[1]["active"], true);

        let req = test::TestRequest::post()
            .uri(&format!(
                "/api/sessions/{}/history/{}/restore",
                session,
                entries[0]["id"].as_str().unwrap()
            ))
            .to_request();
        let restored: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(restored["file_name"], "first.xlsx");
        assert_eq!(restored["active"], true);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/sessions/{}/history", session))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NO_CONTENT
        );

        let req = test::TestRequest::get()
            .uri(&format!("/api/sessions/{}/profile", session))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[actix_web::test]
    async fn failures_are_recorded_in_log_ring() {
        let state = state("ok");
        let app = service!(state);

        let req = test::TestRequest::get()
            .uri(&format!("/api/sessions/{}/history", Uuid::new_v4()))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get().uri("/api/logs").to_request();
        let logs: Vec<LogEntry> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(logs.last().unwrap().level, "ERROR");
        assert!(logs.last().unwrap().message.starts_with("History failed"));
    }

    #[actix_web::test]
    async fn log_ring_keeps_last_entries() {
        let logs = Mutex::new(Vec::new());
        for i in 0..(MAX_LOG_ENTRIES + 5) {
            add_log(&logs, "INFO", "Test", &i.to_string());
        }
        let logs = logs.lock().unwrap();
        assert_eq!(logs.len(), MAX_LOG_ENTRIES);
        assert_eq!(logs[0].message, "5");
    }
}
