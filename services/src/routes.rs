use crate::roll::RollService;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use rolldice::domain::RecordSink;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, instrument};

/// 掷骰响应
#[derive(Debug, Serialize)]
pub struct RollResponse {
    pub result: i32,
}

pub fn roll_routes<S: RecordSink>() -> Router<Arc<RollService<S>>> {
    Router::new().route("/roll", get(roll::<S>))
}

#[instrument(name = "GET /roll", skip_all)]
async fn roll<S: RecordSink>(State(svc): State<Arc<RollService<S>>>) -> Response {
    match svc.dice().await {
        Ok(result) => Json(RollResponse { result }).into_response(),
        Err(e) => {
            error!("掷骰失败：{e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
