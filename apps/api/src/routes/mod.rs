pub mod cv;
pub mod health;
pub mod interview;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // CV parsing
        .route("/v1/cv/parse", post(cv::handle_parse_cv))
        // Interview lifecycle
        .route("/v1/interview/init", post(interview::handle_init))
        .route("/v1/interview/next", post(interview::handle_next))
        .route("/v1/interview/reply", post(interview::handle_reply))
        .route("/v1/interview/end", post(interview::handle_end))
        .route(
            "/v1/interview/report/:session_id",
            get(interview::handle_report),
        )
        .with_state(state)
}
