//! Route handler functions.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use intake_core::events::TurnRequest;
use intake_handoff::NewLead;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Inquiry form submission from the public website.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub cell_phone: String,
    #[serde(default)]
    pub campus: String,
    #[serde(default)]
    pub program_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InquiryResponse {
    pub success: bool,
    pub lead_id: String,
}

/// POST /turn - run one conversation turn, streaming events as SSE.
///
/// Each SSE data line is one serialized turn event. Validation failures
/// arrive as a single `error` event on the stream rather than an HTTP
/// error, so clients consume one shape regardless of outcome.
pub async fn turn(
    State(state): State<AppState>,
    Json(request): Json<TurnRequest>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>> + Send> {
    let rx = state.runner.run(request);
    let stream = ReceiverStream::new(rx).map(|event| {
        let data = serde_json::to_string(&event).unwrap_or_default();
        Ok(Event::default().data(data))
    });
    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

/// POST /inquiry - create a lead record from an inquiry form submission.
///
/// This is the form the chat assistant points students at when no lead
/// record exists for their contact address yet.
pub async fn inquiry(
    State(state): State<AppState>,
    Json(form): Json<InquiryForm>,
) -> Result<Json<InquiryResponse>, ApiError> {
    if form.last_name.trim().is_empty() {
        return Err(ApiError::BadRequest("Last name is required".to_string()));
    }
    if form.email.trim().is_empty() && form.cell_phone.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "An email address or phone number is required".to_string(),
        ));
    }

    let mut description_parts = Vec::new();
    if !form.campus.is_empty() {
        description_parts.push(format!("Campus: {}", form.campus));
    }
    if !form.program_type.is_empty() {
        description_parts.push(format!("Program Type: {}", form.program_type));
    }
    let lead = NewLead {
        first_name: form.first_name,
        last_name: form.last_name,
        email: form.email,
        phone: form.cell_phone,
        description: description_parts.join("\n"),
        source: "Web Form - Admissions".to_string(),
        status: "New".to_string(),
    };

    state.crm.connect().await.map_err(ApiError::from)?;
    let lead_id = state.crm.create_lead(&lead).await.map_err(ApiError::from)?;
    Ok(Json(InquiryResponse {
        success: true,
        lead_id,
    }))
}

/// GET /health - health check.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}
