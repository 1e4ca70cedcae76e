//! Chat endpoint

use axum::{body::Bytes, extract::State, Json};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{ChatRequest, ChatResult};

/// POST /chat - Answer a query from retrieved passages
///
/// The body is read raw and decoded here so that a bad or missing
/// `Content-Type` is reported the same way as any other malformed body.
pub async fn chat(State(state): State<AppState>, body: Bytes) -> Result<Json<ChatResult>> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("chat", %request_id);

    async move {
        let request = ChatRequest::from_body(&body)?;
        let result = state.pipeline().answer(&request).await?;
        Ok::<_, Error>(Json(result))
    }
    .instrument(span)
    .await
}

/// Any method other than POST on /chat
pub async fn method_not_allowed() -> Error {
    Error::MethodNotAllowed
}
