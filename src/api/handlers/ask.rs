use crate::{
    types::{AppError, AskRequest, AskResponse, Result},
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

/// Answer a question from the indexed documents.
///
/// Small talk gets a canned reply; questions the index knows nothing about
/// get a fixed apology with status 200. A body that is not a valid
/// `AskRequest` is a 400 in the usual error envelope.
pub async fn ask(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>> {
    let Json(payload) =
        payload.map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;
    let outcome = state.qa.answer(&payload.question).await?;
    Ok(Json(AskResponse {
        answer: outcome.into_answer(),
    }))
}
