use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use phonebook_core::{Contact, ContactDraft, ContactId, ContactPatch};
use serde::Serialize;

use crate::{AppState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

pub async fn list_contacts(State(state): State<AppState>) -> Result<Json<Vec<Contact>>, ApiError> {
    let contacts = state.service.list().await?;
    Ok(Json(contacts))
}

pub async fn create_contact(
    State(state): State<AppState>,
    payload: Result<Json<ContactDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Contact>), ApiError> {
    let Json(draft) = payload?;
    let contact = state.service.create(draft).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

pub async fn update_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ContactPatch>, JsonRejection>,
) -> Result<Json<Contact>, ApiError> {
    let Json(patch) = payload?;
    let contact = state.service.update(&ContactId::new(id), patch).await?;
    Ok(Json(contact))
}

pub async fn delete_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    state.service.delete(&ContactId::new(id)).await?;
    Ok(Json(DeleteResponse { success: true }))
}
