use axum::{
    extract::{Multipart, Path, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::authz::{bearer_token, AuthorizationContext};
use crate::content::reconciler::{DeleteOutcome, ReconciledSection, Reconciler};
use crate::content::sections::{section, SectionConfig};
use crate::errors::AppError;
use crate::state::AppState;
use crate::store::ItemId;

fn section_or_404(key: &str) -> Result<&'static SectionConfig, AppError> {
    section(key).ok_or_else(|| AppError::NotFound(format!("Unknown section '{key}'")))
}

async fn authorize(state: &AppState, headers: &HeaderMap) -> AuthorizationContext {
    let viewer = state.identity.current_viewer(bearer_token(headers)).await;
    AuthorizationContext::for_viewer(viewer)
}

fn reconciler<'a>(
    state: &'a AppState,
    config: &'static SectionConfig,
    authz: &'a AuthorizationContext,
) -> Reconciler<'a> {
    Reconciler::new(
        config,
        state.records.as_ref(),
        state.blobs.as_ref(),
        state.drafts.as_ref(),
        authz,
    )
}

#[derive(Debug, Deserialize)]
pub struct ItemPayload {
    pub data: Value,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub outcome: DeleteOutcome,
    #[serde(flatten)]
    pub section: ReconciledSection,
}

/// GET /api/v1/sections/:key
pub async fn handle_get_section(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ReconciledSection>, AppError> {
    let config = section_or_404(&key)?;
    let authz = authorize(&state, &headers).await;
    let list = reconciler(&state, config, &authz).load().await?;
    Ok(Json(list))
}

/// POST /api/v1/sections/:key/items
pub async fn handle_add_item(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<ItemPayload>,
) -> Result<Json<ReconciledSection>, AppError> {
    let config = section_or_404(&key)?;
    let authz = authorize(&state, &headers).await;
    let list = reconciler(&state, config, &authz).add(payload.data).await?;
    Ok(Json(list))
}

/// PUT /api/v1/sections/:key/items/:id
pub async fn handle_edit_item(
    State(state): State<AppState>,
    Path((key, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(payload): Json<ItemPayload>,
) -> Result<Json<ReconciledSection>, AppError> {
    let config = section_or_404(&key)?;
    let authz = authorize(&state, &headers).await;
    let id = ItemId::parse(&id);
    let list = reconciler(&state, config, &authz)
        .edit(&id, payload.data)
        .await?;
    Ok(Json(list))
}

/// DELETE /api/v1/sections/:key/items/:id
pub async fn handle_delete_item(
    State(state): State<AppState>,
    Path((key, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<DeleteResponse>, AppError> {
    let config = section_or_404(&key)?;
    let authz = authorize(&state, &headers).await;
    let id = ItemId::parse(&id);
    let (section, outcome) = reconciler(&state, config, &authz).delete(&id).await?;
    Ok(Json(DeleteResponse { outcome, section }))
}

/// POST /api/v1/sections/:key/items/:id/asset
/// Multipart upload; the file arrives in a `file` field.
pub async fn handle_attach_asset(
    State(state): State<AppState>,
    Path((key, id)): Path<(String, String)>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<ReconciledSection>, AppError> {
    let config = section_or_404(&key)?;
    let authz = authorize(&state, &headers).await;
    let id = ItemId::parse(&id);

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("Upload is missing a filename".to_string()))?;
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        upload = Some((filename, content_type, bytes));
        break;
    }
    let (filename, content_type, bytes) =
        upload.ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;

    let list = reconciler(&state, config, &authz)
        .attach_asset(&id, &filename, bytes, &content_type)
        .await?;
    Ok(Json(list))
}

/// DELETE /api/v1/sections/:key/items/:id/asset
pub async fn handle_detach_asset(
    State(state): State<AppState>,
    Path((key, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<ReconciledSection>, AppError> {
    let config = section_or_404(&key)?;
    let authz = authorize(&state, &headers).await;
    let id = ItemId::parse(&id);
    let list = reconciler(&state, config, &authz).detach_asset(&id).await?;
    Ok(Json(list))
}
