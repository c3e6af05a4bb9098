use crate::dtos::{NewWine, UpdateWine, WineResponse};
use crate::error::AppError;
use crate::models::Wine;
use crate::services::database::is_duplicate_key;
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use validator::Validate;

#[tracing::instrument(skip(state, payload))]
pub async fn add_wine(
    State(state): State<AppState>,
    Json(payload): Json<NewWine>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let wine = Wine::from(payload);
    state
        .db
        .wines()
        .insert_one(&wine, None)
        .await
        .map_err(|e| {
            if is_duplicate_key(&e) {
                AppError::Conflict(anyhow::anyhow!(
                    "A wine named '{}' already exists",
                    wine.name
                ))
            } else {
                tracing::error!("Failed to insert wine '{}': {}", wine.name, e);
                AppError::from(e)
            }
        })?;

    tracing::info!(name = %wine.name, "Wine added");
    Ok("Wine added to the database!")
}

#[tracing::instrument(skip(state))]
pub async fn get_wines(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut cursor = state
        .db
        .wines()
        .find(doc! {}, None)
        .await
        .map_err(AppError::from)?;

    let mut wines = Vec::new();
    while let Some(wine) = cursor.try_next().await.map_err(AppError::from)? {
        wines.push(WineResponse::from(wine));
    }

    Ok(Json(wines))
}

/// Applies a partial replacement keyed on the `name` path parameter and
/// echoes the post-update record. A miss is a `null` body, not a 404.
#[tracing::instrument(skip(state, payload))]
pub async fn update_wine(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(payload): Json<UpdateWine>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let set = payload.to_set_document()?;

    // $set rejects an empty document, so an empty body is a plain lookup.
    let updated = if set.is_empty() {
        state
            .db
            .wines()
            .find_one(doc! { "name": &name }, None)
            .await
            .map_err(AppError::from)?
    } else {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        state
            .db
            .wines()
            .find_one_and_update(doc! { "name": &name }, doc! { "$set": set }, options)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    AppError::Conflict(anyhow::anyhow!(
                        "Renaming '{}' collides with an existing wine",
                        name
                    ))
                } else {
                    tracing::error!("Failed to update wine '{}': {}", name, e);
                    AppError::from(e)
                }
            })?
    };

    Ok(Json(updated.map(WineResponse::from)))
}

/// Removes the record matching the `name` path parameter. Responds with
/// the fixed confirmation whether or not a record existed.
#[tracing::instrument(skip(state))]
pub async fn delete_wine(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = state
        .db
        .wines()
        .delete_one(doc! { "name": &name }, None)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete wine '{}': {}", name, e);
            AppError::from(e)
        })?;

    tracing::info!(name = %name, deleted = result.deleted_count, "Wine delete handled");
    Ok(Json(serde_json::json!({ "message": "Wine deleted" })))
}
