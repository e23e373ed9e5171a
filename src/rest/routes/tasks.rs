// rest/routes/tasks.rs — Task REST routes.
//
// Thin glue: deserialize, call the manager, map TaskError to a status code.
// The wire messages are exact contracts, including the Portuguese
// "Categoria inválida" carried over from the service this one replaces.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::tasks::{NewTaskInput, TaskError, TaskPatch};
use crate::AppContext;

type RestError = (StatusCode, Json<Value>);

fn into_rest_error(err: TaskError) -> RestError {
    let status = match &err {
        TaskError::Validation(_) => StatusCode::BAD_REQUEST,
        TaskError::NotFound => StatusCode::NOT_FOUND,
        TaskError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() })))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    completed: Option<String>,
}

pub async fn list_tasks(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, RestError> {
    // The value is compared to "true" case-insensitively; any other value
    // filters on pending.
    let completed = query.completed.map(|v| v.eq_ignore_ascii_case("true"));
    let tasks = ctx
        .manager
        .get_tasks(completed)
        .await
        .map_err(into_rest_error)?;
    Ok(Json(json!(tasks)))
}

pub async fn add_task(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<NewTaskInput>,
) -> Result<(StatusCode, Json<Value>), RestError> {
    let task = ctx.manager.add_task(body).await.map_err(into_rest_error)?;
    Ok((StatusCode::CREATED, Json(json!(task))))
}

pub async fn edit_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
    Json(body): Json<TaskPatch>,
) -> Result<Json<Value>, RestError> {
    let task = ctx
        .manager
        .edit_task(id, body)
        .await
        .map_err(into_rest_error)?;
    Ok(Json(json!(task)))
}

pub async fn delete_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, RestError> {
    // Succeeds even when the id never existed.
    ctx.manager
        .delete_task(id)
        .await
        .map_err(into_rest_error)?;
    Ok(Json(json!({ "message": format!("Task {id} deleted") })))
}

pub async fn mark_completed(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, RestError> {
    let task = ctx
        .manager
        .mark_completed(id)
        .await
        .map_err(into_rest_error)?;
    Ok(Json(json!(task)))
}

pub async fn delete_all(
    State(ctx): State<Arc<AppContext>>,
) -> Result<Json<Value>, RestError> {
    ctx.manager.delete_all().await.map_err(into_rest_error)?;
    Ok(Json(json!({ "message": "All tasks deleted" })))
}
