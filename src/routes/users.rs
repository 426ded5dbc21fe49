use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};

use super::MessageResponse;
use super::extract::{FormPairs, QueryParams, RecordId};
use crate::entities::{review, user};
use crate::error::AppError;
use crate::fields::FormFields;
use crate::serializer::{self, ProjectionQuery, Relations, USER_RELATIONS, UserResponse};
use crate::state::AppState;

/// Build the user route group: `/users/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// `GET /users`
async fn list_users(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ProjectionQuery>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let relations = query.relations(USER_RELATIONS)?;

    let users = user::Entity::find()
        .order_by_asc(user::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(serializer::users(&state.db, users, &relations).await?))
}

/// `POST /users`
async fn create_user(
    State(state): State<AppState>,
    FormPairs(form): FormPairs,
) -> Result<impl IntoResponse, AppError> {
    let mut active = <user::ActiveModel as Default>::default();
    active.apply_form(&form)?;
    active.check_required()?;

    let now = Utc::now().fixed_offset();
    active.created_at = Set(now);
    active.updated_at = Set(now);
    let user = active.insert(&state.db).await?;

    tracing::info!(user_id = user.id, "User created");

    let response = serializer::user(&state.db, user, &Relations::Direct).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /users/{id}`
async fn get_user(
    State(state): State<AppState>,
    RecordId(id, _): RecordId<user::Entity>,
    QueryParams(query): QueryParams<ProjectionQuery>,
) -> Result<Json<UserResponse>, AppError> {
    let relations = query.relations(USER_RELATIONS)?;
    let user = find_user(&state.db, id).await?;
    Ok(Json(serializer::user(&state.db, user, &relations).await?))
}

/// `PATCH /users/{id}`
async fn update_user(
    State(state): State<AppState>,
    RecordId(id, _): RecordId<user::Entity>,
    FormPairs(form): FormPairs,
) -> Result<Json<UserResponse>, AppError> {
    let user = find_user(&state.db, id).await?;

    let mut active: user::ActiveModel = user.clone().into();
    let user = if active.apply_form(&form)? {
        active.updated_at = Set(Utc::now().fixed_offset());
        let updated = active.update(&state.db).await?;
        tracing::info!(user_id = id, fields = form.len(), "User updated");
        updated
    } else {
        user
    };

    Ok(Json(
        serializer::user(&state.db, user, &Relations::Direct).await?,
    ))
}

/// `DELETE /users/{id}`
///
/// The user's reviews are removed in the same transaction.
async fn delete_user(
    State(state): State<AppState>,
    RecordId(id, _): RecordId<user::Entity>,
) -> Result<Json<MessageResponse>, AppError> {
    let user = find_user(&state.db, id).await?;

    let txn = state.db.begin().await?;
    let removed = review::Entity::delete_many()
        .filter(review::Column::UserId.eq(user.id))
        .exec(&txn)
        .await?;
    user.delete(&txn).await?;
    txn.commit().await?;

    tracing::info!(
        user_id = id,
        reviews_removed = removed.rows_affected,
        "User deleted"
    );

    Ok(Json(MessageResponse::deleted("User")))
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

async fn find_user(db: &DatabaseConnection, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("User"))
}
