use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait, QueryOrder,
};

use super::MessageResponse;
use super::extract::{FormPairs, QueryParams, RecordId};
use crate::entities::{game, review, user};
use crate::error::AppError;
use crate::fields::FormFields;
use crate::serializer::{self, ProjectionQuery, REVIEW_RELATIONS, Relations, ReviewResponse};
use crate::state::AppState;

/// Build the review route group: `/reviews/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reviews).post(create_review))
        .route(
            "/{id}",
            get(get_review).patch(update_review).delete(delete_review),
        )
}

/// `GET /reviews`
async fn list_reviews(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ProjectionQuery>,
) -> Result<Json<Vec<ReviewResponse>>, AppError> {
    let relations = query.relations(REVIEW_RELATIONS)?;

    let reviews = review::Entity::find()
        .order_by_asc(review::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(
        serializer::reviews(&state.db, reviews, &relations).await?,
    ))
}

/// `POST /reviews`
async fn create_review(
    State(state): State<AppState>,
    FormPairs(form): FormPairs,
) -> Result<impl IntoResponse, AppError> {
    let mut active = <review::ActiveModel as Default>::default();
    active.apply_form(&form)?;
    active.check_required()?;
    ensure_references(&state.db, &active).await?;

    let now = Utc::now().fixed_offset();
    active.created_at = Set(now);
    active.updated_at = Set(now);
    let review = active.insert(&state.db).await?;

    tracing::info!(
        review_id = review.id,
        game_id = review.game_id,
        user_id = review.user_id,
        "Review created"
    );

    let response = serializer::review(&state.db, review, &Relations::Direct).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /reviews/{id}`
async fn get_review(
    State(state): State<AppState>,
    RecordId(id, _): RecordId<review::Entity>,
    QueryParams(query): QueryParams<ProjectionQuery>,
) -> Result<Json<ReviewResponse>, AppError> {
    let relations = query.relations(REVIEW_RELATIONS)?;
    let review = find_review(&state.db, id).await?;
    Ok(Json(
        serializer::review(&state.db, review, &relations).await?,
    ))
}

/// `PATCH /reviews/{id}`
async fn update_review(
    State(state): State<AppState>,
    RecordId(id, _): RecordId<review::Entity>,
    FormPairs(form): FormPairs,
) -> Result<Json<ReviewResponse>, AppError> {
    let review = find_review(&state.db, id).await?;

    let mut active: review::ActiveModel = review.clone().into();
    let review = if active.apply_form(&form)? {
        ensure_references(&state.db, &active).await?;
        active.updated_at = Set(Utc::now().fixed_offset());
        let updated = active.update(&state.db).await?;
        tracing::info!(review_id = id, fields = form.len(), "Review updated");
        updated
    } else {
        review
    };

    Ok(Json(
        serializer::review(&state.db, review, &Relations::Direct).await?,
    ))
}

/// `DELETE /reviews/{id}`
async fn delete_review(
    State(state): State<AppState>,
    RecordId(id, _): RecordId<review::Entity>,
) -> Result<Json<MessageResponse>, AppError> {
    let review = find_review(&state.db, id).await?;
    review.delete(&state.db).await?;

    tracing::info!(review_id = id, "Review deleted");

    Ok(Json(MessageResponse::deleted("Review")))
}

async fn find_review(db: &DatabaseConnection, id: i32) -> Result<review::Model, AppError> {
    review::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Review"))
}

/// Reject a review whose newly assigned `user_id` or `game_id` points at no record.
async fn ensure_references(
    db: &DatabaseConnection,
    active: &review::ActiveModel,
) -> Result<(), AppError> {
    if let Set(user_id) = &active.user_id
        && user::Entity::find_by_id(*user_id).count(db).await? == 0
    {
        return Err(AppError::UnprocessableEntity(format!(
            "user_id {user_id} does not reference an existing User"
        )));
    }

    if let Set(game_id) = &active.game_id
        && game::Entity::find_by_id(*game_id).count(db).await? == 0
    {
        return Err(AppError::UnprocessableEntity(format!(
            "game_id {game_id} does not reference an existing Game"
        )));
    }

    Ok(())
}
