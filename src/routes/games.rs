use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};

use super::MessageResponse;
use super::extract::{FormPairs, QueryParams, RecordId};
use crate::entities::{game, review, user};
use crate::error::AppError;
use crate::fields::FormFields;
use crate::serializer::{
    self, GAME_RELATIONS, GameResponse, ProjectionQuery, Relations, UserResponse,
};
use crate::state::AppState;

/// Game management router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_games).post(create_game))
        .route(
            "/{id}",
            get(get_game).patch(update_game).delete(delete_game),
        )
        .route("/{id}/users", get(list_game_users))
        .route("/users/{id}", get(list_game_users))
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /games` - List every game.
async fn list_games(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ProjectionQuery>,
) -> Result<Json<Vec<GameResponse>>, AppError> {
    let relations = query.relations(GAME_RELATIONS)?;

    let games = game::Entity::find()
        .order_by_asc(game::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(serializer::games(&state.db, games, &relations).await?))
}

/// `POST /games` - Create a game.
async fn create_game(
    State(state): State<AppState>,
    FormPairs(form): FormPairs,
) -> Result<impl IntoResponse, AppError> {
    let mut active = <game::ActiveModel as Default>::default();
    active.apply_form(&form)?;
    active.check_required()?;

    let now = Utc::now().fixed_offset();
    active.created_at = Set(now);
    active.updated_at = Set(now);
    let game = active.insert(&state.db).await?;

    tracing::info!(game_id = game.id, title = %game.title, "Game created");

    let response = serializer::game(&state.db, game, &Relations::Direct).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /games/{id}` - Get a game by ID.
async fn get_game(
    State(state): State<AppState>,
    RecordId(id, _): RecordId<game::Entity>,
    QueryParams(query): QueryParams<ProjectionQuery>,
) -> Result<Json<GameResponse>, AppError> {
    let relations = query.relations(GAME_RELATIONS)?;
    let game = find_game(&state.db, id).await?;
    Ok(Json(serializer::game(&state.db, game, &relations).await?))
}

/// `PATCH /games/{id}` - Update whitelisted game fields.
async fn update_game(
    State(state): State<AppState>,
    RecordId(id, _): RecordId<game::Entity>,
    FormPairs(form): FormPairs,
) -> Result<Json<GameResponse>, AppError> {
    let game = find_game(&state.db, id).await?;

    let mut active: game::ActiveModel = game.clone().into();
    let game = if active.apply_form(&form)? {
        active.updated_at = Set(Utc::now().fixed_offset());
        let updated = active.update(&state.db).await?;
        tracing::info!(game_id = id, fields = form.len(), "Game updated");
        updated
    } else {
        game
    };

    Ok(Json(
        serializer::game(&state.db, game, &Relations::Direct).await?,
    ))
}

/// `DELETE /games/{id}` - Delete a game together with its reviews.
async fn delete_game(
    State(state): State<AppState>,
    RecordId(id, _): RecordId<game::Entity>,
) -> Result<Json<MessageResponse>, AppError> {
    let game = find_game(&state.db, id).await?;

    let txn = state.db.begin().await?;
    let removed = review::Entity::delete_many()
        .filter(review::Column::GameId.eq(game.id))
        .exec(&txn)
        .await?;
    game.delete(&txn).await?;
    txn.commit().await?;

    tracing::info!(
        game_id = id,
        reviews_removed = removed.rows_affected,
        "Game deleted"
    );

    Ok(Json(MessageResponse::deleted("Game")))
}

/// `GET /games/{id}/users` (also `/games/users/{id}`) - Users who reviewed the game, each listed
/// once.
async fn list_game_users(
    State(state): State<AppState>,
    RecordId(id, _): RecordId<game::Entity>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let game = find_game(&state.db, id).await?;

    let users = game
        .find_related(user::Entity)
        .distinct()
        .order_by_asc(user::Column::Id)
        .all(&state.db)
        .await?;

    // Reviews would point back at this game
    let relations = Relations::Excluding(vec!["reviews".to_string()]);
    Ok(Json(serializer::users(&state.db, users, &relations).await?))
}

// ============================================================================
// Helpers
// ============================================================================

async fn find_game(db: &DatabaseConnection, id: i32) -> Result<game::Model, AppError> {
    game::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Game"))
}
