//! Per-call projection of records into JSON responses.
//!
//! A projection never nests deeper than one level: a user's reviews are plain review rows, a
//! review's user and game are plain rows. The caller picks which direct relations to include,
//! so the User -> Review -> Game -> User cycle can never expand.

use sea_orm::{ConnectionTrait, DbErr, EntityTrait, LoaderTrait, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::entities::{game, review, user};
use crate::error::AppError;

pub const USER_RELATIONS: &[&str] = &["reviews"];
pub const GAME_RELATIONS: &[&str] = &["reviews"];
pub const REVIEW_RELATIONS: &[&str] = &["user", "game"];

/// Which direct relations a projection carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Relations {
    /// Scalar columns only.
    None,
    /// Scalar columns plus every direct relation, one level deep.
    #[default]
    Direct,
    /// Like `Direct`, without the named relations.
    Excluding(Vec<String>),
}

impl Relations {
    /// Parse the `relations` query value: `none`, `direct`, or `-name[,-name...]`.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` for a malformed value or a relation not in `known`.
    pub fn parse(raw: &str, known: &[&str]) -> Result<Self, AppError> {
        match raw.trim() {
            "" | "direct" => Ok(Self::Direct),
            "none" => Ok(Self::None),
            list => {
                let mut excluded = Vec::new();
                for item in list.split(',').map(str::trim) {
                    let name = item.strip_prefix('-').ok_or_else(|| {
                        AppError::BadRequest(format!(
                            "Expected 'none', 'direct' or '-relation' exclusions, got '{item}'"
                        ))
                    })?;
                    if !known.contains(&name) {
                        return Err(AppError::BadRequest(format!(
                            "Unknown relation '{name}'; expected one of: {}",
                            known.join(", ")
                        )));
                    }
                    excluded.push(name.to_string());
                }
                Ok(Self::Excluding(excluded))
            }
        }
    }

    #[must_use]
    pub fn includes(&self, relation: &str) -> bool {
        match self {
            Self::None => false,
            Self::Direct => true,
            Self::Excluding(excluded) => !excluded.iter().any(|name| name == relation),
        }
    }
}

/// Query string accepted by the read endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectionQuery {
    pub relations: Option<String>,
}

impl ProjectionQuery {
    /// Resolve the requested projection against an entity's relation names.
    ///
    /// # Errors
    ///
    /// See [`Relations::parse`].
    pub fn relations(&self, known: &[&str]) -> Result<Relations, AppError> {
        self.relations
            .as_deref()
            .map_or(Ok(Relations::Direct), |raw| Relations::parse(raw, known))
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    #[serde(flatten)]
    pub user: user::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Vec<review::Model>>,
}

#[derive(Debug, Serialize)]
pub struct GameResponse {
    #[serde(flatten)]
    pub game: game::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Vec<review::Model>>,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    #[serde(flatten)]
    pub review: review::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<user::Model>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<game::Model>,
}

/// Project a batch of users, loading their reviews with a single query when requested.
///
/// # Errors
///
/// Returns the underlying database error if the related rows cannot be loaded.
pub async fn users<C: ConnectionTrait>(
    db: &C,
    users: Vec<user::Model>,
    relations: &Relations,
) -> Result<Vec<UserResponse>, DbErr> {
    let reviews: Vec<Option<Vec<review::Model>>> = if relations.includes("reviews") {
        users
            .load_many(review::Entity::find().order_by_asc(review::Column::Id), db)
            .await?
            .into_iter()
            .map(Some)
            .collect()
    } else {
        vec![None; users.len()]
    };

    Ok(users
        .into_iter()
        .zip(reviews)
        .map(|(user, reviews)| UserResponse { user, reviews })
        .collect())
}

/// Project a batch of games, loading their reviews with a single query when requested.
///
/// # Errors
///
/// Returns the underlying database error if the related rows cannot be loaded.
pub async fn games<C: ConnectionTrait>(
    db: &C,
    games: Vec<game::Model>,
    relations: &Relations,
) -> Result<Vec<GameResponse>, DbErr> {
    let reviews: Vec<Option<Vec<review::Model>>> = if relations.includes("reviews") {
        games
            .load_many(review::Entity::find().order_by_asc(review::Column::Id), db)
            .await?
            .into_iter()
            .map(Some)
            .collect()
    } else {
        vec![None; games.len()]
    };

    Ok(games
        .into_iter()
        .zip(reviews)
        .map(|(game, reviews)| GameResponse { game, reviews })
        .collect())
}

/// Project a batch of reviews, loading their user and game with one query each when requested.
///
/// # Errors
///
/// Returns the underlying database error if the related rows cannot be loaded.
pub async fn reviews<C: ConnectionTrait>(
    db: &C,
    reviews: Vec<review::Model>,
    relations: &Relations,
) -> Result<Vec<ReviewResponse>, DbErr> {
    let users = if relations.includes("user") {
        reviews.load_one(user::Entity, db).await?
    } else {
        vec![None; reviews.len()]
    };
    let games = if relations.includes("game") {
        reviews.load_one(game::Entity, db).await?
    } else {
        vec![None; reviews.len()]
    };

    Ok(reviews
        .into_iter()
        .zip(users)
        .zip(games)
        .map(|((review, user), game)| ReviewResponse { review, user, game })
        .collect())
}

/// Project a single user.
///
/// # Errors
///
/// Returns the underlying database error if the related rows cannot be loaded.
pub async fn user<C: ConnectionTrait>(
    db: &C,
    user: user::Model,
    relations: &Relations,
) -> Result<UserResponse, DbErr> {
    users(db, vec![user], relations).await?.pop().ok_or_else(|| {
        DbErr::RecordNotFound("user projection produced no row".to_string())
    })
}

/// Project a single game.
///
/// # Errors
///
/// Returns the underlying database error if the related rows cannot be loaded.
pub async fn game<C: ConnectionTrait>(
    db: &C,
    game: game::Model,
    relations: &Relations,
) -> Result<GameResponse, DbErr> {
    games(db, vec![game], relations).await?.pop().ok_or_else(|| {
        DbErr::RecordNotFound("game projection produced no row".to_string())
    })
}

/// Project a single review.
///
/// # Errors
///
/// Returns the underlying database error if the related rows cannot be loaded.
pub async fn review<C: ConnectionTrait>(
    db: &C,
    review: review::Model,
    relations: &Relations,
) -> Result<ReviewResponse, DbErr> {
    reviews(db, vec![review], relations).await?.pop().ok_or_else(|| {
        DbErr::RecordNotFound("review projection produced no row".to_string())
    })
}
