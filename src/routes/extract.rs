//! Extractors whose rejections render through `AppError`, so malformed ids, bodies and query
//! strings get the same `{ "error": ... }` shape as every other failure.

use std::marker::PhantomData;

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::entities::{game, review, user};
use crate::error::AppError;

/// A record type addressable by `/{resource}/{id}`.
pub trait Resource {
    const NAME: &'static str;
}

impl Resource for user::Entity {
    const NAME: &'static str = "User";
}

impl Resource for game::Entity {
    const NAME: &'static str = "Game";
}

impl Resource for review::Entity {
    const NAME: &'static str = "Review";
}

/// The `{id}` path segment of a record route.
///
/// Anything that is not an `i32` cannot name a stored record, so it is reported as
/// `<Entity> not found` rather than as a malformed request.
#[derive(Debug)]
pub struct RecordId<E>(pub i32, pub PhantomData<E>);

impl<S, E> FromRequestParts<S> for RecordId<E>
where
    S: Send + Sync,
    E: Resource,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::not_found(E::NAME))?;

        raw.parse::<i32>()
            .map(|id| Self(id, PhantomData))
            .map_err(|_| AppError::not_found(E::NAME))
    }
}

/// Form-encoded body kept as ordered `(field, value)` pairs.
#[derive(Debug, Default)]
pub struct FormPairs(pub Vec<(String, String)>);

impl<S> FromRequest<S> for FormPairs
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Form::<Vec<(String, String)>>::from_request(req, state).await {
            Ok(Form(pairs)) => Ok(Self(pairs)),
            Err(FormRejection::InvalidFormContentType(rejection)) => {
                Err(AppError::UnsupportedMediaType(rejection.body_text()))
            }
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}

/// Query string extractor with JSON rejections.
#[derive(Debug, Default)]
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| Self(value))
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
    }
}
