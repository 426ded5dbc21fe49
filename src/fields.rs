//! Whitelisted, typed assignment of form fields onto records.
//!
//! Create and update handlers never set attributes by arbitrary name. Each entity lists the
//! fields a client may write, and every value is coerced to the column type before it reaches
//! the active model. Identifiers, timestamps and relation collections are never writable.

use sea_orm::ActiveValue::{self, Set};

use crate::entities::{game, review, user};
use crate::error::AppError;

/// Field-update contract implemented by each entity's `ActiveModel`.
pub trait FormFields {
    /// Display name used in error messages.
    const ENTITY: &'static str;
    /// Names a client may write, in the order they are documented.
    const FIELDS: &'static [&'static str];

    /// Coerce `value` and assign it to `field`.
    ///
    /// Returns whether the field now differs from the stored record; a value equal to the stored
    /// one leaves the field unchanged.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` for a name outside `FIELDS`, or `UnprocessableEntity` if the value
    /// cannot be coerced to the column type.
    fn set_field(&mut self, field: &str, value: &str) -> Result<bool, AppError>;

    /// Verify that every non-null column without a server default has been set.
    ///
    /// # Errors
    ///
    /// Returns `UnprocessableEntity` naming the first missing field.
    fn check_required(&self) -> Result<(), AppError>;

    /// Apply every `(field, value)` pair in order.
    ///
    /// Returns whether at least one field changed.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` for a field outside the whitelist, or the coercion error of the
    /// first invalid value. Nothing is persisted either way.
    fn apply_form(&mut self, form: &[(String, String)]) -> Result<bool, AppError> {
        let mut changed = false;
        for (field, value) in form {
            if !Self::FIELDS.contains(&field.as_str()) {
                return Err(not_writable::<Self>(field));
            }
            changed |= self.set_field(field, value)?;
        }
        Ok(changed)
    }
}

fn not_writable<T: FormFields + ?Sized>(field: &str) -> AppError {
    AppError::BadRequest(format!(
        "Field '{field}' cannot be set on {}; writable fields: {}",
        T::ENTITY,
        T::FIELDS.join(", ")
    ))
}

/// Store `value` unless it equals the value loaded from the database.
fn assign<V>(slot: &mut ActiveValue<V>, value: V) -> bool
where
    V: Into<sea_orm::Value> + PartialEq,
{
    if let ActiveValue::Unchanged(current) = slot
        && *current == value
    {
        return false;
    }
    *slot = Set(value);
    true
}

fn missing(field: &str) -> AppError {
    AppError::UnprocessableEntity(format!("Field '{field}' is required"))
}

/// Required text: trimmed and non-empty.
fn text(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::UnprocessableEntity(format!(
            "Field '{field}' must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Optional text: the empty string clears the column.
fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn integer(field: &str, value: &str) -> Result<i32, AppError> {
    value.trim().parse::<i32>().map_err(|_| {
        AppError::UnprocessableEntity(format!(
            "Field '{field}' must be an integer, got '{value}'"
        ))
    })
}

fn optional_integer(field: &str, value: &str) -> Result<Option<i32>, AppError> {
    if value.trim().is_empty() {
        Ok(None)
    } else {
        integer(field, value).map(Some)
    }
}

impl FormFields for user::ActiveModel {
    const ENTITY: &'static str = "User";
    const FIELDS: &'static [&'static str] = &["name"];

    fn set_field(&mut self, field: &str, value: &str) -> Result<bool, AppError> {
        match field {
            "name" => Ok(assign(&mut self.name, text(field, value)?)),
            _ => Err(not_writable::<Self>(field)),
        }
    }

    fn check_required(&self) -> Result<(), AppError> {
        if !self.name.is_set() {
            return Err(missing("name"));
        }
        Ok(())
    }
}

impl FormFields for game::ActiveModel {
    const ENTITY: &'static str = "Game";
    const FIELDS: &'static [&'static str] = &["title", "genre", "platform", "price"];

    fn set_field(&mut self, field: &str, value: &str) -> Result<bool, AppError> {
        match field {
            "title" => Ok(assign(&mut self.title, text(field, value)?)),
            "genre" => Ok(assign(&mut self.genre, optional_text(value))),
            "platform" => Ok(assign(&mut self.platform, optional_text(value))),
            "price" => Ok(assign(&mut self.price, optional_integer(field, value)?)),
            _ => Err(not_writable::<Self>(field)),
        }
    }

    fn check_required(&self) -> Result<(), AppError> {
        if !self.title.is_set() {
            return Err(missing("title"));
        }
        Ok(())
    }
}

impl FormFields for review::ActiveModel {
    const ENTITY: &'static str = "Review";
    const FIELDS: &'static [&'static str] = &["score", "comment", "game_id", "user_id"];

    fn set_field(&mut self, field: &str, value: &str) -> Result<bool, AppError> {
        match field {
            "score" => Ok(assign(&mut self.score, integer(field, value)?)),
            "comment" => Ok(assign(&mut self.comment, optional_text(value))),
            "game_id" => Ok(assign(&mut self.game_id, integer(field, value)?)),
            "user_id" => Ok(assign(&mut self.user_id, integer(field, value)?)),
            _ => Err(not_writable::<Self>(field)),
        }
    }

    fn check_required(&self) -> Result<(), AppError> {
        for (field, is_set) in [
            ("score", self.score.is_set()),
            ("game_id", self.game_id.is_set()),
            ("user_id", self.user_id.is_set()),
        ] {
            if !is_set {
                return Err(missing(field));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::Utc;

    fn form(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_user_name_is_trimmed() {
        let mut active = user::ActiveModel::default();
        let changed = active
            .apply_form(&form(&[("name", "  Ada  ")]))
            .unwrap_or_default();
        assert!(changed);
        assert_eq!(active.name, ActiveValue::Set("Ada".to_string()));
        assert!(active.check_required().is_ok());
    }

    #[test]
    fn test_identifier_is_not_writable() {
        let mut active = user::ActiveModel::default();
        let err = active.apply_form(&form(&[("id", "7")])).err();
        assert_eq!(err.map(|e| e.status()), Some(StatusCode::BAD_REQUEST));
        assert!(!active.id.is_set());
    }

    #[test]
    fn test_relation_collection_is_not_writable() {
        let mut active = game::ActiveModel::default();
        let err = active.apply_form(&form(&[("reviews", "[]")])).err();
        assert_eq!(err.map(|e| e.status()), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut active = user::ActiveModel::default();
        let err = active.apply_form(&form(&[("name", "   ")])).err();
        assert_eq!(
            err.map(|e| e.status()),
            Some(StatusCode::UNPROCESSABLE_ENTITY)
        );
    }

    #[test]
    fn test_empty_form_changes_nothing() {
        let mut active = game::ActiveModel::default();
        assert_eq!(active.apply_form(&[]).ok(), Some(false));
        assert!(
            active.check_required().is_err(),
            "title is still missing on a blank game"
        );
    }

    #[test]
    fn test_same_value_is_not_a_change() {
        let now = Utc::now().fixed_offset();
        let mut active = user::ActiveModel::from(user::Model {
            id: 1,
            name: "Ada".to_string(),
            created_at: now,
            updated_at: now,
        });

        assert_eq!(active.apply_form(&form(&[("name", "Ada")])).ok(), Some(false));
        assert!(!active.name.is_set());

        assert_eq!(active.apply_form(&form(&[("name", "Grace")])).ok(), Some(true));
        assert_eq!(active.name, ActiveValue::Set("Grace".to_string()));
    }

    #[test]
    fn test_game_optional_fields() {
        let mut active = game::ActiveModel::default();
        let result = active.apply_form(&form(&[
            ("title", "Hollow Knight"),
            ("genre", ""),
            ("price", "15"),
        ]));
        assert!(result.is_ok());
        assert_eq!(active.genre, ActiveValue::Set(None));
        assert_eq!(active.price, ActiveValue::Set(Some(15)));
        assert!(!active.platform.is_set());
    }

    #[test]
    fn test_review_score_must_be_integer() {
        let mut active = review::ActiveModel::default();
        let err = active.apply_form(&form(&[("score", "ten")])).err();
        assert_eq!(
            err.map(|e| e.status()),
            Some(StatusCode::UNPROCESSABLE_ENTITY)
        );
    }

    #[test]
    fn test_review_required_fields() {
        let mut active = review::ActiveModel::default();
        let applied = active.apply_form(&form(&[("score", "8"), ("game_id", "1")]));
        assert!(applied.is_ok());

        match active.check_required() {
            Err(AppError::UnprocessableEntity(msg)) => assert!(msg.contains("user_id")),
            other => unreachable!("expected missing user_id, got {other:?}"),
        }
    }
}
