use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, categories, users,
    util::{normalize_required_name, parse_uuid},
};

use super::{Engine, with_tx};

impl Engine {
    /// Register a user and return its id.
    ///
    /// Password hashing is the caller's concern; the value is stored as given.
    pub async fn create_user(&self, username: &str, password: &str) -> ResultEngine<Uuid> {
        let username = normalize_required_name(username, "user")?;
        if password.is_empty() {
            return Err(EngineError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }
        let id = Uuid::new_v4();
        with_tx!(self, |unit| {
            users::ActiveModel {
                id: ActiveValue::Set(id.to_string()),
                username: ActiveValue::Set(username),
                password: ActiveValue::Set(password.to_string()),
            }
            .insert(unit.connection())
            .await?;
            Ok(id)
        })
    }

    /// Resolve a username to its user id.
    pub async fn user_id(&self, username: &str) -> ResultEngine<Uuid> {
        with_tx!(self, |unit| {
            let model = users::Entity::find()
                .filter(users::Column::Username.eq(username))
                .one(unit.connection())
                .await?
                .ok_or_else(|| EngineError::NotFound("user".to_string()))?;
            parse_uuid(&model.id, "user")
        })
    }

    /// Create a category owned by `user_id` and return its id.
    pub async fn create_category(&self, user_id: Uuid, name: &str) -> ResultEngine<i32> {
        let name = normalize_required_name(name, "category")?;
        with_tx!(self, |unit| {
            let model = categories::ActiveModel {
                id: ActiveValue::NotSet,
                user_id: ActiveValue::Set(user_id.to_string()),
                name: ActiveValue::Set(name),
            }
            .insert(unit.connection())
            .await?;
            Ok(model.id)
        })
    }
}
