use sea_orm::{ActiveValue, Condition, QueryFilter, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, SyncUserCmd, User, users, util::normalize_optional_text};

use super::{Engine, with_tx};

impl Engine {
    /// Return the user with the given id.
    pub async fn user(&self, user_id: &str) -> ResultEngine<User> {
        users::Entity::find_by_id(user_id.to_string())
            .one(&self.database)
            .await?
            .map(User::from)
            .ok_or_else(|| EngineError::KeyNotFound(format!("user {user_id}")))
    }

    /// Return the user registered with exactly this email.
    ///
    /// Read paths never create users: a missing record is `KeyNotFound`.
    pub async fn user_by_email(&self, email: &str) -> ResultEngine<User> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
            .map(User::from)
            .ok_or_else(|| EngineError::KeyNotFound(format!("user {email}")))
    }

    /// Insert a new user. Both id and email must be unused.
    pub async fn create_user(&self, user: &User) -> ResultEngine<User> {
        if user.id.trim().is_empty() || user.email.trim().is_empty() {
            return Err(EngineError::InvalidInput(
                "user id and email are required".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let taken = users::Entity::find()
                .filter(
                    Condition::any()
                        .add(users::Column::Id.eq(user.id.clone()))
                        .add(users::Column::Email.eq(user.email.clone())),
                )
                .one(&db_tx)
                .await?;
            if taken.is_some() {
                return Err(EngineError::ExistingKey(user.email.clone()));
            }
            let model = users::ActiveModel::from(user).insert(&db_tx).await?;
            Ok(User::from(model))
        })
    }

    /// Create or refresh a user from the identity provider, keyed by email.
    ///
    /// An existing record keeps its id; only the display name (and the avatar,
    /// when one is provided) is refreshed.
    pub async fn sync_user(&self, cmd: SyncUserCmd) -> ResultEngine<User> {
        cmd.validate()?;
        let email = cmd.email.trim().to_string();
        let name = cmd.display_name();
        let avatar_url = normalize_optional_text(cmd.metadata.avatar_url.as_deref());

        let user = with_tx!(self, |db_tx| {
            let existing = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?;

            match existing {
                Some(model) => {
                    let mut active: users::ActiveModel = model.into();
                    active.name = ActiveValue::Set(name.clone());
                    if let Some(url) = avatar_url.clone() {
                        active.avatar_url = ActiveValue::Set(Some(url));
                    }
                    let model = active.update(&db_tx).await?;
                    Ok::<_, EngineError>(User::from(model))
                }
                None => {
                    let id = cmd.id.trim().to_string();
                    if users::Entity::find_by_id(id.clone())
                        .one(&db_tx)
                        .await?
                        .is_some()
                    {
                        return Err(EngineError::ExistingKey(format!("user {id}")));
                    }
                    let user = User {
                        id,
                        email: email.clone(),
                        name: name.clone(),
                        avatar_url: avatar_url.clone(),
                        google_id: cmd.google_id(),
                    };
                    let model = users::ActiveModel::from(&user).insert(&db_tx).await?;
                    Ok::<_, EngineError>(User::from(model))
                }
            }
        })?;

        tracing::info!("user {} synchronized", user.email);
        Ok(user)
    }
}
