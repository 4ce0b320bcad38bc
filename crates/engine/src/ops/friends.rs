use sea_orm::{
    ActiveValue, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    TransactionTrait, prelude::*,
};

use crate::{EngineError, ResultEngine, User, friends, users};

use super::{Engine, with_tx};

impl Engine {
    /// Users that `user_id` considers friends, ordered by name.
    pub async fn friends(&self, user_id: &str) -> ResultEngine<Vec<User>> {
        let models = users::Entity::find()
            .join_rev(JoinType::InnerJoin, friends::Relation::Friend.def())
            .filter(friends::Column::UserId.eq(user_id))
            .order_by_asc(users::Column::Name)
            .order_by_asc(users::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(User::from).collect())
    }

    /// Add the directed edge `user_id -> friend_id`.
    pub async fn add_friend(&self, user_id: &str, friend_id: &str) -> ResultEngine<()> {
        if user_id == friend_id {
            return Err(EngineError::InvalidInput(
                "a user cannot befriend themselves".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            for id in [user_id, friend_id] {
                if users::Entity::find_by_id(id.to_string())
                    .one(&db_tx)
                    .await?
                    .is_none()
                {
                    return Err(EngineError::KeyNotFound(format!("user {id}")));
                }
            }

            if friends::Entity::find_by_id((user_id.to_string(), friend_id.to_string()))
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(format!(
                    "friend {user_id} -> {friend_id}"
                )));
            }

            friends::ActiveModel {
                user_id: ActiveValue::Set(user_id.to_string()),
                friend_id: ActiveValue::Set(friend_id.to_string()),
            }
            .insert(&db_tx)
            .await?;
            Ok(())
        })
    }
}
