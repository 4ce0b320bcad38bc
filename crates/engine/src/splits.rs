//! Split rows and the even-share arithmetic.
//!
//! A split records what one participating friend owes on a transaction. The
//! owner's own share is never stored: it is whatever remains after the
//! friends' shares are taken out.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, Transaction, User, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub user_id: String,
    pub amount_minor: i64,
}

impl Split {
    pub fn new(transaction_id: Uuid, user_id: String, amount_minor: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            transaction_id,
            user_id,
            amount_minor,
        }
    }
}

/// A split together with its participant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitDetail {
    pub split: Split,
    pub user: User,
}

/// Result of splitting a transaction: the updated transaction and the rows
/// written for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitOutcome {
    pub transaction: Transaction,
    pub splits: Vec<Split>,
}

/// Per-friend share of `amount` when it is divided evenly between
/// `friends` friends and the owner.
///
/// The division is done in cents and truncates; the owner's implicit share
/// absorbs the remainder.
///
/// ```rust
/// use engine::{MoneyCents, even_share};
///
/// assert_eq!(even_share(MoneyCents::new(30000), 2).unwrap(), MoneyCents::new(10000));
/// assert_eq!(even_share(MoneyCents::new(10000), 2).unwrap(), MoneyCents::new(3333));
/// ```
pub fn even_share(amount: MoneyCents, friends: usize) -> ResultEngine<MoneyCents> {
    if friends == 0 {
        return Err(EngineError::InvalidInput(
            "friendIds must not be empty".to_string(),
        ));
    }
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount(
            "amount_minor must be > 0".to_string(),
        ));
    }
    let participants = i64::try_from(friends)
        .ok()
        .and_then(|n| n.checked_add(1))
        .ok_or_else(|| EngineError::InvalidInput("too many friends".to_string()))?;
    Ok(MoneyCents::new(amount.cents() / participants))
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "splits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub transaction_id: String,
    pub user_id: String,
    pub amount_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id"
    )]
    Transaction,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Split> for ActiveModel {
    fn from(split: &Split) -> Self {
        Self {
            id: ActiveValue::Set(split.id.to_string()),
            transaction_id: ActiveValue::Set(split.transaction_id.to_string()),
            user_id: ActiveValue::Set(split.user_id.clone()),
            amount_minor: ActiveValue::Set(split.amount_minor),
        }
    }
}

impl TryFrom<Model> for Split {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "split")?,
            transaction_id: parse_uuid(&model.transaction_id, "transaction")?,
            user_id: model.user_id,
            amount_minor: model.amount_minor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_divides_evenly_including_owner() {
        let share = even_share(MoneyCents::new(300_00), 2).unwrap();
        assert_eq!(share, MoneyCents::new(100_00));
    }

    #[test]
    fn share_truncates_and_owner_keeps_remainder() {
        let amount = MoneyCents::new(100_00);
        let share = even_share(amount, 2).unwrap();
        assert_eq!(share, MoneyCents::new(33_33));
        assert_eq!(amount.cents() - 2 * share.cents(), 33_34);
    }

    #[test]
    fn single_friend_takes_half() {
        assert_eq!(
            even_share(MoneyCents::new(150_00), 1).unwrap(),
            MoneyCents::new(75_00)
        );
    }

    #[test]
    fn share_rejects_no_friends() {
        assert!(matches!(
            even_share(MoneyCents::new(100), 0),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn share_rejects_non_positive_amount() {
        assert!(matches!(
            even_share(MoneyCents::ZERO, 3),
            Err(EngineError::InvalidAmount(_))
        ));
    }
}
