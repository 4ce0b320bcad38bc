use std::collections::HashSet;

use sea_orm::{QueryFilter, TransactionTrait, prelude::*, sea_query::Expr};

use crate::{
    EngineError, MoneyCents, ResultEngine, Split, SplitCmd, SplitOutcome, Transaction,
    even_share, splits, transactions, users,
};

use super::{Engine, with_tx};

impl Engine {
    /// Split a transaction evenly between its owner and `cmd.friend_ids`.
    ///
    /// Everything happens in one DB transaction: the owner check, the
    /// conditional `issplit` false -> true flip and one split row per friend.
    /// A transaction that is already split is rejected with `AlreadySplit` and
    /// nothing is written, so repeated or concurrent calls cannot duplicate
    /// the rows.
    pub async fn split_transaction(&self, cmd: SplitCmd) -> ResultEngine<SplitOutcome> {
        cmd.validate()?;
        let tx_id = cmd.transaction_id.to_string();

        let outcome = with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(tx_id.clone())
                .one(&db_tx)
                .await?
                .filter(|m| m.user_id == cmd.user_id)
                .ok_or_else(|| EngineError::KeyNotFound(format!("transaction {tx_id}")))?;
            let mut transaction = Transaction::try_from(model)?;

            let known: HashSet<String> = users::Entity::find()
                .filter(users::Column::Id.is_in(cmd.friend_ids.clone()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|m| m.id)
                .collect();
            if let Some(missing) = cmd.friend_ids.iter().find(|id| !known.contains(*id)) {
                return Err(EngineError::KeyNotFound(format!("user {missing}")));
            }

            let share = even_share(
                MoneyCents::new(transaction.amount_minor),
                cmd.friend_ids.len(),
            )?;

            let flipped = transactions::Entity::update_many()
                .col_expr(transactions::Column::Issplit, Expr::value(true))
                .filter(transactions::Column::Id.eq(tx_id.clone()))
                .filter(transactions::Column::Issplit.eq(false))
                .exec(&db_tx)
                .await?;
            if flipped.rows_affected == 0 {
                return Err(EngineError::AlreadySplit(tx_id));
            }
            transaction.issplit = true;

            let mut rows = Vec::with_capacity(cmd.friend_ids.len());
            for friend_id in &cmd.friend_ids {
                let split = Split::new(transaction.id, friend_id.clone(), share.cents());
                splits::ActiveModel::from(&split).insert(&db_tx).await?;
                rows.push(split);
            }

            Ok::<_, EngineError>(SplitOutcome {
                transaction,
                splits: rows,
            })
        })?;

        tracing::info!(
            "transaction {} split with {} friend(s), {} each",
            outcome.transaction.id,
            outcome.splits.len(),
            MoneyCents::new(outcome.splits.first().map_or(0, |s| s.amount_minor))
        );
        Ok(outcome)
    }
}
