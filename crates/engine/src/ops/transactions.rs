use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sea_orm::{
    Condition, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Query,
};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, NewTransactionCmd, ResultEngine, Split, SplitDetail, Transaction,
    TransactionDetail, User, splits, transactions, users, util::normalize_optional_text,
};

use super::{Engine, with_tx};

/// Filters for listing transactions.
///
/// Every bound is inclusive. Absent fields do not filter.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub issplit: Option<bool>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub min_amount: Option<MoneyCents>,
    pub max_amount: Option<MoneyCents>,
}

fn validate_list_filter(filter: &TransactionListFilter) -> ResultEngine<()> {
    if let (Some(start), Some(end)) = (filter.start, filter.end)
        && start > end
    {
        return Err(EngineError::InvalidInput(
            "invalid range: startDate must be <= endDate".to_string(),
        ));
    }
    if let (Some(min), Some(max)) = (filter.min_amount, filter.max_amount)
        && min > max
    {
        return Err(EngineError::InvalidInput(
            "invalid range: minAmount must be <= maxAmount".to_string(),
        ));
    }
    Ok(())
}

trait ApplyTxFilters: QueryFilter + Sized {
    fn apply_tx_filters(self, filter: &TransactionListFilter) -> Self;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_tx_filters(mut self, filter: &TransactionListFilter) -> Self {
        if let Some(issplit) = filter.issplit {
            self = self.filter(transactions::Column::Issplit.eq(issplit));
        }
        if let Some(start) = filter.start {
            self = self.filter(transactions::Column::Date.gte(start));
        }
        if let Some(end) = filter.end {
            self = self.filter(transactions::Column::Date.lte(end));
        }
        if let Some(min) = filter.min_amount {
            self = self.filter(transactions::Column::AmountMinor.gte(min.cents()));
        }
        if let Some(max) = filter.max_amount {
            self = self.filter(transactions::Column::AmountMinor.lte(max.cents()));
        }
        self
    }
}

impl Engine {
    /// Create a transaction owned by an existing user.
    pub async fn new_transaction(&self, cmd: NewTransactionCmd) -> ResultEngine<Uuid> {
        let description = normalize_optional_text(Some(&cmd.description)).ok_or_else(|| {
            EngineError::InvalidInput("description must not be empty".to_string())
        })?;
        let tx = Transaction::new(cmd.user_id, cmd.amount_minor, description, cmd.date)?;

        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(tx.user_id.clone())
                .one(&db_tx)
                .await?
                .is_none()
            {
                return Err(EngineError::KeyNotFound(format!("user {}", tx.user_id)));
            }
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            Ok::<_, EngineError>(())
        })?;

        Ok(tx.id)
    }

    /// Return a transaction by id.
    pub async fn transaction(&self, transaction_id: Uuid) -> ResultEngine<Transaction> {
        transactions::Entity::find_by_id(transaction_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("transaction {transaction_id}")))?
            .try_into()
    }

    /// Return the split rows recorded for a transaction.
    pub async fn splits_for_transaction(&self, transaction_id: Uuid) -> ResultEngine<Vec<Split>> {
        splits::Entity::find()
            .filter(splits::Column::TransactionId.eq(transaction_id.to_string()))
            .order_by_asc(splits::Column::UserId)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Split::try_from)
            .collect()
    }

    /// Lists the transactions visible to `user_id`, newest first.
    ///
    /// A transaction is visible when the user owns it or takes part in one of
    /// its splits. Each result embeds its owner and its splits with their
    /// participants.
    pub async fn list_transactions(
        &self,
        user_id: &str,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<TransactionDetail>> {
        validate_list_filter(filter)?;

        let participating = Query::select()
            .column(splits::Column::TransactionId)
            .from(splits::Entity)
            .and_where(splits::Column::UserId.eq(user_id))
            .to_owned();
        let visible = Condition::any()
            .add(transactions::Column::UserId.eq(user_id))
            .add(transactions::Column::Id.in_subquery(participating));

        let txs = transactions::Entity::find()
            .filter(visible)
            .apply_tx_filters(filter)
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        if txs.is_empty() {
            return Ok(Vec::new());
        }

        let tx_ids: Vec<String> = txs.iter().map(|tx| tx.id.to_string()).collect();
        let split_rows = splits::Entity::find()
            .filter(splits::Column::TransactionId.is_in(tx_ids))
            .order_by_asc(splits::Column::UserId)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Split::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        let user_ids: HashSet<String> = txs
            .iter()
            .map(|tx| tx.user_id.clone())
            .chain(split_rows.iter().map(|s| s.user_id.clone()))
            .collect();
        let people: HashMap<String, User> = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|m| (m.id.clone(), User::from(m)))
            .collect();
        let person = |id: &str| {
            people
                .get(id)
                .cloned()
                .ok_or_else(|| EngineError::KeyNotFound(format!("user {id}")))
        };

        let mut by_tx: HashMap<Uuid, Vec<SplitDetail>> = HashMap::new();
        for split in split_rows {
            let user = person(&split.user_id)?;
            by_tx
                .entry(split.transaction_id)
                .or_default()
                .push(SplitDetail { split, user });
        }

        txs.into_iter()
            .map(|transaction| {
                Ok(TransactionDetail {
                    owner: person(&transaction.user_id)?,
                    splits: by_tx.remove(&transaction.id).unwrap_or_default(),
                    transaction,
                })
            })
            .collect()
    }
}
