//! Storage and domain logic for SplitEase.
//!
//! The [`Engine`] owns the database handle and exposes every operation the
//! server needs: resolving users, listing friends, listing the transactions
//! visible to a user and splitting a transaction among friends.

pub use commands::{NewTransactionCmd, SplitCmd, SyncUserCmd, UserMetadata};
pub use error::EngineError;
pub use money::{MoneyCents, Rounding};
pub use ops::{Engine, EngineBuilder, TransactionListFilter};
pub use splits::{Split, SplitDetail, SplitOutcome, even_share};
pub use transactions::{Transaction, TransactionDetail};
pub use users::User;
pub use util::parse_datetime;

mod commands;
mod error;
mod friends;
mod money;
mod ops;
mod splits;
mod transactions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
