//! JSON bodies exchanged with the SplitEase REST API.
//!
//! Field names are camelCase on the wire, except the user profile columns
//! `avatar_url` and `google_id`. Money is a decimal number with two
//! fractional digits (`amount`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use uuid::Uuid;

/// Money amount held as integer cents and written as a JSON number with
/// exactly two decimals (`300.00`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Amount(pub i64);

impl Amount {
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::Error;

        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let literal = format!("{sign}{}.{:02}", abs / 100, abs % 100);
        RawValue::from_string(literal)
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let value = f64::deserialize(deserializer)?;
        if !value.is_finite() {
            return Err(D::Error::custom("amount must be a finite number"));
        }
        Ok(Self((value * 100.0).round() as i64))
    }
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub mod user {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserView {
        pub id: String,
        pub email: String,
        pub name: String,
        #[serde(rename = "avatar_url")]
        pub avatar_url: Option<String>,
        #[serde(rename = "google_id")]
        pub google_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MeResponse {
        pub user: UserView,
    }
}

pub mod friend {
    use super::*;

    /// A friend as shown to the client. Friends coming from the expense
    /// mirror carry a `splitwise:` id prefix.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FriendView {
        pub id: String,
        pub name: String,
        pub email: Option<String>,
        #[serde(rename = "avatar_url")]
        pub avatar_url: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FriendsResponse {
        pub friends: Vec<FriendView>,
    }
}

pub mod transaction {
    use super::*;
    use crate::user::UserView;

    /// Query string of `GET /api/transactions`.
    ///
    /// Values are kept as raw strings and validated by the server.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionListQuery {
        pub issplit: Option<String>,
        /// RFC3339 timestamp or `YYYY-MM-DD`, inclusive.
        pub start_date: Option<String>,
        /// RFC3339 timestamp or `YYYY-MM-DD`, inclusive.
        pub end_date: Option<String>,
        /// Decimal number, inclusive; rounded up to the cent.
        pub min_amount: Option<String>,
        /// Decimal number, inclusive; rounded down to the cent.
        pub max_amount: Option<String>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SplitView {
        pub id: Uuid,
        pub transaction_id: Uuid,
        pub user_id: String,
        pub amount: Amount,
        /// Participant, embedded in transaction listings only.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub user: Option<UserView>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionView {
        pub id: Uuid,
        pub amount: Amount,
        pub description: String,
        pub date: DateTime<Utc>,
        pub user_id: String,
        pub issplit: bool,
        pub user: UserView,
        pub splits: Vec<SplitView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionsResponse {
        pub transactions: Vec<TransactionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SplitRequest {
        pub transaction_id: Uuid,
        pub friend_ids: Vec<String>,
    }

    /// Response of `POST /api/transactions/split`.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum SplitResponse {
        /// The split was also recorded in the expense mirror.
        #[serde(rename_all = "camelCase")]
        Mirrored {
            message: String,
            splits: Vec<SplitView>,
            splitwise_data: serde_json::Value,
        },
        Recorded { splits: Vec<SplitView> },
    }
}

pub mod sync {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SyncMetadata {
        pub full_name: Option<String>,
        pub name: Option<String>,
        pub avatar_url: Option<String>,
        pub provider: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SyncUserRequest {
        pub id: String,
        pub email: String,
        #[serde(default)]
        pub metadata: Option<SyncMetadata>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SyncUserResponse {
        pub success: bool,
        pub user_id: String,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{transaction::SplitView, user::UserView};

    #[test]
    fn amount_is_a_two_decimal_number() {
        assert_eq!(serde_json::to_string(&Amount(30000)).unwrap(), "300.00");
        assert_eq!(serde_json::to_string(&Amount(3333)).unwrap(), "33.33");
        assert_eq!(serde_json::to_string(&Amount(-5)).unwrap(), "-0.05");
        assert_eq!(serde_json::from_str::<Amount>("100.5").unwrap(), Amount(10050));
        assert_eq!(serde_json::from_str::<Amount>("12").unwrap(), Amount(1200));
    }

    #[test]
    fn split_view_carries_decimal_amount() {
        let split = SplitView {
            id: Uuid::nil(),
            transaction_id: Uuid::nil(),
            user_id: "bob".to_string(),
            amount: Amount(10000),
            user: None,
        };
        let text = serde_json::to_string(&split).unwrap();
        assert!(text.contains(r#""amount":100.00"#), "{text}");
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["amount"], json!(100.0));
        assert_eq!(value["userId"], "bob");
        assert!(value.get("amountMinor").is_none());
    }

    #[test]
    fn user_profile_columns_keep_snake_case() {
        let user = UserView {
            id: "u1".to_string(),
            email: "a@b.c".to_string(),
            name: "A".to_string(),
            avatar_url: Some("https://img".to_string()),
            google_id: None,
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["avatar_url"], "https://img");
        assert!(value.get("avatarUrl").is_none());
        assert!(value.as_object().unwrap().contains_key("google_id"));
    }
}
