use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{UpstreamError, base_url, status_error};

/// Expense sent to the mirror. The mirror splits it equally among the
/// members of its group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MirrorExpense {
    /// Decimal amount, e.g. `300.00`.
    pub cost: String,
    pub description: String,
    pub date: DateTime<Utc>,
}

/// A friend known to the mirror service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MirrorFriend {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

#[async_trait]
pub trait ExpenseMirror: Send + Sync {
    /// Records the expense and returns the service's raw answer.
    async fn create_expense(&self, expense: &MirrorExpense) -> Result<Value, UpstreamError>;

    async fn friends(&self) -> Result<Vec<MirrorFriend>, UpstreamError>;
}

#[derive(Debug, Serialize)]
struct CreateExpenseBody<'a> {
    cost: &'a str,
    description: &'a str,
    date: String,
    group_id: i64,
    split_equally: bool,
    currency_code: &'a str,
}

#[derive(Debug, Deserialize)]
struct FriendsBody {
    #[serde(default)]
    friends: Vec<FriendRow>,
}

#[derive(Debug, Deserialize)]
struct FriendRow {
    id: i64,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    picture: Option<Picture>,
}

#[derive(Debug, Deserialize)]
struct Picture {
    #[serde(default)]
    medium: Option<String>,
}

impl From<FriendRow> for MirrorFriend {
    fn from(row: FriendRow) -> Self {
        let name = [row.first_name, row.last_name]
            .into_iter()
            .flatten()
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            id: row.id,
            name,
            email: row.email,
            avatar_url: row.picture.and_then(|p| p.medium),
        }
    }
}

/// Splitwise API v3 client.
#[derive(Debug, Clone)]
pub struct SplitwiseClient {
    base_url: Url,
    api_key: String,
    group_id: i64,
    currency_code: String,
    http: reqwest::Client,
}

impl SplitwiseClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        group_id: i64,
        currency_code: impl Into<String>,
    ) -> Result<Self, UpstreamError> {
        Ok(Self {
            base_url: crate::base_url(base_url)?,
            api_key: api_key.into(),
            group_id,
            currency_code: currency_code.into(),
            http: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, UpstreamError> {
        self.base_url
            .join(path)
            .map_err(|err| UpstreamError::InvalidUrl(err.to_string()))
    }
}

/// Splitwise answers 200 with a non-empty `errors` member on rejected input.
fn reported_errors(body: &Value) -> Option<String> {
    let errors = body.get("errors")?;
    let empty = match errors {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    };
    (!empty).then(|| errors.to_string())
}

#[async_trait]
impl ExpenseMirror for SplitwiseClient {
    async fn create_expense(&self, expense: &MirrorExpense) -> Result<Value, UpstreamError> {
        let payload = CreateExpenseBody {
            cost: &expense.cost,
            description: &expense.description,
            date: expense.date.to_rfc3339_opts(SecondsFormat::Secs, true),
            group_id: self.group_id,
            split_equally: true,
            currency_code: &self.currency_code,
        };

        let res = self
            .http
            .post(self.endpoint("create_expense")?)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(status_error(res).await);
        }

        let status = res.status().as_u16();
        let body = res
            .json::<Value>()
            .await
            .map_err(|err| UpstreamError::InvalidResponse(err.to_string()))?;
        if let Some(message) = reported_errors(&body) {
            return Err(UpstreamError::Status { status, message });
        }
        tracing::info!(description = %expense.description, cost = %expense.cost, "expense mirrored");
        Ok(body)
    }

    async fn friends(&self) -> Result<Vec<MirrorFriend>, UpstreamError> {
        let res = self
            .http
            .get(self.endpoint("get_friends")?)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(status_error(res).await);
        }

        let body = res
            .json::<FriendsBody>()
            .await
            .map_err(|err| UpstreamError::InvalidResponse(err.to_string()))?;
        Ok(body.friends.into_iter().map(MirrorFriend::from).collect())
    }
}
