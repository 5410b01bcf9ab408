use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

pub const JSONRPC_VERSION: &str = "2.0";
pub const REQUEST_ID: u64 = 1;

/// JSON-RPC error code the upstream uses to signal throttling.
pub const THROTTLED_CODE: i64 = 429;

#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: &'a [Value],
}

impl<'a> JsonRpcRequest<'a> {
    pub fn new(method: &'a str, params: &'a [Value]) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: REQUEST_ID,
            method,
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    /// Some nodes omit the code; such errors are kept as code 0.
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Raw `Retry-After` header value seen alongside a 429 status. Set locally,
    /// never part of the upstream payload.
    #[serde(skip)]
    pub retry_after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    /// `Some(Null)` for an explicit `"result": null`, `None` when absent.
    #[serde(default, deserialize_with = "present")]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// A decoded JSON-RPC response: either a result payload or an error object.
///
/// An envelope carrying neither is rejected at decode time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawEnvelope")]
pub enum RpcResponse {
    Success(Value),
    Failure(RpcErrorObject),
}

impl TryFrom<RawEnvelope> for RpcResponse {
    type Error = String;

    fn try_from(raw: RawEnvelope) -> Result<Self, Self::Error> {
        match (raw.error, raw.result) {
            (Some(error), _) => Ok(RpcResponse::Failure(error)),
            (None, Some(result)) => Ok(RpcResponse::Success(result)),
            (None, None) => Err("response has neither result nor error".to_string()),
        }
    }
}

impl RpcResponse {
    pub fn error(&self) -> Option<&RpcErrorObject> {
        match self {
            RpcResponse::Success(_) => None,
            RpcResponse::Failure(error) => Some(error),
        }
    }

    pub fn is_throttled(&self) -> bool {
        self.error().is_some_and(|e| e.code == THROTTLED_CODE)
    }

    /// Attaches the raw `Retry-After` value to the error object, if there is one.
    pub fn annotate_retry_after(&mut self, retry_after: &str) {
        if let RpcResponse::Failure(error) = self {
            error.retry_after = Some(retry_after.to_string());
        }
    }
}

/// `{ "context": ..., "value": T }` wrapper used by most account-level methods.
#[derive(Debug, Deserialize)]
pub(crate) struct WithContext<T> {
    pub value: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EpochInfo {
    pub epoch: u64,
    pub slot_index: u64,
    pub slots_in_epoch: u64,
    #[serde(default)]
    pub absolute_slot: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_height: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VoteAccounts {
    pub current: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSample {
    #[serde(default)]
    pub slot: u64,
    pub num_transactions: u64,
    #[serde(default)]
    pub num_slots: u64,
    pub sample_period_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_non_vote_transactions: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UiAccount {
    #[serde(default)]
    pub lamports: u64,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub executable: bool,
    #[serde(default)]
    pub rent_epoch: u64,
    #[serde(default)]
    pub data: Value,
}

impl UiAccount {
    /// Length of the encoded account data, taken from the first element of `[data, encoding]`.
    pub fn data_length(&self) -> usize {
        self.data
            .as_array()
            .and_then(|parts| parts.first())
            .and_then(Value::as_str)
            .map(str::len)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub address: String,
    pub balance: f64,
    pub executable: bool,
    pub owner: String,
    pub rent_epoch: u64,
    pub lamports: u64,
    pub data_length: usize,
    pub is_valid: bool,
}

impl AccountInfo {
    /// Result for an address the upstream has no usable record for.
    pub fn invalid(address: &str) -> Self {
        Self {
            address: address.to_string(),
            balance: 0.0,
            executable: false,
            owner: String::new(),
            rent_epoch: 0,
            lamports: 0,
            data_length: 0,
            is_valid: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UiTokenAmount {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub mint_address: String,
    pub supply: u64,
    pub decimals: u8,
    pub is_initialized: bool,
    pub freeze_authority: Option<String>,
    pub mint_authority: Option<String>,
    pub is_valid: bool,
    pub actual_supply: f64,
}

impl TokenInfo {
    pub fn invalid(mint_address: &str) -> Self {
        Self {
            mint_address: mint_address.to_string(),
            supply: 0,
            decimals: 0,
            is_initialized: false,
            freeze_authority: None,
            mint_authority: None,
            is_valid: false,
            actual_supply: 0.0,
        }
    }
}

/// One entry of `getTokenLargestAccounts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenHolderBalance {
    pub address: String,
    pub amount: String,
    pub decimals: u8,
    pub ui_amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TokenHolder {
    pub address: String,
    pub balance: TokenHolderBalance,
}

impl From<TokenHolderBalance> for TokenHolder {
    fn from(balance: TokenHolderBalance) -> Self {
        Self {
            address: balance.address.clone(),
            balance,
        }
    }
}
