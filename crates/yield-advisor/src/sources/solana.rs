//! Solana JSON-RPC balance client.
//!
//! Reads native SOL plus the known SPL stablecoin mints for a wallet. Token
//! accounts are fetched with `jsonParsed` encoding so amounts come back as
//! plain strings and no account decoding is needed.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{BalanceSource, SourceError};
use crate::error::{AdvisorError, Result};
use crate::model::{Asset, TokenBalance, WalletBalances};

const SOL_DECIMALS: u32 = 9;
const UI_DECIMAL_PLACES: u32 = 4;

/// An SPL token the client knows how to read
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenMint {
    pub asset: Asset,
    pub mint: String,
    pub decimals: u32,
}

impl TokenMint {
    pub fn new(asset: Asset, mint: impl Into<String>, decimals: u32) -> Self {
        Self {
            asset,
            mint: mint.into(),
            decimals,
        }
    }

    /// Devnet stablecoin mints
    pub fn devnet() -> Vec<Self> {
        vec![
            Self::new(Asset::Usdc, "Gh9ZwEmdLJ8DscKNTkTqPbNwLNNBjuSzaG9Vp2KGtKJr", 6),
            Self::new(Asset::Usdt, "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB", 6),
        ]
    }
}

pub struct SolanaBalanceClient {
    client: reqwest::Client,
    rpc_url: String,
    mints: Vec<TokenMint>,
}

impl SolanaBalanceClient {
    pub fn new(rpc_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdvisorError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            rpc_url: rpc_url.into(),
            mints: TokenMint::devnet(),
        })
    }

    async fn rpc_call(&self, method: &str, params: Value) -> std::result::Result<Value, SourceError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Server { status: status.as_u16() });
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        match (body.result, body.error) {
            (_, Some(err)) => Err(SourceError::Decode(format!(
                "{method} failed ({}): {}",
                err.code, err.message
            ))),
            (Some(result), None) => Ok(result),
            (None, None) => Err(SourceError::Decode(format!("{method} returned no result"))),
        }
    }

    async fn sol_balance(&self, wallet: &str) -> std::result::Result<TokenBalance, SourceError> {
        let result = self.rpc_call("getBalance", json!([wallet])).await?;
        let lamports = parse_lamports(&result)
            .ok_or_else(|| SourceError::Decode("getBalance value is not a number".into()))?;

        Ok(TokenBalance {
            token_symbol: Asset::Sol.symbol().into(),
            amount_ui: ui_amount(lamports, SOL_DECIMALS),
            amount_raw: Some(lamports.to_string()),
            token_mint: None,
        })
    }

    async fn spl_balance(
        &self,
        wallet: &str,
        token: &TokenMint,
    ) -> std::result::Result<Option<TokenBalance>, SourceError> {
        let result = self
            .rpc_call(
                "getTokenAccountsByOwner",
                json!([
                    wallet,
                    { "mint": token.mint },
                    { "encoding": "jsonParsed", "commitment": "confirmed" }
                ]),
            )
            .await?;

        let raw = sum_token_amounts(&result);
        if raw == 0 {
            tracing::debug!(token = %token.asset, "No non-zero balance");
            return Ok(None);
        }

        Ok(Some(TokenBalance {
            token_symbol: token.asset.symbol().into(),
            amount_ui: ui_amount(raw, token.decimals),
            amount_raw: Some(raw.to_string()),
            token_mint: Some(token.mint.clone()),
        }))
    }
}

#[async_trait]
impl BalanceSource for SolanaBalanceClient {
    async fn fetch_balances(
        &self,
        wallet: &str,
    ) -> std::result::Result<Option<WalletBalances>, SourceError> {
        let wallet = wallet.trim();
        validate_address(wallet)?;

        tracing::info!(wallet = %wallet, "Fetching wallet balances");

        // Reachability first, so an unreachable node is one error rather than
        // a wallet full of skipped tokens
        self.rpc_call("getHealth", json!([])).await.map_err(|e| {
            tracing::error!(rpc_url = %self.rpc_url, "Solana RPC unreachable: {}", e);
            e
        })?;

        let (sol, tokens) = tokio::join!(
            self.sol_balance(wallet),
            join_all(self.mints.iter().map(|mint| self.spl_balance(wallet, mint)))
        );

        let tokens: Vec<_> = self.mints.iter().map(|mint| mint.asset).zip(tokens).collect();
        let Some(balances) = merge_balances(sol, tokens) else {
            return Ok(None);
        };

        Ok(Some(WalletBalances {
            wallet_address: wallet.to_string(),
            balances,
        }))
    }
}

/// Combine the individual reads. SOL is kept even at zero; SPL reads arrive
/// with zero balances already dropped. `None` when no read succeeded.
fn merge_balances(
    sol: std::result::Result<TokenBalance, SourceError>,
    tokens: Vec<(Asset, std::result::Result<Option<TokenBalance>, SourceError>)>,
) -> Option<Vec<TokenBalance>> {
    let mut balances = Vec::new();
    let mut reads = 0usize;

    match sol {
        Ok(balance) => {
            reads += 1;
            balances.push(balance);
        }
        Err(e) => tracing::warn!("Skipping SOL balance: {}", e),
    }

    for (asset, outcome) in tokens {
        match outcome {
            Ok(balance) => {
                reads += 1;
                balances.extend(balance);
            }
            Err(e) => tracing::warn!(token = %asset, "Skipping token balance: {}", e),
        }
    }

    (reads > 0).then_some(balances)
}

/// A Solana address is base58 for exactly 32 bytes.
pub(crate) fn validate_address(wallet: &str) -> std::result::Result<(), SourceError> {
    match bs58::decode(wallet).into_vec() {
        Ok(bytes) if bytes.len() == 32 => Ok(()),
        Ok(bytes) => Err(SourceError::MalformedAddress(format!(
            "expected 32 bytes, got {}",
            bytes.len()
        ))),
        Err(e) => Err(SourceError::MalformedAddress(e.to_string())),
    }
}

fn ui_amount(raw: u64, decimals: u32) -> Decimal {
    Decimal::from_i128_with_scale(i128::from(raw), decimals).round_dp(UI_DECIMAL_PLACES)
}

fn parse_lamports(result: &Value) -> Option<u64> {
    result.get("value").and_then(Value::as_u64)
}

/// Sum `tokenAmount.amount` over every parsed token account. Accounts with
/// unreadable amounts are ignored.
fn sum_token_amounts(result: &Value) -> u64 {
    result
        .get("value")
        .and_then(Value::as_array)
        .map(|accounts| {
            accounts
                .iter()
                .filter_map(|acc| {
                    acc.pointer("/account/data/parsed/info/tokenAmount/amount")
                        .and_then(Value::as_str)
                        .and_then(|amount| amount.parse::<u64>().ok())
                })
                .fold(0u64, u64::saturating_add)
        })
        .unwrap_or(0)
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}
