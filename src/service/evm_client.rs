//! EVM链客户端
//!
//! 面向所有EVM兼容网络的链上交互：余额/nonce/gas查询、原生币转账、
//! ERC-20读写、交易回执轮询。JSON-RPC直接走HTTP，不经过Provider中间层。
//! 每个网络一个持久连接句柄，按网络id懒创建并缓存。

use std::{collections::HashMap, sync::Arc, time::Duration};

use ethers::{
    signers::{LocalWallet, Signer},
    types::{transaction::eip2718::TypedTransaction, Address, TransactionRequest, U256},
};
use serde::Serialize;
use serde_json::json;
use tokio::sync::RwLock;

use crate::{
    domain::{keypair, network::Network, token::TokenRecord, wallet::ChainFamily},
    error::ChainError,
    infrastructure::log_redact,
    metrics,
    utils::{abi, address_validator::AddressValidator, amount},
};

/// 原生币精度
const NATIVE_DECIMALS: u32 = 18;
/// 简单转账的默认gas限额
pub const DEFAULT_NATIVE_GAS_LIMIT: u64 = 21_000;
/// 代币转账的默认gas限额
pub const DEFAULT_TOKEN_GAS_LIMIT: u64 = 100_000;
/// 回执轮询默认等待上限（秒）
pub const DEFAULT_CONFIRMATION_WAIT_SECS: u64 = 60;
/// 回执轮询间隔（毫秒）
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// 余额查询结果
#[derive(Debug, Clone, Serialize)]
pub struct BalanceInfo {
    /// 最小单位余额
    pub wei: U256,
    /// 按18位小数换算后的可读金额
    pub formatted: String,
    pub symbol: String,
}

/// 广播结果
#[derive(Debug, Clone, Serialize)]
pub struct BroadcastOutcome {
    pub tx_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
}

/// 回执轮询结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConfirmationOutcome {
    Confirmed {
        block_number: u64,
        gas_used: u64,
        /// 链上status标志是否为成功
        success: bool,
    },
    /// 等待窗口内没有出现回执；交易之后仍可能上链
    Timeout,
}

/// ERC-20元数据
#[derive(Debug, Clone, Serialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
}

/// ERC-20余额
#[derive(Debug, Clone, Serialize)]
pub struct TokenBalance {
    pub raw: U256,
    pub formatted: String,
}

/// 原生币转账请求
#[derive(Clone)]
pub struct NativeTransferRequest {
    pub from: String,
    pub to: String,
    /// 十进制金额（原生币单位）
    pub amount: String,
    /// hex私钥，仅在签名期间使用
    pub private_key: String,
    pub gas_limit: Option<u64>,
    pub gas_price: Option<U256>,
    pub nonce: Option<U256>,
}

impl std::fmt::Debug for NativeTransferRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeTransferRequest")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("amount", &self.amount)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// 代币转账请求
#[derive(Clone)]
pub struct TokenTransferRequest {
    pub contract: String,
    pub to: String,
    /// 十进制金额（代币单位）
    pub amount: String,
    pub decimals: u32,
    /// hex私钥，仅在签名期间使用
    pub private_key: String,
    pub gas_limit: Option<u64>,
    pub gas_price: Option<U256>,
}

impl std::fmt::Debug for TokenTransferRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenTransferRequest")
            .field("contract", &self.contract)
            .field("to", &self.to)
            .field("amount", &self.amount)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// 单个网络的持久连接句柄
struct EvmConnection {
    http: reqwest::Client,
    rpc_url: String,
}

impl EvmConnection {
    fn new(network: &Network) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            rpc_url: network.rpc_url.clone(),
        }
    }

    /// JSON-RPC调用，返回result字段（可能为null）
    async fn rpc_call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ChainError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1,
        });

        let response = self
            .http
            .post(&self.rpc_url)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                metrics::count_err("evm_rpc");
                ChainError::transport(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            metrics::count_err("evm_rpc");
            ChainError::transport(e)
        })?;

        if !status.is_success() {
            metrics::count_err("evm_rpc");
            return Err(ChainError::Transport(format!(
                "RPC request failed with status {}: {}",
                status, body
            )));
        }

        let body: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            metrics::count_err("evm_rpc");
            ChainError::Transport(format!("invalid JSON response: {}", e))
        })?;

        if let Some(error) = body.get("error") {
            metrics::count_err("evm_rpc");
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown RPC error");
            let code = error.get("code").and_then(|c| c.as_i64()).unwrap_or(-1);
            return Err(ChainError::Node(format!("RPC error {}: {}", code, message)));
        }

        let result = body.get("result").cloned().ok_or_else(|| {
            metrics::count_err("evm_rpc");
            ChainError::Transport("missing result field in RPC response".into())
        })?;

        metrics::count_ok("evm_rpc");
        Ok(result)
    }

    /// 期望result是hex字符串的调用
    async fn rpc_call_hex(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<String, ChainError> {
        let result = self.rpc_call(method, params).await?;
        result
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| ChainError::Transport("result field is not a string".into()))
    }

    async fn eth_call(&self, to: &str, data: &[u8]) -> Result<Vec<u8>, ChainError> {
        let result = self
            .rpc_call_hex(
                "eth_call",
                json!([{ "to": to, "data": format!("0x{}", hex::encode(data)) }, "latest"]),
            )
            .await?;
        hex::decode(result.trim_start_matches("0x"))
            .map_err(|e| ChainError::Transport(format!("invalid eth_call result: {}", e)))
    }
}

fn parse_hex_u256(value: &str) -> Result<U256, ChainError> {
    U256::from_str_radix(value.trim_start_matches("0x"), 16)
        .map_err(|e| ChainError::Transport(format!("invalid hex quantity '{}': {}", value, e)))
}

fn parse_hex_u64(value: &str) -> Result<u64, ChainError> {
    u64::from_str_radix(value.trim_start_matches("0x"), 16)
        .map_err(|e| ChainError::Transport(format!("invalid hex quantity '{}': {}", value, e)))
}

/// 网络必须是EVM家族且chain id为正
fn evm_chain_id(network: &Network) -> Result<u64, ChainError> {
    if network.chain != ChainFamily::Evm || network.chain_id <= 0 {
        return Err(ChainError::Validation(format!(
            "Network '{}' is not an EVM network",
            network.id
        )));
    }
    Ok(network.chain_id as u64)
}

/// EVM链客户端 + 按网络id的连接池
///
/// 进程内构造一次、按引用传递；没有全局单例。
pub struct EvmClient {
    connections: RwLock<HashMap<String, Arc<EvmConnection>>>,
}

impl Default for EvmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl EvmClient {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// 获取或创建网络连接
    ///
    /// 并发首次使用时在写锁下收敛到同一个句柄，不会竞争出重复连接。
    async fn connection(&self, network: &Network) -> Arc<EvmConnection> {
        if let Some(conn) = self.connections.read().await.get(&network.id) {
            return conn.clone();
        }

        let mut map = self.connections.write().await;
        map.entry(network.id.clone())
            .or_insert_with(|| Arc::new(EvmConnection::new(network)))
            .clone()
    }

    /// 驱逐某个网络的缓存连接（RPC端点被重新配置后调用）
    pub async fn invalidate_network(&self, network_id: &str) {
        self.connections.write().await.remove(network_id);
    }

    /// 清空全部连接
    pub async fn shutdown(&self) {
        self.connections.write().await.clear();
    }

    /// 查询原生币余额
    pub async fn get_balance(
        &self,
        address: &str,
        network: &Network,
    ) -> Result<BalanceInfo, ChainError> {
        if !AddressValidator::validate_evm_address(address) {
            return Err(ChainError::Validation(format!("Invalid address: {}", address)));
        }

        let conn = self.connection(network).await;
        let hex_balance = conn
            .rpc_call_hex("eth_getBalance", json!([address, "latest"]))
            .await?;
        let wei = parse_hex_u256(&hex_balance)?;

        Ok(BalanceInfo {
            wei,
            formatted: amount::format_decimal_units(wei, NATIVE_DECIMALS),
            symbol: network.symbol.clone(),
        })
    }

    /// 查询当前gas价格
    pub async fn get_gas_price(&self, network: &Network) -> Result<U256, ChainError> {
        let conn = self.connection(network).await;
        let hex_price = conn.rpc_call_hex("eth_gasPrice", json!([])).await?;
        parse_hex_u256(&hex_price)
    }

    /// 查询账户nonce
    pub async fn get_nonce(&self, address: &str, network: &Network) -> Result<U256, ChainError> {
        if !AddressValidator::validate_evm_address(address) {
            return Err(ChainError::Validation(format!("Invalid address: {}", address)));
        }

        let conn = self.connection(network).await;
        let hex_nonce = conn
            .rpc_call_hex("eth_getTransactionCount", json!([address, "latest"]))
            .await?;
        parse_hex_u256(&hex_nonce)
    }

    /// 发送原生币转账
    ///
    /// 校验全部在网络调用之前完成；签名带EIP-155重放保护；
    /// 未提供nonce/gas价格时在线获取。
    pub async fn send_native_coin(
        &self,
        request: NativeTransferRequest,
        network: &Network,
    ) -> Result<BroadcastOutcome, ChainError> {
        let chain_id = evm_chain_id(network)?;

        if !AddressValidator::validate_evm_address(&request.from) {
            return Err(ChainError::Validation(format!(
                "Invalid sender address: {}",
                request.from
            )));
        }
        if !AddressValidator::validate_evm_address(&request.to) {
            return Err(ChainError::Validation(format!(
                "Invalid recipient address: {}",
                request.to
            )));
        }

        let value = amount::parse_decimal_units(&request.amount, NATIVE_DECIMALS)?;
        let wallet = self.wallet_for_sender(&request.private_key, &request.from, chain_id)?;

        let to: Address = request
            .to
            .parse()
            .map_err(|_| ChainError::Validation(format!("Invalid recipient address: {}", request.to)))?;

        let conn = self.connection(network).await;
        let nonce = match request.nonce {
            Some(n) => n,
            None => self.get_nonce(&request.from, network).await?,
        };
        let gas_price = match request.gas_price {
            Some(p) => p,
            None => self.get_gas_price(network).await?,
        };
        let gas_limit = request.gas_limit.unwrap_or(DEFAULT_NATIVE_GAS_LIMIT);

        let tx = TransactionRequest::new()
            .to(to)
            .value(value)
            .nonce(nonce)
            .gas(gas_limit)
            .gas_price(gas_price)
            .chain_id(chain_id);

        self.sign_and_broadcast(&conn, tx.into(), &wallet, network).await
    }

    /// 轮询交易回执
    ///
    /// 固定间隔的有界阻塞轮询；调用方drop future即取消。
    pub async fn wait_for_confirmation(
        &self,
        tx_hash: &str,
        network: &Network,
        max_wait_secs: u64,
        poll_interval_ms: u64,
    ) -> Result<ConfirmationOutcome, ChainError> {
        let conn = self.connection(network).await;
        let attempts = (max_wait_secs * 1000 / poll_interval_ms.max(1)).max(1);

        for _ in 0..attempts {
            let receipt = conn
                .rpc_call("eth_getTransactionReceipt", json!([tx_hash]))
                .await?;

            if !receipt.is_null() {
                let block_number = receipt
                    .get("blockNumber")
                    .and_then(|v| v.as_str())
                    .map(parse_hex_u64)
                    .transpose()?
                    .unwrap_or(0);
                let gas_used = receipt
                    .get("gasUsed")
                    .and_then(|v| v.as_str())
                    .map(parse_hex_u64)
                    .transpose()?
                    .unwrap_or(0);
                let success = receipt
                    .get("status")
                    .and_then(|v| v.as_str())
                    .map(|s| s.trim_start_matches("0x") == "1")
                    .unwrap_or(false);

                return Ok(ConfirmationOutcome::Confirmed {
                    block_number,
                    gas_used,
                    success,
                });
            }

            tokio::time::sleep(Duration::from_millis(poll_interval_ms)).await;
        }

        Ok(ConfirmationOutcome::Timeout)
    }

    /// 读取ERC-20元数据（symbol/name/decimals）
    pub async fn get_token_metadata(
        &self,
        contract: &str,
        network: &Network,
    ) -> Result<TokenMetadata, ChainError> {
        if !AddressValidator::validate_evm_address(contract) {
            return Err(ChainError::Validation(format!(
                "Invalid contract address: {}",
                contract
            )));
        }

        let conn = self.connection(network).await;

        let name_buf = conn
            .eth_call(contract, &abi::encode_call(abi::SELECTOR_NAME, &[]))
            .await?;
        let symbol_buf = conn
            .eth_call(contract, &abi::encode_call(abi::SELECTOR_SYMBOL, &[]))
            .await?;
        let decimals_buf = conn
            .eth_call(contract, &abi::encode_call(abi::SELECTOR_DECIMALS, &[]))
            .await?;

        Ok(TokenMetadata {
            name: abi::decode_string(&name_buf),
            symbol: abi::decode_string(&symbol_buf),
            decimals: abi::decode_uint(&decimals_buf).low_u32(),
        })
    }

    /// 查询ERC-20余额
    pub async fn get_token_balance(
        &self,
        contract: &str,
        wallet_address: &str,
        decimals: u32,
        network: &Network,
    ) -> Result<TokenBalance, ChainError> {
        if !AddressValidator::validate_evm_address(contract) {
            return Err(ChainError::Validation(format!(
                "Invalid contract address: {}",
                contract
            )));
        }
        if !AddressValidator::validate_evm_address(wallet_address) {
            return Err(ChainError::Validation(format!(
                "Invalid address: {}",
                wallet_address
            )));
        }

        let holder: Address = wallet_address
            .parse()
            .map_err(|_| ChainError::Validation(format!("Invalid address: {}", wallet_address)))?;

        let conn = self.connection(network).await;
        let data = abi::encode_call(
            abi::SELECTOR_BALANCE_OF,
            &[abi::encode_address(holder.as_bytes())],
        );
        let buf = conn.eth_call(contract, &data).await?;
        let raw = abi::decode_uint(&buf);

        Ok(TokenBalance {
            raw,
            formatted: amount::format_decimal_units(raw, decimals),
        })
    }

    /// 批量刷新代币余额
    ///
    /// 单个代币失败只记录失败的symbol和原因，整批继续，不会中途放弃。
    pub async fn refresh_token_balances(
        &self,
        tokens: &[TokenRecord],
        wallet_address: &str,
        network: &Network,
    ) -> Vec<(String, Result<TokenBalance, ChainError>)> {
        let mut results = Vec::with_capacity(tokens.len());
        for token in tokens {
            let result = self
                .get_token_balance(&token.contract_address, wallet_address, token.decimals, network)
                .await;
            if let Err(e) = &result {
                tracing::warn!(symbol = %token.symbol, error = %e, "token balance refresh failed");
            }
            results.push((token.symbol.clone(), result));
        }
        results
    }

    /// 发送ERC-20转账并等待上链结果
    ///
    /// 交易回执status非成功时返回 `Error("Transaction failed on chain")`；
    /// 等待窗口内没有回执则带着交易哈希正常返回。
    pub async fn send_token(
        &self,
        request: TokenTransferRequest,
        network: &Network,
    ) -> Result<BroadcastOutcome, ChainError> {
        let chain_id = evm_chain_id(network)?;

        if !AddressValidator::validate_evm_address(&request.contract) {
            return Err(ChainError::Validation(format!(
                "Invalid contract address: {}",
                request.contract
            )));
        }
        if !AddressValidator::validate_evm_address(&request.to) {
            return Err(ChainError::Validation(format!(
                "Invalid recipient address: {}",
                request.to
            )));
        }

        let raw_amount = amount::parse_decimal_units(&request.amount, request.decimals)?;
        let signing_key = keypair::signing_key_from_private_key(&request.private_key)?;
        let wallet = LocalWallet::from(signing_key).with_chain_id(chain_id);
        let sender = format!("{:#x}", wallet.address());

        let to: Address = request
            .to
            .parse()
            .map_err(|_| ChainError::Validation(format!("Invalid recipient address: {}", request.to)))?;
        let contract: Address = request
            .contract
            .parse()
            .map_err(|_| {
                ChainError::Validation(format!("Invalid contract address: {}", request.contract))
            })?;

        let data = abi::encode_call(
            abi::SELECTOR_TRANSFER,
            &[abi::encode_address(to.as_bytes()), abi::encode_uint(raw_amount)],
        );

        let conn = self.connection(network).await;
        let nonce = self.get_nonce(&sender, network).await?;
        let gas_price = match request.gas_price {
            Some(p) => p,
            None => self.get_gas_price(network).await?,
        };
        let gas_limit = request.gas_limit.unwrap_or(DEFAULT_TOKEN_GAS_LIMIT);

        let tx = TransactionRequest::new()
            .to(contract)
            .value(U256::zero())
            .nonce(nonce)
            .gas(gas_limit)
            .gas_price(gas_price)
            .data(data)
            .chain_id(chain_id);

        let outcome = self
            .sign_and_broadcast(&conn, tx.into(), &wallet, network)
            .await?;

        match self
            .wait_for_confirmation(
                &outcome.tx_hash,
                network,
                DEFAULT_CONFIRMATION_WAIT_SECS,
                DEFAULT_POLL_INTERVAL_MS,
            )
            .await?
        {
            ConfirmationOutcome::Confirmed { success: false, .. } => {
                Err(ChainError::Node("Transaction failed on chain".into()))
            }
            _ => Ok(outcome),
        }
    }

    /// 解析私钥并断言它属于声明的发送方
    fn wallet_for_sender(
        &self,
        private_key: &str,
        from: &str,
        chain_id: u64,
    ) -> Result<LocalWallet, ChainError> {
        let signing_key = keypair::signing_key_from_private_key(private_key)?;
        let wallet = LocalWallet::from(signing_key).with_chain_id(chain_id);

        let from_addr: Address = from
            .parse()
            .map_err(|_| ChainError::Validation(format!("Invalid sender address: {}", from)))?;
        if wallet.address() != from_addr {
            return Err(ChainError::Validation(
                "Private key does not match sender address".into(),
            ));
        }

        Ok(wallet)
    }

    async fn sign_and_broadcast(
        &self,
        conn: &EvmConnection,
        tx: TypedTransaction,
        wallet: &LocalWallet,
        network: &Network,
    ) -> Result<BroadcastOutcome, ChainError> {
        let signature = wallet
            .sign_transaction_sync(&tx)
            .map_err(|e| ChainError::Validation(format!("Failed to sign transaction: {}", e)))?;
        let raw = format!("0x{}", hex::encode(tx.rlp_signed(&signature)));

        let tx_hash = conn
            .rpc_call_hex("eth_sendRawTransaction", json!([raw]))
            .await
            .map_err(|e| {
                metrics::count_err("evm_broadcast");
                e
            })?;

        if tx_hash.len() != 66 || !tx_hash.starts_with("0x") {
            metrics::count_err("evm_broadcast");
            return Err(ChainError::Transport(format!(
                "invalid transaction hash in RPC response: {}",
                tx_hash
            )));
        }

        metrics::count_ok("evm_broadcast");
        tracing::info!(
            network = %network.id,
            tx_hash = %log_redact::redact_hex_string(&tx_hash, 10),
            "transaction broadcast"
        );

        Ok(BroadcastOutcome {
            explorer_url: network.explorer_tx_url(&tx_hash),
            tx_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlockchainConfig;
    use crate::domain::network::predefined_networks;

    const KEY_ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";
    const KEY_ONE_ADDRESS: &str = "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf";

    /// RPC端点指向不可达地址：校验必须在网络调用之前失败
    fn offline_network() -> Network {
        let mut network = predefined_networks(&BlockchainConfig::default())
            .into_iter()
            .find(|n| n.id == "ethereum")
            .unwrap();
        network.rpc_url = "http://127.0.0.1:9".into();
        network
    }

    fn transfer_request(to: &str) -> NativeTransferRequest {
        NativeTransferRequest {
            from: KEY_ONE_ADDRESS.to_string(),
            to: to.to_string(),
            amount: "1.5".to_string(),
            private_key: KEY_ONE.to_string(),
            gas_limit: None,
            gas_price: None,
            nonce: None,
        }
    }

    #[tokio::test]
    async fn test_send_rejects_malformed_recipient_before_any_rpc() {
        let client = EvmClient::new();
        let network = offline_network();

        let before = metrics::endpoint_requests("evm_rpc") + metrics::endpoint_requests("evm_broadcast");

        // 41个hex字符
        let result = client
            .send_native_coin(
                transfer_request("0x7e5f4552091a69125d5dfcb7b8c2659029395bdf7"),
                &network,
            )
            .await;
        assert!(matches!(result, Err(ChainError::Validation(_))));

        // 非hex字符
        let result = client
            .send_native_coin(
                transfer_request("0xZZZZ4552091a69125d5dfcb7b8c2659029395bdf"),
                &network,
            )
            .await;
        assert!(matches!(result, Err(ChainError::Validation(_))));

        // 校验失败的路径不允许产生任何网络流量
        assert_eq!(
            metrics::endpoint_requests("evm_rpc") + metrics::endpoint_requests("evm_broadcast"),
            before
        );
    }

    #[tokio::test]
    async fn test_send_rejects_key_address_mismatch() {
        let client = EvmClient::new();
        let network = offline_network();
        let before = metrics::endpoint_requests("evm_rpc") + metrics::endpoint_requests("evm_broadcast");

        let mut request = transfer_request("0x1234567890123456789012345678901234567890");
        // 声明的发送方不是私钥1对应的地址
        request.from = "0x1234567890123456789012345678901234567890".to_string();

        let result = client.send_native_coin(request, &network).await;
        match result {
            Err(ChainError::Validation(msg)) => {
                assert_eq!(msg, "Private key does not match sender address");
            }
            other => panic!("expected validation error, got {:?}", other.map(|_| ())),
        }
        assert_eq!(
            metrics::endpoint_requests("evm_rpc") + metrics::endpoint_requests("evm_broadcast"),
            before
        );
    }

    #[tokio::test]
    async fn test_send_rejects_bad_amount() {
        let client = EvmClient::new();
        let network = offline_network();

        let mut request = transfer_request("0x1234567890123456789012345678901234567890");
        request.amount = "1.2.3".into();
        assert!(matches!(
            client.send_native_coin(request, &network).await,
            Err(ChainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_non_evm_network_rejected() {
        let client = EvmClient::new();
        let mut network = offline_network();
        network.chain = ChainFamily::Tron;
        network.chain_id = crate::domain::TRON_CHAIN_ID;

        assert!(matches!(
            client
                .send_native_coin(
                    transfer_request("0x1234567890123456789012345678901234567890"),
                    &network
                )
                .await,
            Err(ChainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_batch_refresh_continues_past_failures() {
        let client = EvmClient::new();
        let network = offline_network();

        // 两个合约地址都非法：校验在网络调用前失败，但整批必须完整返回
        let tokens = vec![
            TokenRecord {
                contract_address: "bad-contract".into(),
                symbol: "AAA".into(),
                name: "Token A".into(),
                decimals: 18,
                network_id: network.id.clone(),
            },
            TokenRecord {
                contract_address: "0x123".into(),
                symbol: "BBB".into(),
                name: "Token B".into(),
                decimals: 6,
                network_id: network.id.clone(),
            },
        ];

        let results = client
            .refresh_token_balances(&tokens, KEY_ONE_ADDRESS, &network)
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "AAA");
        assert!(matches!(results[0].1, Err(ChainError::Validation(_))));
        assert_eq!(results[1].0, "BBB");
        assert!(matches!(results[1].1, Err(ChainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_connection_pool_reuse_and_invalidate() {
        let client = EvmClient::new();
        let network = offline_network();

        let a = client.connection(&network).await;
        let b = client.connection(&network).await;
        assert!(Arc::ptr_eq(&a, &b));

        client.invalidate_network(&network.id).await;
        let c = client.connection(&network).await;
        assert!(!Arc::ptr_eq(&a, &c));

        client.shutdown().await;
        assert!(client.connections.read().await.is_empty());
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let rendered = format!("{:?}", transfer_request("0x1234567890123456789012345678901234567890"));
        assert!(!rendered.contains(KEY_ONE));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_hex_parsers() {
        assert_eq!(parse_hex_u64("0x1a2b3c").unwrap(), 1715004);
        assert_eq!(parse_hex_u256("0xde0b6b3a7640000").unwrap(), U256::from(10u64.pow(18)));
        assert!(parse_hex_u64("0xzz").is_err());
    }
}
