//! TRON链客户端
//!
//! 走全节点wallet API（HTTP/JSON）完成账户查询、TRX转账和TRC-20合约调用。
//! 地址只在Base58Check边界进出：所有公开方法接受/返回Base58Check字符串，
//! 内部解码成0x41前缀的21字节负载、以hex形式进请求体。
//! 交易id一律取 `sha256(raw_data)` 本地计算，不信任广播响应里的id字段。

use std::time::Duration;

use ethers::types::U256;
use k256::ecdsa::SigningKey;
use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::{
    domain::{keypair, network::Network, token::Trc20TokenInfo, wallet::ChainFamily},
    error::{ChainError, CryptoError},
    infrastructure::log_redact,
    metrics,
    utils::{abi, address_validator::TRON_ADDRESS_PREFIX, amount, base58check},
};

/// SUN精度：1 TRX = 10^6 SUN
const TRX_DECIMALS: u32 = 6;
/// 合约触发交易的默认能量费上限（SUN）
pub const DEFAULT_FEE_LIMIT_SUN: u64 = 50_000_000;

/// TRX余额
#[derive(Debug, Clone, Serialize)]
pub struct TrxBalance {
    /// 原始SUN整数
    pub sun: u64,
    /// 按6位小数换算的TRX金额
    pub trx: String,
}

/// 账户带宽/能量资源
#[derive(Debug, Clone, Default, Serialize)]
pub struct AccountResources {
    pub free_bandwidth_limit: u64,
    pub free_bandwidth_used: u64,
    pub bandwidth_limit: u64,
    pub bandwidth_used: u64,
    pub energy_limit: u64,
    pub energy_used: u64,
}

/// TRC-20余额
#[derive(Debug, Clone, Serialize)]
pub struct Trc20Balance {
    pub raw: U256,
    pub formatted: String,
    pub decimals: u32,
}

/// 交易执行信息（确认后查询）
#[derive(Debug, Clone, Serialize)]
pub struct TronTransactionInfo {
    pub id: String,
    pub block_number: u64,
    /// 燃烧的手续费（SUN）
    pub fee: u64,
    pub success: bool,
}

/// TRON链客户端
///
/// 每个实例持有一条到节点的共享HTTP通道；编解码和签名不携带共享可变状态。
pub struct TronClient {
    http: reqwest::Client,
    api_url: String,
    fee_limit: u64,
}

impl TronClient {
    pub fn new(network: &Network) -> Result<Self, ChainError> {
        Self::with_fee_limit(network, DEFAULT_FEE_LIMIT_SUN)
    }

    pub fn with_fee_limit(network: &Network, fee_limit: u64) -> Result<Self, ChainError> {
        if network.chain != ChainFamily::Tron {
            return Err(ChainError::Validation(format!(
                "Network '{}' is not a TRON network",
                network.id
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Ok(Self {
            http,
            api_url: network.rpc_url.trim_end_matches('/').to_string(),
            fee_limit,
        })
    }

    // ------------------------------------------------------------------
    // 地址边界
    // ------------------------------------------------------------------

    /// Base58Check地址 → 21字节负载（0x41 ‖ 20字节核心）
    fn decode_address(address: &str) -> Result<[u8; 21], ChainError> {
        let payload = base58check::decode(address)?;
        if payload.len() != 21 || payload[0] != TRON_ADDRESS_PREFIX {
            return Err(CryptoError::InvalidAddress(format!(
                "not a mainnet TRON address: {}",
                address
            ))
            .into());
        }
        let mut bytes = [0u8; 21];
        bytes.copy_from_slice(&payload);
        Ok(bytes)
    }

    // ------------------------------------------------------------------
    // 金额换算
    // ------------------------------------------------------------------

    /// TRX十进制金额 → SUN整数（6位小数，四舍五入半进位）
    fn trx_to_sun(amount_trx: &str) -> Result<u64, ChainError> {
        let amount: Decimal = amount_trx
            .trim()
            .parse()
            .map_err(|_| ChainError::Validation(format!("Invalid amount: {}", amount_trx)))?;

        if amount.is_sign_negative() {
            return Err(ChainError::Validation(format!(
                "Invalid amount: {}",
                amount_trx
            )));
        }

        let sun = (amount * Decimal::from(1_000_000u64))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        sun.to_u64()
            .ok_or_else(|| ChainError::Validation(format!("Invalid amount: {}", amount_trx)))
    }

    /// SUN整数 → TRX十进制字符串
    fn sun_to_trx(sun: u64) -> String {
        Decimal::new(sun as i64, TRX_DECIMALS)
            .round_dp_with_strategy(TRX_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
            .normalize()
            .to_string()
    }

    // ------------------------------------------------------------------
    // 传输
    // ------------------------------------------------------------------

    async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, ChainError> {
        let url = format!("{}{}", self.api_url, path);

        let response = self.http.post(&url).json(&body).send().await.map_err(|e| {
            metrics::count_err("tron_api");
            ChainError::transport(e)
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            metrics::count_err("tron_api");
            ChainError::transport(e)
        })?;

        if !status.is_success() {
            metrics::count_err("tron_api");
            return Err(ChainError::Transport(format!(
                "node request failed with status {}: {}",
                status, text
            )));
        }

        let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            metrics::count_err("tron_api");
            ChainError::Transport(format!("invalid JSON response: {}", e))
        })?;

        metrics::count_ok("tron_api");
        Ok(value)
    }

    /// 节点消息是hex编码的ASCII，解不出来就原样返回
    fn decode_node_message(value: Option<&serde_json::Value>) -> String {
        let raw = value.and_then(|v| v.as_str()).unwrap_or("unknown node error");
        match hex::decode(raw) {
            Ok(bytes) => String::from_utf8(bytes).unwrap_or_else(|_| raw.to_string()),
            Err(_) => raw.to_string(),
        }
    }

    // ------------------------------------------------------------------
    // 账户查询
    // ------------------------------------------------------------------

    async fn get_account(&self, address: &str) -> Result<serde_json::Value, ChainError> {
        let payload = Self::decode_address(address)?;
        self.post("/wallet/getaccount", json!({ "address": hex::encode(payload) }))
            .await
    }

    /// 余额（SUN）；未激活账户返回0
    pub async fn get_balance_in_sun(&self, address: &str) -> Result<u64, ChainError> {
        let account = self.get_account(address).await?;
        Ok(account.get("balance").and_then(|v| v.as_u64()).unwrap_or(0))
    }

    /// 余额（SUN + TRX字符串）
    pub async fn get_balance(&self, address: &str) -> Result<TrxBalance, ChainError> {
        let sun = self.get_balance_in_sun(address).await?;
        Ok(TrxBalance {
            sun,
            trx: Self::sun_to_trx(sun),
        })
    }

    /// 账户带宽/能量资源
    pub async fn get_account_resources(
        &self,
        address: &str,
    ) -> Result<AccountResources, ChainError> {
        let payload = Self::decode_address(address)?;
        let value = self
            .post(
                "/wallet/getaccountresource",
                json!({ "address": hex::encode(payload) }),
            )
            .await?;

        let field = |name: &str| value.get(name).and_then(|v| v.as_u64()).unwrap_or(0);

        Ok(AccountResources {
            free_bandwidth_limit: field("freeNetLimit"),
            free_bandwidth_used: field("freeNetUsed"),
            bandwidth_limit: field("NetLimit"),
            bandwidth_used: field("NetUsed"),
            energy_limit: field("EnergyLimit"),
            energy_used: field("EnergyUsed"),
        })
    }

    /// 最新区块高度
    pub async fn get_now_block(&self) -> Result<u64, ChainError> {
        let block = self.post("/wallet/getnowblock", json!({})).await?;
        block
            .pointer("/block_header/raw_data/number")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| ChainError::Transport("missing block number in node response".into()))
    }

    /// 按交易id查询执行信息；尚未上链返回None
    pub async fn get_transaction_info(
        &self,
        txid: &str,
    ) -> Result<Option<TronTransactionInfo>, ChainError> {
        let info = self
            .post("/wallet/gettransactioninfobyid", json!({ "value": txid }))
            .await?;

        if info.as_object().map(|o| o.is_empty()).unwrap_or(true) {
            return Ok(None);
        }

        // 原生转账的receipt没有result字段，只有合约执行失败才出现非SUCCESS
        let receipt_result = info.pointer("/receipt/result").and_then(|v| v.as_str());
        let success = info.get("result").and_then(|v| v.as_str()) != Some("FAILED")
            && receipt_result.map(|r| r == "SUCCESS").unwrap_or(true);

        Ok(Some(TronTransactionInfo {
            id: txid.to_string(),
            block_number: info.get("blockNumber").and_then(|v| v.as_u64()).unwrap_or(0),
            fee: info.get("fee").and_then(|v| v.as_u64()).unwrap_or(0),
            success,
        }))
    }

    // ------------------------------------------------------------------
    // TRX转账
    // ------------------------------------------------------------------

    /// 原生TRX转账，返回本地计算的交易id
    pub async fn send_trx(
        &self,
        from: &str,
        to: &str,
        private_key: &str,
        amount_trx: &str,
    ) -> Result<String, ChainError> {
        let owner = Self::decode_address(from)?;
        let recipient = Self::decode_address(to)?;
        let amount_sun = Self::trx_to_sun(amount_trx)?;
        if amount_sun == 0 {
            return Err(ChainError::Validation(format!(
                "Invalid amount: {} is below 1 SUN",
                amount_trx
            )));
        }

        let tx = self
            .post(
                "/wallet/createtransaction",
                json!({
                    "owner_address": hex::encode(owner),
                    "to_address": hex::encode(recipient),
                    "amount": amount_sun,
                }),
            )
            .await?;

        if let Some(error) = tx.get("Error") {
            return Err(ChainError::Node(
                error.as_str().unwrap_or("transaction build rejected").to_string(),
            ));
        }

        let txid = self.sign_and_broadcast(tx, private_key).await?;
        tracing::info!(
            from = %log_redact::redact_address(from),
            to = %log_redact::redact_address(to),
            amount_sun = amount_sun,
            txid = %log_redact::redact_hex_string(&txid, 8),
            "TRX transfer broadcast"
        );
        Ok(txid)
    }

    // ------------------------------------------------------------------
    // TRC-20
    // ------------------------------------------------------------------

    /// 只读合约调用：调用方地址直接填合约自身（纯读不需要真实发送方），
    /// 取第一个返回缓冲区作为解码载荷。
    async fn trigger_constant_contract(
        &self,
        contract: &[u8; 21],
        data: Vec<u8>,
    ) -> Result<Vec<u8>, ChainError> {
        let contract_hex = hex::encode(contract);
        let response = self
            .post(
                "/wallet/triggerconstantcontract",
                json!({
                    "owner_address": contract_hex,
                    "contract_address": contract_hex,
                    "data": hex::encode(data),
                }),
            )
            .await?;

        let ok = response
            .pointer("/result/result")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if !ok {
            return Err(ChainError::ContractCallFailed(Self::decode_node_message(
                response.pointer("/result/message"),
            )));
        }

        let buffers = response
            .get("constant_result")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        let first = buffers
            .first()
            .and_then(|v| v.as_str())
            .ok_or(ChainError::NoResult)?;

        hex::decode(first)
            .map_err(|e| ChainError::Transport(format!("invalid constant_result hex: {}", e)))
    }

    /// 读取TRC-20合约元数据
    pub async fn get_token_info(&self, contract: &str) -> Result<Trc20TokenInfo, ChainError> {
        let contract_payload = Self::decode_address(contract)?;

        let name_buf = self
            .trigger_constant_contract(&contract_payload, abi::encode_call(abi::SELECTOR_NAME, &[]))
            .await?;
        let symbol_buf = self
            .trigger_constant_contract(
                &contract_payload,
                abi::encode_call(abi::SELECTOR_SYMBOL, &[]),
            )
            .await?;
        let decimals = self.read_decimals(&contract_payload).await?;

        Ok(Trc20TokenInfo {
            contract_address: contract.to_string(),
            name: abi::decode_string(&name_buf),
            symbol: abi::decode_string(&symbol_buf),
            decimals,
        })
    }

    async fn read_decimals(&self, contract: &[u8; 21]) -> Result<u32, ChainError> {
        let buf = self
            .trigger_constant_contract(contract, abi::encode_call(abi::SELECTOR_DECIMALS, &[]))
            .await?;
        Ok(abi::decode_uint(&buf).low_u32())
    }

    /// 查询TRC-20余额
    pub async fn get_trc20_balance(
        &self,
        contract: &str,
        holder: &str,
    ) -> Result<Trc20Balance, ChainError> {
        let contract_payload = Self::decode_address(contract)?;
        let holder_payload = Self::decode_address(holder)?;

        let decimals = self.read_decimals(&contract_payload).await?;
        let data = abi::encode_call(
            abi::SELECTOR_BALANCE_OF,
            &[abi::encode_address(&holder_payload)],
        );
        let buf = self.trigger_constant_contract(&contract_payload, data).await?;
        let raw = abi::decode_uint(&buf);

        Ok(Trc20Balance {
            raw,
            formatted: amount::format_decimal_units(raw, decimals),
            decimals,
        })
    }

    /// TRC-20转账
    ///
    /// 合约执行要燃烧能量，fee_limit必须在签名之前进入交易体，
    /// 因此把它作为触发参数交给节点一起构进raw_data。
    pub async fn send_trc20(
        &self,
        from: &str,
        to: &str,
        contract: &str,
        private_key: &str,
        amount: &str,
    ) -> Result<String, ChainError> {
        let owner = Self::decode_address(from)?;
        let recipient = Self::decode_address(to)?;
        let contract_payload = Self::decode_address(contract)?;

        let decimals = self.read_decimals(&contract_payload).await?;
        let raw_amount = amount::parse_decimal_units(amount, decimals)?;

        let data = abi::encode_call(
            abi::SELECTOR_TRANSFER,
            &[abi::encode_address(&recipient), abi::encode_uint(raw_amount)],
        );

        let response = self
            .post(
                "/wallet/triggersmartcontract",
                json!({
                    "owner_address": hex::encode(owner),
                    "contract_address": hex::encode(contract_payload),
                    "data": hex::encode(&data),
                    "fee_limit": self.fee_limit,
                    "call_value": 0,
                }),
            )
            .await?;

        let ok = response
            .pointer("/result/result")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if !ok {
            return Err(ChainError::Node(Self::decode_node_message(
                response.pointer("/result/message"),
            )));
        }

        let tx = response
            .get("transaction")
            .cloned()
            .ok_or_else(|| ChainError::Transport("missing transaction in node response".into()))?;

        let txid = self.sign_and_broadcast(tx, private_key).await?;
        tracing::info!(
            contract = %log_redact::redact_address(contract),
            to = %log_redact::redact_address(to),
            txid = %log_redact::redact_hex_string(&txid, 8),
            "TRC20 transfer broadcast"
        );
        Ok(txid)
    }

    // ------------------------------------------------------------------
    // 签名与广播
    // ------------------------------------------------------------------

    /// 对节点构建的交易签名并广播
    ///
    /// 签名哈希 = sha256(raw_data字节)；附带可恢复签名（r ‖ s ‖ id，65字节）。
    async fn sign_and_broadcast(
        &self,
        mut tx: serde_json::Value,
        private_key: &str,
    ) -> Result<String, ChainError> {
        let raw_data_hex = tx
            .get("raw_data_hex")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ChainError::Transport("missing raw_data_hex in node response".into()))?;

        let (txid, signature) = sign_raw_transaction(raw_data_hex, private_key)?;

        let obj = tx
            .as_object_mut()
            .ok_or_else(|| ChainError::Transport("transaction is not a JSON object".into()))?;
        obj.insert("txID".into(), json!(txid));
        obj.insert("signature".into(), json!([signature]));

        let response = self.post("/wallet/broadcasttransaction", tx).await;
        let response = match response {
            Ok(v) => v,
            Err(e) => {
                metrics::count_err("tron_broadcast");
                return Err(e);
            }
        };

        let ok = response.get("result").and_then(|v| v.as_bool()).unwrap_or(false);
        if !ok {
            metrics::count_err("tron_broadcast");
            let code = response
                .get("code")
                .and_then(|v| v.as_str())
                .unwrap_or("UNKNOWN");
            return Err(ChainError::Node(format!(
                "broadcast rejected ({}): {}",
                code,
                Self::decode_node_message(response.get("message")),
            )));
        }

        metrics::count_ok("tron_broadcast");
        Ok(txid)
    }
}

/// 计算签名哈希并产生65字节可恢复签名
///
/// 返回 (txid hex, signature hex)。txid就是签名哈希本身。
fn sign_raw_transaction(
    raw_data_hex: &str,
    private_key: &str,
) -> Result<(String, String), ChainError> {
    let raw_data = hex::decode(raw_data_hex)
        .map_err(|e| ChainError::Transport(format!("invalid raw_data_hex: {}", e)))?;
    let digest = Sha256::digest(&raw_data);

    let signing_key: SigningKey = keypair::signing_key_from_private_key(private_key)?;
    let (signature, recovery_id) = signing_key
        .sign_prehash_recoverable(&digest)
        .map_err(|e| ChainError::Validation(format!("Failed to sign transaction: {}", e)))?;

    let mut sig_bytes = [0u8; 65];
    sig_bytes[..64].copy_from_slice(&signature.to_bytes());
    sig_bytes[64] = recovery_id.to_byte();

    Ok((hex::encode(digest), hex::encode(sig_bytes)))
}

#[cfg(test)]
mod tests {
    use k256::ecdsa::VerifyingKey;

    use super::*;
    use crate::config::BlockchainConfig;
    use crate::domain::network::predefined_networks;

    const KEY_ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";

    fn recover_verifying_key(digest: &[u8], sig_bytes: &[u8; 65]) -> VerifyingKey {
        let signature = k256::ecdsa::Signature::from_slice(&sig_bytes[..64]).unwrap();
        let recovery_id = k256::ecdsa::RecoveryId::from_byte(sig_bytes[64]).unwrap();
        VerifyingKey::recover_from_prehash(digest, &signature, recovery_id).unwrap()
    }

    fn offline_network() -> Network {
        let mut network = predefined_networks(&BlockchainConfig::default())
            .into_iter()
            .find(|n| n.id == "tron")
            .unwrap();
        network.rpc_url = "http://127.0.0.1:9".into();
        network
    }

    fn tron_address(fill: u8) -> String {
        let mut payload = vec![TRON_ADDRESS_PREFIX];
        payload.extend_from_slice(&[fill; 20]);
        base58check::encode(&payload)
    }

    #[test]
    fn test_trx_sun_conversion() {
        assert_eq!(TronClient::trx_to_sun("1.5").unwrap(), 1_500_000);
        assert_eq!(TronClient::trx_to_sun("0").unwrap(), 0);
        assert_eq!(TronClient::trx_to_sun("0.000001").unwrap(), 1);
        // 超出6位小数按半进位取整
        assert_eq!(TronClient::trx_to_sun("0.0000005").unwrap(), 1);
        assert_eq!(TronClient::trx_to_sun("0.0000004").unwrap(), 0);

        assert!(TronClient::trx_to_sun("-1").is_err());
        assert!(TronClient::trx_to_sun("abc").is_err());
    }

    #[test]
    fn test_sun_to_trx_formatting() {
        assert_eq!(TronClient::sun_to_trx(1_500_000), "1.5");
        assert_eq!(TronClient::sun_to_trx(123_456_789), "123.456789");
        assert_eq!(TronClient::sun_to_trx(0), "0");
        assert_eq!(TronClient::sun_to_trx(1), "0.000001");
    }

    #[test]
    fn test_decode_address_boundary() {
        let good = tron_address(0x11);
        assert_eq!(TronClient::decode_address(&good).unwrap()[0], TRON_ADDRESS_PREFIX);

        // EVM地址不可能通过TRON边界
        assert!(TronClient::decode_address("0x7e5f4552091a69125d5dfcb7b8c2659029395bdf").is_err());

        // 校验和损坏
        let mut chars: Vec<char> = good.chars().collect();
        let last = chars.len() - 1;
        chars[last] = if chars[last] == '2' { '3' } else { '2' };
        let corrupted: String = chars.into_iter().collect();
        assert!(TronClient::decode_address(&corrupted).is_err());
    }

    #[test]
    fn test_sign_raw_transaction_recoverable() {
        // 任意raw_data：txid必须等于sha256(raw_data)，签名必须能恢复出原公钥
        let raw_data_hex = "0a02bbbb22080102030405060708";
        let (txid, signature) = sign_raw_transaction(raw_data_hex, KEY_ONE).unwrap();

        let raw_data = hex::decode(raw_data_hex).unwrap();
        let expected_digest = Sha256::digest(&raw_data);
        assert_eq!(txid, hex::encode(expected_digest));

        let sig_bytes: [u8; 65] = hex::decode(&signature).unwrap().try_into().unwrap();
        let recovered = recover_verifying_key(&expected_digest, &sig_bytes);
        let expected_key = keypair::signing_key_from_private_key(KEY_ONE)
            .unwrap()
            .verifying_key()
            .to_owned();
        assert_eq!(recovered, expected_key);
    }

    #[test]
    fn test_sign_rejects_bad_key() {
        assert!(matches!(
            sign_raw_transaction("aabb", "not-a-key"),
            Err(ChainError::Crypto(CryptoError::InvalidKeyFormat))
        ));
    }

    #[tokio::test]
    async fn test_send_trx_rejects_bad_address_before_any_rpc() {
        let client = TronClient::new(&offline_network()).unwrap();
        let before = metrics::endpoint_requests("tron_api") + metrics::endpoint_requests("tron_broadcast");

        let result = client
            .send_trx("not-an-address", &tron_address(0x22), KEY_ONE, "1")
            .await;
        assert!(matches!(result, Err(ChainError::Crypto(_))));

        let result = client
            .send_trx(&tron_address(0x11), "bad", KEY_ONE, "1")
            .await;
        assert!(matches!(result, Err(ChainError::Crypto(_))));

        // 金额非法同样不触网
        let result = client
            .send_trx(&tron_address(0x11), &tron_address(0x22), KEY_ONE, "x")
            .await;
        assert!(matches!(result, Err(ChainError::Validation(_))));

        assert_eq!(
            metrics::endpoint_requests("tron_api") + metrics::endpoint_requests("tron_broadcast"),
            before
        );
    }

    #[test]
    fn test_client_rejects_non_tron_network() {
        let network = predefined_networks(&BlockchainConfig::default())
            .into_iter()
            .find(|n| n.id == "ethereum")
            .unwrap();
        assert!(matches!(
            TronClient::new(&network),
            Err(ChainError::Validation(_))
        ));
    }

    #[test]
    fn test_decode_node_message() {
        // hex编码的ASCII
        let value = json!("62616c616e6365206e6f742073756666696369656e74");
        assert_eq!(
            TronClient::decode_node_message(Some(&value)),
            "balance not sufficient"
        );
        // 非hex原样返回
        let value = json!("plain message");
        assert_eq!(TronClient::decode_node_message(Some(&value)), "plain message");
        assert_eq!(TronClient::decode_node_message(None), "unknown node error");
    }
}
