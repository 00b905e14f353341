//! 进程内指标
//!
//! 统计RPC请求与广播的成功/失败次数，按端点分类。
//! 测试用它来证明校验失败的操作没有发起任何网络调用。

use std::{
    collections::HashMap,
    sync::{Mutex, OnceLock},
};

static METRICS: OnceLock<Mutex<MetricsState>> = OnceLock::new();

struct MetricsState {
    total: u64,
    errors: u64,
    per_endpoint: HashMap<&'static str, u64>,
    per_endpoint_err: HashMap<&'static str, u64>,
}

fn state() -> &'static Mutex<MetricsState> {
    METRICS.get_or_init(|| {
        Mutex::new(MetricsState {
            total: 0,
            errors: 0,
            per_endpoint: HashMap::new(),
            per_endpoint_err: HashMap::new(),
        })
    })
}

pub fn count_ok(endpoint: &'static str) {
    let mut s = match state().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    s.total += 1;
    *s.per_endpoint.entry(endpoint).or_insert(0) += 1;
}

pub fn count_err(endpoint: &'static str) {
    let mut s = match state().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    s.total += 1;
    s.errors += 1;
    *s.per_endpoint.entry(endpoint).or_insert(0) += 1;
    *s.per_endpoint_err.entry(endpoint).or_insert(0) += 1;
}

/// 累计请求总数快照
pub fn total_requests() -> u64 {
    let s = match state().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    s.total
}

/// 单个端点的请求数快照
pub fn endpoint_requests(endpoint: &str) -> u64 {
    let s = match state().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    s.per_endpoint.get(endpoint).copied().unwrap_or(0)
}

pub fn render_prometheus() -> String {
    let s = match state().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    let mut out = String::new();
    out.push_str("# HELP vaultcore_rpc_requests_total Total RPC requests\n");
    out.push_str("# TYPE vaultcore_rpc_requests_total counter\n");
    out.push_str(&format!("vaultcore_rpc_requests_total {}\n", s.total));

    out.push_str("# HELP vaultcore_rpc_errors_total Total RPC errors\n");
    out.push_str("# TYPE vaultcore_rpc_errors_total counter\n");
    out.push_str(&format!("vaultcore_rpc_errors_total {}\n", s.errors));

    out.push_str("# HELP vaultcore_endpoint_requests_total Requests per endpoint\n");
    out.push_str("# TYPE vaultcore_endpoint_requests_total counter\n");
    for (k, v) in s.per_endpoint.iter() {
        out.push_str(&format!(
            "vaultcore_endpoint_requests_total{{endpoint=\"{}\"}} {}\n",
            k, v
        ));
    }

    out.push_str("# HELP vaultcore_endpoint_errors_total Errors per endpoint\n");
    out.push_str("# TYPE vaultcore_endpoint_errors_total counter\n");
    for (k, v) in s.per_endpoint_err.iter() {
        out.push_str(&format!(
            "vaultcore_endpoint_errors_total{{endpoint=\"{}\"}} {}\n",
            k, v
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let before = total_requests();
        count_ok("test_endpoint");
        count_err("test_endpoint");
        assert_eq!(total_requests(), before + 2);

        let rendered = render_prometheus();
        assert!(rendered.contains("vaultcore_rpc_requests_total"));
        assert!(rendered.contains("endpoint=\"test_endpoint\""));
    }
}
