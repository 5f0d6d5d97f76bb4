//! 심볼 단위 실행 직렬화.
//!
//! 포지션 스냅샷 조회와 주문 제출 사이는 venue에서 원자적이지 않습니다.
//! 같은 심볼에 대한 두 요청이 겹치면 이중 청산이나 반대 방향 청산
//! 경합이 생길 수 있으므로, 심볼마다 하나의 락으로 leg 시퀀스 전체를
//! 직렬화합니다. 서로 다른 심볼은 완전히 병렬로 진행됩니다.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// 심볼별 락 레지스트리.
///
/// 내부 맵 접근은 짧은 동기 락으로 보호하고, 실행 구간 자체는
/// 심볼별 비동기 락으로 보호합니다.
#[derive(Clone, Default)]
pub struct SymbolLocks {
    inner: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl SymbolLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 심볼 락 획득. 가드가 drop될 때까지 같은 심볼의 다른 요청은 대기합니다.
    pub async fn acquire(&self, symbol: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            map.entry(symbol.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test(start_paused = true)]
    async fn test_same_symbol_is_serialized() {
        let locks = SymbolLocks::new();
        let guard = locks.acquire("EURUSD").await;

        // 같은 심볼은 가드가 살아 있는 동안 획득 불가
        let blocked = timeout(Duration::from_millis(50), locks.acquire("EURUSD")).await;
        assert!(blocked.is_err());

        drop(guard);
        let acquired = timeout(Duration::from_millis(50), locks.acquire("EURUSD")).await;
        assert!(acquired.is_ok());
    }

    #[tokio::test]
    async fn test_distinct_symbols_run_in_parallel() {
        let locks = SymbolLocks::new();
        let _eurusd = locks.acquire("EURUSD").await;
        // 다른 심볼은 즉시 획득
        let _gbpusd = locks.acquire("GBPUSD").await;
    }
}
