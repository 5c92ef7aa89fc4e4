use prometrics::metrics::MetricBuilder;
use slog::{Discard, Logger};
use std::sync::Arc;

use super::AllocatorEngine;
use crate::ledger::AllocationLedger;
use crate::metrics::EngineMetrics;
use crate::pool::BlockPool;
use crate::queue::{OverflowQueue, UnknownStrategyPolicy, DEFAULT_OVERFLOW_CAPACITY};
use crate::timing::{Clock, RequestTimingTracker, SystemClock};
use crate::Result;

/// `AllocatorEngine`のビルダ.
#[derive(Debug, Clone)]
pub struct EngineBuilder {
    metrics: MetricBuilder,
    logger: Logger,
    overflow_capacity: usize,
    unknown_strategy_policy: UnknownStrategyPolicy,
    clock: Arc<dyn Clock>,
}
impl EngineBuilder {
    /// デフォルト設定で`EngineBuilder`インスタンスを生成する.
    pub fn new() -> Self {
        EngineBuilder {
            metrics: MetricBuilder::new(),
            logger: Logger::root(Discard, o!()),
            overflow_capacity: DEFAULT_OVERFLOW_CAPACITY,
            unknown_strategy_policy: UnknownStrategyPolicy::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// メトリクス用の共通設定を登録する.
    ///
    /// デフォルト値は`MetricBuilder::new()`.
    pub fn metrics(&mut self, metrics: MetricBuilder) -> &mut Self {
        self.metrics = metrics;
        self
    }

    /// エンジン用の logger を登録する
    pub fn logger(&mut self, logger: Logger) -> &mut Self {
        self.logger = logger;
        self
    }

    /// オーバーフローキューの上限を設定する.
    ///
    /// デフォルト値は`5`.
    pub fn overflow_capacity(&mut self, n: usize) -> &mut Self {
        self.overflow_capacity = n;
        self
    }

    /// 未知の戦略が指定された要求の扱いを設定する.
    ///
    /// デフォルト値は`UnknownStrategyPolicy::Enqueue`.
    pub fn unknown_strategy_policy(&mut self, policy: UnknownStrategyPolicy) -> &mut Self {
        self.unknown_strategy_policy = policy;
        self
    }

    /// 滞在時間の記録に使う時刻源を設定する.
    ///
    /// デフォルト値は`SystemClock`.
    pub fn clock<C>(&mut self, clock: C) -> &mut Self
    where
        C: Clock + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// 指定されたブロックサイズ列を扱う`AllocatorEngine`を構築する.
    ///
    /// # Errors
    ///
    /// `sizes`が空、あるいは`0`を含んでいる場合には、
    /// 種類が`ErrorKind::InvalidConfiguration`のエラーが返される.
    pub fn build(&self, sizes: &[u32]) -> Result<AllocatorEngine> {
        let pool = track!(BlockPool::new(sizes))?;
        let metrics = EngineMetrics::new(&self.metrics, pool.total_capacity());
        info!(
            self.logger,
            "Allocator engine is built";
            "blocks" => pool.len(),
            "capacity" => pool.total_capacity(),
            "overflow_capacity" => self.overflow_capacity
        );
        Ok(AllocatorEngine {
            pool,
            ledger: AllocationLedger::new(),
            overflow: OverflowQueue::new(self.overflow_capacity),
            timing: RequestTimingTracker::new(),
            clock: Arc::clone(&self.clock),
            policy: self.unknown_strategy_policy,
            placed_requests: 0,
            logger: self.logger.clone(),
            metrics,
        })
    }
}
impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
