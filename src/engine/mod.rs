//! アロケータエンジン.
//!
//! 一回のシミュレーション実行の間、[BlockPool]と[AllocationLedger]を排他的に所有し、
//! 割当要求を配置戦略に従ってブロックに割り当てる.
//!
//! 全ての操作は同期的に実行され、完全に反映されるか、一切反映されないかのいずれかとなる.
//! 並列にシミュレーションを行いたい場合には、独立したエンジンインスタンスを複数構築すること.
//!
//! [BlockPool]: ../pool/struct.BlockPool.html
//! [AllocationLedger]: ../ledger/struct.AllocationLedger.html
use slog::Logger;
use std::sync::Arc;
use std::time::Duration;

pub use self::builder::EngineBuilder;

use crate::ledger::{AllocationLedger, AllocationRecord};
use crate::metrics::{self, EngineMetrics};
use crate::pool::{Block, BlockIndex, BlockPool};
use crate::queue::{OverflowQueue, UnknownStrategyPolicy};
use crate::request::RequestId;
use crate::strategy::Strategy;
use crate::timing::{Clock, RequestTimingTracker};
use crate::{ErrorKind, Result};

mod builder;

/// 割当要求の結果.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// 指定のブロックに配置された.
    Placed(BlockIndex),

    /// 配置されなかった.
    Rejected(Rejection),
}
impl Placement {
    /// 配置に成功したかどうかを判定する.
    pub fn is_placed(&self) -> bool {
        self.block_index().is_some()
    }

    /// 配置先のブロックを返す.
    pub fn block_index(&self) -> Option<BlockIndex> {
        if let Placement::Placed(index) = *self {
            Some(index)
        } else {
            None
        }
    }
}

/// 配置されなかった理由.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// 要求サイズを満たすブロックが存在しなかった.
    ///
    /// 通常の(よくある)結果であり、エラーではない.
    NoFit,

    /// 未知の戦略が指定されたため、配置を試みずにオーバーフローキューに積まれた.
    Queued,

    /// 未知の戦略が指定されたが、オーバーフローキューが満杯だったため捨てられた.
    Dropped,
}

/// エンジンの状態のスナップショット.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSnapshot {
    /// ブロック群(プール内の順序)
    pub blocks: Vec<Block>,

    /// 生存中の割当群(割当順)
    pub allocations: Vec<AllocationRecord>,

    /// オーバーフローキューの内容(先頭から)
    pub overflow_queue: Vec<RequestId>,
}

/// 無駄領域と配置成功率.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineReport {
    /// 全ブロックの空き容量の合計
    pub wasted_space: u64,

    /// 配置成功率(百分率)
    pub success_rate: f64,
}

/// アロケータエンジン.
#[derive(Debug)]
pub struct AllocatorEngine {
    pool: BlockPool,
    ledger: AllocationLedger,
    overflow: OverflowQueue,
    timing: RequestTimingTracker,
    clock: Arc<dyn Clock>,
    policy: UnknownStrategyPolicy,
    placed_requests: u64,
    logger: Logger,
    metrics: EngineMetrics,
}
impl AllocatorEngine {
    /// デフォルト設定で、エンジンを構築する.
    pub fn new(sizes: &[u32]) -> Result<Self> {
        track!(EngineBuilder::new().build(sizes))
    }

    /// 戦略のタグを指定して、割当を行う.
    ///
    /// タグが`"best-fit"`、`"first-fit"`、`"worst-fit"`のいずれでもない場合には、
    /// 配置は試みられず、`UnknownStrategyPolicy`に従って処理される:
    ///
    /// - `Enqueue`: オーバーフローキューに空きがあれば積み、なければ捨てる
    /// - `Reject`: エラーを返す
    ///
    /// # Errors
    ///
    /// 以下の場合には、種類が`ErrorKind::InvalidRequest`のエラーが返される:
    ///
    /// - `size`が`0`
    /// - `request_id`の割当が既に存在する
    /// - 未知のタグが指定され、かつ、ポリシーが`UnknownStrategyPolicy::Reject`
    ///
    /// エラーの場合、エンジンの状態は一切変更されない.
    pub fn allocate<T>(&mut self, request_id: T, size: u32, strategy: &str) -> Result<Placement>
    where
        T: Into<RequestId>,
    {
        let request_id = request_id.into();
        track_assert!(
            size > 0,
            ErrorKind::InvalidRequest,
            "Zero-sized request: {}",
            request_id
        );
        if let Some(strategy) = Strategy::from_tag(strategy) {
            track!(self.allocate_with(request_id, size, strategy))
        } else {
            track!(self.handle_unknown_strategy(request_id, strategy))
        }
    }

    /// 指定の戦略で割当を行う.
    ///
    /// 要求サイズを満たすブロックが存在しない場合には`Placement::Rejected(Rejection::NoFit)`が返され、
    /// オーバーフローキューを含む一切の状態は変更されない.
    ///
    /// # Errors
    ///
    /// `size`が`0`の場合や、`request_id`の割当が既に存在する場合には、
    /// 種類が`ErrorKind::InvalidRequest`のエラーが返される.
    pub fn allocate_with<T>(
        &mut self,
        request_id: T,
        size: u32,
        strategy: Strategy,
    ) -> Result<Placement>
    where
        T: Into<RequestId>,
    {
        let request_id = request_id.into();
        track_assert!(
            size > 0,
            ErrorKind::InvalidRequest,
            "Zero-sized request: {}",
            request_id
        );
        track_assert!(
            !self.ledger.contains(&request_id),
            ErrorKind::InvalidRequest,
            "Already allocated: {}",
            request_id
        );

        let index = if let Some(index) = strategy.select(&self.pool, size) {
            index
        } else {
            self.metrics.nofit_rejections.increment();
            debug!(
                self.logger,
                "No block can hold the request";
                "request_id" => %request_id,
                "size" => size,
                "strategy" => strategy.as_tag()
            );
            return Ok(Placement::Rejected(Rejection::NoFit));
        };

        track!(self.pool.try_reserve(index, size))?;
        self.ledger.append(AllocationRecord {
            request_id: request_id.clone(),
            request_size: size,
            block_index: index,
        });
        self.timing.record_entry(request_id.clone(), self.clock.now());
        self.placed_requests += 1;
        self.metrics.count_placement(size, self.pool.total_free());
        debug!(
            self.logger,
            "Placed";
            "request_id" => %request_id,
            "size" => size,
            "strategy" => strategy.as_tag(),
            "block" => index.as_usize()
        );
        Ok(Placement::Placed(index))
    }

    /// 割当を解放して、解放された容量を返す.
    ///
    /// 解放時刻が記録され、以後は`dwell_time()`で滞在時間が取得可能となる.
    ///
    /// # Errors
    ///
    /// `request_id`の割当が存在しない場合には、種類が`ErrorKind::RecordNotFound`のエラーが返される.
    pub fn deallocate(&mut self, request_id: &RequestId) -> Result<u32> {
        let record = track_assert_some!(
            self.ledger.get(request_id).cloned(),
            ErrorKind::RecordNotFound,
            "No such allocation: {}",
            request_id
        );
        track!(self.pool.release(record.block_index, record.request_size))?;
        self.ledger.remove(request_id);
        self.timing.record_exit(request_id, self.clock.now());
        self.metrics
            .count_releasion(record.request_size, self.pool.total_free());
        debug!(
            self.logger,
            "Released";
            "request_id" => %request_id,
            "size" => record.request_size,
            "block" => record.block_index.as_usize()
        );
        Ok(record.request_size)
    }

    /// エンジンの状態のスナップショットを返す.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            blocks: self.pool.iter().cloned().collect(),
            allocations: self.ledger.iter().cloned().collect(),
            overflow_queue: self.overflow.iter().cloned().collect(),
        }
    }

    /// 無駄領域(全ブロックの空き容量の合計)を返す.
    pub fn wasted_space(&self) -> u64 {
        self.pool.total_free()
    }

    /// `total_requests`個の要求に対する配置成功率(百分率)を返す.
    ///
    /// `total_requests`が`0`の場合には`0.0`となる.
    pub fn success_rate(&self, total_requests: u64) -> f64 {
        metrics::success_rate(self.placed_requests, total_requests)
    }

    /// 無駄領域と配置成功率をまとめて返す.
    pub fn report(&self, total_requests: u64) -> EngineReport {
        EngineReport {
            wasted_space: self.wasted_space(),
            success_rate: self.success_rate(total_requests),
        }
    }

    /// これまでに配置に成功した要求の数を返す.
    pub fn placed_requests(&self) -> u64 {
        self.placed_requests
    }

    /// 滞在時間を返す.
    ///
    /// 割当記録がない場合や、まだ解放されていない場合には`None`が返される.
    pub fn dwell_time(&self, request_id: &RequestId) -> Option<Duration> {
        self.timing.dwell_time(request_id)
    }

    /// オーバーフローキューの先頭の要求IDを取り出す.
    ///
    /// 取り出したIDの再割当は、呼び出し側の責務となる.
    pub fn pop_overflow(&mut self) -> Option<RequestId> {
        self.overflow.pop()
    }

    /// オーバーフローキューから指定の要求IDを取り除く.
    pub fn remove_overflow(&mut self, request_id: &RequestId) -> bool {
        self.overflow.remove(request_id)
    }

    /// オーバーフローキューを返す.
    pub fn overflow_queue(&self) -> &OverflowQueue {
        &self.overflow
    }

    /// ブロックプールを返す.
    pub fn pool(&self) -> &BlockPool {
        &self.pool
    }

    /// 割当台帳を返す.
    pub fn ledger(&self) -> &AllocationLedger {
        &self.ledger
    }

    /// エンジンのメトリクスを返す.
    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    /// 各ブロックについて`remaining + (割当済みサイズの合計) == capacity`が成り立つかを検査する.
    ///
    /// # Errors
    ///
    /// 成り立たないブロックが存在する場合には、種類が`ErrorKind::InconsistentState`のエラーが返される.
    pub fn verify_conservation(&self) -> Result<()> {
        for block in self.pool.iter() {
            let used = self.ledger.used_in(block.index());
            track_assert_eq!(
                u64::from(block.remaining()) + used,
                u64::from(block.capacity()),
                ErrorKind::InconsistentState,
                "block={}",
                block.index()
            );
        }
        Ok(())
    }

    fn handle_unknown_strategy(&mut self, request_id: RequestId, tag: &str) -> Result<Placement> {
        if self.policy == UnknownStrategyPolicy::Reject {
            track_panic!(
                ErrorKind::InvalidRequest,
                "Unknown strategy: {:?} (request_id={})",
                tag,
                request_id
            );
        }
        if self.overflow.push(request_id.clone()) {
            self.metrics.queued_requests.increment();
            info!(
                self.logger,
                "Unknown strategy; the request is queued";
                "request_id" => %request_id,
                "strategy" => tag,
                "queue_len" => self.overflow.len()
            );
            Ok(Placement::Rejected(Rejection::Queued))
        } else {
            self.metrics.dropped_requests.increment();
            warn!(
                self.logger,
                "Unknown strategy and the overflow queue is full; the request is dropped";
                "request_id" => %request_id,
                "strategy" => tag,
                "queue_capacity" => self.overflow.capacity()
            );
            Ok(Placement::Rejected(Rejection::Dropped))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use trackable::result::TestResult;

    use super::*;
    use crate::timing::ManualClock;
    use crate::ErrorKind;

    fn id(s: &str) -> RequestId {
        RequestId::from(s)
    }

    fn remainings(engine: &AllocatorEngine) -> Vec<u32> {
        engine.pool().remainings().collect()
    }

    fn placed(i: usize) -> Placement {
        Placement::Placed(BlockIndex::from(i))
    }

    #[test]
    fn strategies_choose_expected_blocks() -> TestResult {
        for &(tag, expected) in &[("first-fit", 1), ("best-fit", 1), ("worst-fit", 2)] {
            let mut engine = track!(AllocatorEngine::new(&[2, 4, 6]))?;
            let placement = track!(engine.allocate("car", 3, tag))?;
            assert_eq!(placement, placed(expected), "strategy={}", tag);
        }
        Ok(())
    }

    #[test]
    fn no_fit_is_rejected_without_mutation() -> TestResult {
        for s in Strategy::ALL.iter() {
            let mut engine = track!(AllocatorEngine::new(&[1, 1]))?;
            let placement = track!(engine.allocate_with("truck", 2, *s))?;
            assert_eq!(placement, Placement::Rejected(Rejection::NoFit));
            assert_eq!(remainings(&engine), vec![1, 1]);
            assert!(engine.ledger().is_empty());
            assert!(engine.overflow_queue().is_empty());
            assert_eq!(engine.metrics().nofit_rejections(), 1);
        }
        Ok(())
    }

    #[test]
    fn allocate_and_deallocate_round_trip() -> TestResult {
        let mut engine = track!(AllocatorEngine::new(&[2, 4, 6]))?;
        let placement = track!(engine.allocate("a", 3, "best-fit"))?;
        assert_eq!(placement.block_index(), Some(BlockIndex::from(1)));
        assert_eq!(remainings(&engine), vec![2, 1, 6]);
        assert_eq!(engine.ledger().len(), 1);

        assert_eq!(track!(engine.deallocate(&id("a")))?, 3);
        assert_eq!(remainings(&engine), vec![2, 4, 6]);
        assert!(engine.ledger().is_empty());
        assert_eq!(engine.metrics().usage_units(), 0);
        Ok(())
    }

    #[test]
    fn blocks_are_split_in_place() -> TestResult {
        let mut engine = track!(AllocatorEngine::new(&[10]))?;
        assert!(track!(engine.allocate("a", 3, "first-fit"))?.is_placed());
        assert!(track!(engine.allocate("b", 4, "first-fit"))?.is_placed());
        assert!(track!(engine.allocate("c", 3, "first-fit"))?.is_placed());
        assert!(!track!(engine.allocate("d", 1, "first-fit"))?.is_placed());
        assert_eq!(remainings(&engine), vec![0]);

        track!(engine.deallocate(&id("b")))?;
        assert_eq!(remainings(&engine), vec![4]);
        track!(engine.verify_conservation())?;
        Ok(())
    }

    #[test]
    fn conservation_holds_over_mixed_sequence() -> TestResult {
        let sizes = [100, 500, 200, 300, 600];
        let mut engine = track!(AllocatorEngine::new(&sizes))?;
        let total = engine.pool().total_capacity();

        let requests = [
            ("p0", 212, "best-fit"),
            ("p1", 417, "worst-fit"),
            ("p2", 112, "first-fit"),
            ("p3", 426, "best-fit"),
            ("p4", 90, "worst-fit"),
        ];
        for &(name, size, tag) in &requests {
            track!(engine.allocate(name, size, tag))?;
            track!(engine.verify_conservation())?;
            let used: u64 = engine.ledger().iter().map(|r| u64::from(r.request_size)).sum();
            assert_eq!(engine.wasted_space() + used, total);
        }
        for &name in &["p2", "p0"] {
            track!(engine.deallocate(&id(name)))?;
            track!(engine.verify_conservation())?;
            let used: u64 = engine.ledger().iter().map(|r| u64::from(r.request_size)).sum();
            assert_eq!(engine.wasted_space() + used, total);
        }
        Ok(())
    }

    #[test]
    fn invalid_requests_are_reported() -> TestResult {
        let mut engine = track!(AllocatorEngine::new(&[4]))?;

        let e = engine.allocate("zero", 0, "first-fit").err();
        assert_eq!(e.map(|e| *e.kind()), Some(ErrorKind::InvalidRequest));

        track!(engine.allocate("a", 1, "first-fit"))?;
        let e = engine.allocate("a", 1, "best-fit").err();
        assert_eq!(e.map(|e| *e.kind()), Some(ErrorKind::InvalidRequest));

        let e = engine.deallocate(&id("nothing")).err();
        assert_eq!(e.map(|e| *e.kind()), Some(ErrorKind::RecordNotFound));

        // エラー後もエンジンは利用可能
        assert_eq!(remainings(&engine), vec![3]);
        assert!(track!(engine.allocate("b", 3, "worst-fit"))?.is_placed());
        Ok(())
    }

    #[test]
    fn double_deallocation_is_not_found() -> TestResult {
        let mut engine = track!(AllocatorEngine::new(&[4]))?;
        track!(engine.allocate("a", 2, "first-fit"))?;
        track!(engine.deallocate(&id("a")))?;
        let e = engine.deallocate(&id("a")).err();
        assert_eq!(e.map(|e| *e.kind()), Some(ErrorKind::RecordNotFound));
        assert_eq!(remainings(&engine), vec![4]);
        Ok(())
    }

    #[test]
    fn unknown_strategy_is_queued_up_to_bound() -> TestResult {
        let mut engine = track!(AllocatorEngine::new(&[10, 10]))?;
        let mut results = Vec::new();
        for i in 0..6 {
            results.push(track!(engine.allocate(format!("v{}", i), 1, "random-fit"))?);
        }
        assert_eq!(
            &results[..5],
            &[Placement::Rejected(Rejection::Queued); 5][..]
        );
        assert_eq!(results[5], Placement::Rejected(Rejection::Dropped));

        let snapshot = engine.snapshot();
        assert!(snapshot.allocations.is_empty());
        assert_eq!(snapshot.overflow_queue.len(), 5);
        assert_eq!(snapshot.overflow_queue[0], id("v0"));
        assert_eq!(remainings(&engine), vec![10, 10]);
        assert_eq!(engine.metrics().queued_requests(), 5);
        assert_eq!(engine.metrics().dropped_requests(), 1);

        // 取り出したIDは利用者が再割当する
        let retry = engine.pop_overflow().expect("Queued");
        assert!(track!(engine.allocate(retry, 1, "first-fit"))?.is_placed());
        assert!(engine.remove_overflow(&id("v3")));
        assert_eq!(engine.overflow_queue().len(), 3);
        Ok(())
    }

    #[test]
    fn unknown_strategy_can_be_rejected() -> TestResult {
        let mut engine = track!(EngineBuilder::new()
            .unknown_strategy_policy(UnknownStrategyPolicy::Reject)
            .build(&[10]))?;
        let e = engine.allocate("v", 1, "random-fit").err();
        assert_eq!(e.map(|e| *e.kind()), Some(ErrorKind::InvalidRequest));
        assert!(engine.overflow_queue().is_empty());
        Ok(())
    }

    #[test]
    fn overflow_capacity_is_configurable() -> TestResult {
        let mut engine = track!(EngineBuilder::new().overflow_capacity(1).build(&[10]))?;
        let first = track!(engine.allocate("v0", 1, ""))?;
        let second = track!(engine.allocate("v1", 1, ""))?;
        assert_eq!(first, Placement::Rejected(Rejection::Queued));
        assert_eq!(second, Placement::Rejected(Rejection::Dropped));
        Ok(())
    }

    #[test]
    fn dwell_time_uses_injected_clock() -> TestResult {
        let clock = ManualClock::new();
        let mut engine = track!(EngineBuilder::new().clock(clock.clone()).build(&[4, 4]))?;

        clock.set(Duration::from_secs(100));
        track!(engine.allocate("a", 2, "first-fit"))?;
        assert_eq!(engine.dwell_time(&id("a")), None);

        clock.advance(Duration::from_secs(42));
        track!(engine.deallocate(&id("a")))?;
        assert_eq!(engine.dwell_time(&id("a")), Some(Duration::from_secs(42)));
        assert_eq!(engine.dwell_time(&id("never")), None);

        // 再割当すると以前の記録は上書きされる
        track!(engine.allocate("a", 2, "first-fit"))?;
        assert_eq!(engine.dwell_time(&id("a")), None);
        Ok(())
    }

    #[test]
    fn report_works() -> TestResult {
        let mut engine = track!(AllocatorEngine::new(&[2, 4, 6]))?;
        assert_eq!(engine.report(0).success_rate, 0.0);

        track!(engine.allocate("a", 3, "first-fit"))?;
        track!(engine.allocate("b", 7, "first-fit"))?;
        let report = engine.report(2);
        assert_eq!(report.wasted_space, 9);
        assert_eq!(report.success_rate, 50.0);
        assert_eq!(engine.metrics().free_capacity(), 9);
        Ok(())
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let e = AllocatorEngine::new(&[]).err();
        assert_eq!(e.map(|e| *e.kind()), Some(ErrorKind::InvalidConfiguration));
        let e = AllocatorEngine::new(&[1, 0, 2]).err();
        assert_eq!(e.map(|e| *e.kind()), Some(ErrorKind::InvalidConfiguration));
    }
}
