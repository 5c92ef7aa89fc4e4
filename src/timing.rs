//! 要求の滞在時間の記録.
//!
//! 時刻の取得は[Clock]トレイト経由で行われるため、
//! テスト等では実時間に依存せずに滞在時間を検証することができる.
//!
//! [Clock]: ./trait.Clock.html
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::request::RequestId;

/// 現在時刻を返すオブジェクト.
pub trait Clock: Debug + Send + Sync {
    /// 現在時刻を返す.
    fn now(&self) -> SystemTime;
}

/// システムの実時間を返す`Clock`実装.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// 明示的に時刻を進める`Clock`実装.
///
/// クローンしたインスタンス同士は時刻を共有するので、
/// エンジンに渡した後でも、手元のインスタンス経由で時刻を操作できる.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    // `UNIX_EPOCH`からの経過ナノ秒
    nanos: Arc<AtomicU64>,
}
impl ManualClock {
    /// 時刻が`UNIX_EPOCH`の`ManualClock`インスタンスを生成する.
    pub fn new() -> Self {
        Self::default()
    }

    /// 時刻を`UNIX_EPOCH + since_epoch`に設定する.
    pub fn set(&self, since_epoch: Duration) {
        self.nanos.store(as_nanos(since_epoch), Ordering::SeqCst);
    }

    /// 時刻を`duration`だけ進める.
    pub fn advance(&self, duration: Duration) {
        self.nanos.fetch_add(as_nanos(duration), Ordering::SeqCst);
    }
}
impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

fn as_nanos(d: Duration) -> u64 {
    d.as_secs() * 1_000_000_000 + u64::from(d.subsec_nanos())
}

/// 一つの要求の入退時刻.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingRecord {
    /// 割当に成功した時刻
    pub entry_time: SystemTime,

    /// 解放された時刻
    pub exit_time: Option<SystemTime>,
}
impl TimingRecord {
    /// 滞在時間を返す.
    ///
    /// まだ解放されていない場合には`None`が返される.
    /// 退出時刻が入場時刻よりも前の場合には、ゼロとして扱われる.
    pub fn dwell_time(&self) -> Option<Duration> {
        let exit_time = self.exit_time?;
        Some(
            exit_time
                .duration_since(self.entry_time)
                .unwrap_or_else(|_| Duration::from_secs(0)),
        )
    }
}

/// 要求ID毎の入退時刻を保持する.
///
/// 一つのIDにつき保持される記録は一つのみで、
/// 解放済みのIDが再度割り当てられた場合には、以前の記録は上書きされる.
#[derive(Debug, Clone, Default)]
pub struct RequestTimingTracker {
    records: HashMap<RequestId, TimingRecord>,
}
impl RequestTimingTracker {
    /// 新しい`RequestTimingTracker`インスタンスを生成する.
    pub fn new() -> Self {
        Self::default()
    }

    /// 入場時刻を記録する.
    pub fn record_entry(&mut self, request_id: RequestId, time: SystemTime) {
        let record = TimingRecord {
            entry_time: time,
            exit_time: None,
        };
        self.records.insert(request_id, record);
    }

    /// 退出時刻を記録する.
    ///
    /// 入場時刻が記録されていないIDの場合には、何もせずに`false`を返す.
    pub fn record_exit(&mut self, request_id: &RequestId, time: SystemTime) -> bool {
        if let Some(record) = self.records.get_mut(request_id) {
            record.exit_time = Some(time);
            true
        } else {
            false
        }
    }

    /// 指定されたIDの記録を返す.
    pub fn get(&self, request_id: &RequestId) -> Option<&TimingRecord> {
        self.records.get(request_id)
    }

    /// 滞在時間を返す.
    ///
    /// 入場記録がない場合や、まだ退出していない場合には`None`が返される.
    pub fn dwell_time(&self, request_id: &RequestId) -> Option<Duration> {
        self.records.get(request_id).and_then(|r| r.dwell_time())
    }

    /// 記録されているIDの数を返す.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 記録が空かどうかを判定する.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
