//! [Prometheus][prometheus]用のメトリクス.
//!
//! [prometheus]: https://prometheus.io/
use prometrics::metrics::{Counter, Gauge, MetricBuilder};

/// 配置成功率(百分率)を計算する.
///
/// `total_requests`が`0`の場合には`0.0`を返す.
///
/// # Examples
///
/// ```
/// use fitalloc::metrics::success_rate;
///
/// assert_eq!(success_rate(3, 4), 75.0);
/// assert_eq!(success_rate(0, 0), 0.0);
/// ```
pub fn success_rate(placed: u64, total_requests: u64) -> f64 {
    if total_requests == 0 {
        0.0
    } else {
        placed as f64 / total_requests as f64 * 100.0
    }
}

/// [`AllocatorEngine`]のメトリクス.
///
/// ここで保持している値は観測用であり、
/// 無駄領域や成功率の計算には、エンジンの状態から都度算出した値が使われる.
///
/// [`AllocatorEngine`]: ../engine/struct.AllocatorEngine.html
#[derive(Debug, Clone)]
pub struct EngineMetrics {
    pub(crate) placed_requests: Counter,
    pub(crate) nofit_rejections: Counter,
    pub(crate) queued_requests: Counter,
    pub(crate) dropped_requests: Counter,
    pub(crate) released_requests: Counter,
    pub(crate) allocated_units: Counter,
    pub(crate) released_units: Counter,
    pub(crate) free_capacity: Gauge,
    pub(crate) capacity: u64,
}
impl EngineMetrics {
    /// 配置に成功した要求の数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// fitalloc_engine_placed_requests_total <COUNTER>
    /// ```
    pub fn placed_requests(&self) -> u64 {
        self.placed_requests.value() as u64
    }

    /// 要求サイズを満たすブロックが無かったために拒否された要求の数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// fitalloc_engine_nofit_rejections_total <COUNTER>
    /// ```
    pub fn nofit_rejections(&self) -> u64 {
        self.nofit_rejections.value() as u64
    }

    /// オーバーフローキューに積まれた要求の数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// fitalloc_engine_overflow_requests_total { result="queued" } <COUNTER>
    /// ```
    pub fn queued_requests(&self) -> u64 {
        self.queued_requests.value() as u64
    }

    /// オーバーフローキューが満杯だったために捨てられた要求の数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// fitalloc_engine_overflow_requests_total { result="dropped" } <COUNTER>
    /// ```
    pub fn dropped_requests(&self) -> u64 {
        self.dropped_requests.value() as u64
    }

    /// 解放された要求の数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// fitalloc_engine_released_requests_total <COUNTER>
    /// ```
    pub fn released_requests(&self) -> u64 {
        self.released_requests.value() as u64
    }

    /// これまでに割り当てた容量の合計.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// fitalloc_engine_allocated_units_total <COUNTER>
    /// ```
    pub fn allocated_units(&self) -> u64 {
        self.allocated_units.value() as u64
    }

    /// これまでに解放された容量の合計.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// fitalloc_engine_released_units_total <COUNTER>
    /// ```
    pub fn released_units(&self) -> u64 {
        self.released_units.value() as u64
    }

    /// 現在の空き容量の合計.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// fitalloc_engine_free_capacity <GAUGE>
    /// ```
    pub fn free_capacity(&self) -> u64 {
        self.free_capacity.value() as u64
    }

    /// プール全体の容量.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// 現在の使用量.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// fitalloc_engine_allocated_units_total - fitalloc_engine_released_units_total
    /// ```
    pub fn usage_units(&self) -> u64 {
        // NOTE: 以下の順番で値を取得しないとアンダーフローする可能性がある
        let dec = self.released_units();
        let inc = self.allocated_units();
        inc - dec
    }

    pub(crate) fn new(builder: &MetricBuilder, capacity: u64) -> Self {
        let mut builder = builder.clone();
        builder.namespace("fitalloc").subsystem("engine");
        let metrics = EngineMetrics {
            placed_requests: builder
                .counter("placed_requests_total")
                .help("Number of requests placed into a block")
                .finish()
                .expect("Never fails"),
            nofit_rejections: builder
                .counter("nofit_rejections_total")
                .help("Number of requests rejected because no block was large enough")
                .finish()
                .expect("Never fails"),
            queued_requests: builder
                .counter("overflow_requests_total")
                .help("Number of requests routed to the overflow queue")
                .label("result", "queued")
                .finish()
                .expect("Never fails"),
            dropped_requests: builder
                .counter("overflow_requests_total")
                .help("Number of requests routed to the overflow queue")
                .label("result", "dropped")
                .finish()
                .expect("Never fails"),
            released_requests: builder
                .counter("released_requests_total")
                .help("Number of released requests")
                .finish()
                .expect("Never fails"),
            allocated_units: builder
                .counter("allocated_units_total")
                .help("Total size of allocated requests")
                .finish()
                .expect("Never fails"),
            released_units: builder
                .counter("released_units_total")
                .help("Total size of released requests")
                .finish()
                .expect("Never fails"),
            free_capacity: builder
                .gauge("free_capacity")
                .help("Sum of the remaining capacity of every block")
                .finish()
                .expect("Never fails"),
            capacity,
        };
        metrics.free_capacity.set(capacity as f64);
        metrics
    }

    pub(crate) fn count_placement(&self, size: u32, free: u64) {
        self.placed_requests.increment();
        self.allocated_units.add_u64(u64::from(size));
        self.free_capacity.set(free as f64);
    }

    pub(crate) fn count_releasion(&self, size: u32, free: u64) {
        self.released_requests.increment();
        self.released_units.add_u64(u64::from(size));
        self.free_capacity.set(free as f64);
    }
}
