//! 要求列を一括で処理するシミュレーションドライバ.
//!
//! 実行毎に新しいエンジンを構築し、要求列を先頭から順に割り当てていく.
//! 同じブロックサイズ列、要求列、戦略からは、常に同じ配置結果が得られる.
use crate::engine::{EngineBuilder, Placement};
use crate::ledger::AllocationRecord;
use crate::request::RequestId;
use crate::strategy::Strategy;
use crate::Result;

/// 一回のシミュレーションの結果.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    /// 使用した戦略
    pub strategy: Strategy,

    /// 要求毎の結果(要求列と同じ順序)
    pub placements: Vec<Placement>,

    /// 配置に成功した割当群(割当順)
    pub allocations: Vec<AllocationRecord>,

    /// 全要求処理後の無駄領域
    pub wasted_space: u64,

    /// 配置成功率(百分率)
    pub success_rate: f64,
}

/// デフォルト設定のエンジンでシミュレーションを実行する.
///
/// # Examples
///
/// ```
/// use fitalloc::simulation::run_simulation;
/// use fitalloc::strategy::Strategy;
///
/// let report = run_simulation(&[100, 500, 200, 300, 600], &[212, 417, 112, 426], Strategy::BestFit).unwrap();
/// assert_eq!(report.success_rate, 100.0);
/// assert_eq!(report.wasted_space, 533);
/// ```
pub fn run_simulation(
    block_sizes: &[u32],
    request_sizes: &[u32],
    strategy: Strategy,
) -> Result<SimulationReport> {
    track!(run_simulation_with(
        &EngineBuilder::new(),
        block_sizes,
        request_sizes,
        strategy
    ))
}

/// 指定のビルダで構築したエンジンでシミュレーションを実行する.
///
/// 各要求のIDはランダムに生成される.
pub fn run_simulation_with(
    builder: &EngineBuilder,
    block_sizes: &[u32],
    request_sizes: &[u32],
    strategy: Strategy,
) -> Result<SimulationReport> {
    let mut engine = track!(builder.build(block_sizes))?;
    let mut placements = Vec::with_capacity(request_sizes.len());
    for &size in request_sizes {
        let placement = track!(engine.allocate_with(RequestId::generate(), size, strategy))?;
        placements.push(placement);
    }
    let report = engine.report(request_sizes.len() as u64);
    Ok(SimulationReport {
        strategy,
        placements,
        allocations: engine.snapshot().allocations,
        wasted_space: report.wasted_space,
        success_rate: report.success_rate,
    })
}

/// 全ての戦略で同じ入力のシミュレーションを実行する.
///
/// 結果は`Strategy::ALL`の順序で返される.
pub fn compare_strategies(
    block_sizes: &[u32],
    request_sizes: &[u32],
) -> Result<Vec<SimulationReport>> {
    Strategy::ALL
        .iter()
        .map(|&s| track!(run_simulation(block_sizes, request_sizes, s)))
        .collect()
}
