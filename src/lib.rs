//! Fit-strategy Block Allocator.
//!
//! `fitalloc`は、固定長ブロック群(駐車スペース)に対して、固定長の割当要求(車両)を
//! 古典的な配置戦略で割り当てていく、メモリ上のアロケータシミュレータ.
//!
//! # 特徴
//!
//! - 配置戦略として"best-fit"、"first-fit"、"worst-fit"の三種類をサポート
//! - ブロックは割当の度にその場で分割され、空き容量が減っていく(コンパクションや結合は行わない)
//! - 各割当要求の滞在時間(割当から解放まで)を記録可能
//! - 未知の戦略が指定された要求は、上限付きのオーバーフローキューに保持される
//! - 状態は永続化されず、シミュレーションの実行毎に新規に構築される
//!
//! # モジュールの依存関係
//!
//! ```text
//! simulation => engine => {strategy, ledger, queue, timing} => pool
//! ```
//!
//! - [engine]モジュール:
//!   - 主に[AllocatorEngine]構造体を提供
//!   - 利用者が直接触るのは、基本的にはこの構造体
//! - [pool]モジュール:
//!   - ブロック群の容量と空き容量を管理する[BlockPool]を提供
//! - [strategy]モジュール:
//!   - 割当先ブロックを選択する純粋関数群を提供
//! - [simulation]モジュール:
//!   - 要求列を一括で処理して、戦略同士を比較するためのドライバ
//!
//! [engine]: ./engine/index.html
//! [AllocatorEngine]: ./engine/struct.AllocatorEngine.html
//! [pool]: ./pool/index.html
//! [BlockPool]: ./pool/struct.BlockPool.html
//! [strategy]: ./strategy/index.html
//! [simulation]: ./simulation/index.html
#![warn(missing_docs)]
extern crate prometrics;
#[macro_use]
extern crate trackable;
extern crate uuid;
#[macro_use]
extern crate slog;

pub use crate::error::{Error, ErrorKind};

pub mod engine;
pub mod ledger;
pub mod metrics;
pub mod pool;
pub mod queue;
pub mod request;
pub mod simulation;
pub mod strategy;
pub mod timing;

mod error;

/// crate固有の`Result`型.
pub type Result<T> = std::result::Result<T, Error>;
