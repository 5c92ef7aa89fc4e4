//! 割当先ブロックの選択戦略.
//!
//! 各戦略は、プールの現在の空き容量列と要求サイズのみを参照する純粋関数であり、
//! 状態の更新は一切行わない.
//!
//! いずれの戦略もブロック数に対して線形時間で動作し、結果は決定的である.
use std::fmt;
use std::str::FromStr;

use crate::pool::{BlockIndex, BlockPool};
use crate::{Error, ErrorKind, Result};

/// 配置戦略.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// 要求サイズを満たすブロックの中で、余りが最小のものを選択する.
    BestFit,

    /// プール内の順序で走査して、要求サイズを満たす最初のブロックを選択する.
    FirstFit,

    /// 要求サイズを満たすブロックの中で、余りが最大のものを選択する.
    WorstFit,
}
impl Strategy {
    /// 全ての戦略.
    pub const ALL: [Strategy; 3] = [Strategy::BestFit, Strategy::FirstFit, Strategy::WorstFit];

    /// 戦略の文字列表現(タグ)を返す.
    pub fn as_tag(self) -> &'static str {
        match self {
            Strategy::BestFit => "best-fit",
            Strategy::FirstFit => "first-fit",
            Strategy::WorstFit => "worst-fit",
        }
    }

    /// タグに対応する戦略を返す.
    ///
    /// 未知のタグの場合には`None`が返される.
    ///
    /// # Examples
    ///
    /// ```
    /// use fitalloc::strategy::Strategy;
    ///
    /// assert_eq!(Strategy::from_tag("worst-fit"), Some(Strategy::WorstFit));
    /// assert_eq!(Strategy::from_tag("next-fit"), None);
    /// ```
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "best-fit" => Some(Strategy::BestFit),
            "first-fit" => Some(Strategy::FirstFit),
            "worst-fit" => Some(Strategy::WorstFit),
            _ => None,
        }
    }

    /// `pool`の中から`size`の要求を配置するブロックを選択する.
    ///
    /// 要求サイズを満たすブロックが存在しない場合には`None`が返される.
    pub fn select(self, pool: &BlockPool, size: u32) -> Option<BlockIndex> {
        let remainings = pool.remainings();
        match self {
            Strategy::BestFit => best_fit(remainings, size),
            Strategy::FirstFit => first_fit(remainings, size),
            Strategy::WorstFit => worst_fit(remainings, size),
        }
    }
}
impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}
impl FromStr for Strategy {
    type Err = Error;

    /// タグから`Strategy`を生成する.
    ///
    /// # Errors
    ///
    /// 未知のタグが渡された場合には、種類が`ErrorKind::InvalidRequest`のエラーが返される.
    fn from_str(s: &str) -> Result<Self> {
        let strategy = track_assert_some!(
            Strategy::from_tag(s),
            ErrorKind::InvalidRequest,
            "Unknown strategy: {:?}",
            s
        );
        Ok(strategy)
    }
}

/// 空き容量列を先頭から走査して、`size`以上の最初の位置を返す.
pub fn first_fit<I>(remainings: I, size: u32) -> Option<BlockIndex>
where
    I: IntoIterator<Item = u32>,
{
    remainings
        .into_iter()
        .position(|remaining| remaining >= size)
        .map(BlockIndex::from)
}

/// 余り(`remaining - size`)が最小となる位置を返す.
///
/// 同点の場合には、先に現れた(位置が小さい)方が選ばれる.
pub fn best_fit<I>(remainings: I, size: u32) -> Option<BlockIndex>
where
    I: IntoIterator<Item = u32>,
{
    let mut best: Option<(usize, u32)> = None;
    for (i, remaining) in remainings.into_iter().enumerate() {
        if remaining < size {
            continue;
        }
        let waste = remaining - size;
        // 厳密な`<`で更新するので、同点時には先勝ちとなる
        if best.map_or(true, |(_, min_waste)| waste < min_waste) {
            best = Some((i, waste));
        }
    }
    best.map(|(i, _)| BlockIndex::from(i))
}

/// 余り(`remaining - size`)が最大となる位置を返す.
///
/// 同点の場合には、先に現れた(位置が小さい)方が選ばれる.
pub fn worst_fit<I>(remainings: I, size: u32) -> Option<BlockIndex>
where
    I: IntoIterator<Item = u32>,
{
    let mut worst: Option<(usize, u32)> = None;
    for (i, remaining) in remainings.into_iter().enumerate() {
        if remaining < size {
            continue;
        }
        let waste = remaining - size;
        if worst.map_or(true, |(_, max_waste)| waste > max_waste) {
            worst = Some((i, waste));
        }
    }
    worst.map(|(i, _)| BlockIndex::from(i))
}
