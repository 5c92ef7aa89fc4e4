//! ブロックプール.
//!
//! プールは、構築時に与えられたサイズ列から、順序付きのブロック群を生成して保持する.
//!
//! ブロックの順序には意味があり、first-fitの走査順や、
//! best-fit/worst-fitの同点時の優先順位は、この順序によって決まる.
//!
//! プールが担当するのは容量の計算処理のみで、どの要求がどのブロックを使っているか、
//! という情報は[ledger](../ledger/index.html)モジュールが管理している.
use std::slice;

pub use self::block::{Block, BlockIndex};

use crate::{ErrorKind, Result};

mod block;

/// 順序付きのブロック群.
///
/// 各ブロックの空き容量を更新できるのは`try_reserve`と`release`の二つのメソッドのみであり、
/// それ以外の経路で容量が書き換えられることはない.
#[derive(Debug, Clone)]
pub struct BlockPool {
    blocks: Vec<Block>,
}
impl BlockPool {
    /// 指定されたサイズ列からプールを構築する.
    ///
    /// 各ブロックの空き容量は、容量と等しい値で初期化される.
    ///
    /// # Errors
    ///
    /// 以下の場合には、種類が`ErrorKind::InvalidConfiguration`のエラーが返される:
    ///
    /// - `sizes`が空
    /// - `sizes`が`0`を含んでいる
    ///
    /// # Examples
    ///
    /// ```
    /// use fitalloc::ErrorKind;
    /// use fitalloc::pool::BlockPool;
    ///
    /// let pool = BlockPool::new(&[2, 4, 6]).unwrap();
    /// assert_eq!(pool.len(), 3);
    /// assert_eq!(pool.total_free(), 12);
    ///
    /// assert_eq!(BlockPool::new(&[]).err().map(|e| *e.kind()),
    ///            Some(ErrorKind::InvalidConfiguration));
    /// assert_eq!(BlockPool::new(&[3, 0]).err().map(|e| *e.kind()),
    ///            Some(ErrorKind::InvalidConfiguration));
    /// ```
    pub fn new(sizes: &[u32]) -> Result<Self> {
        track_assert!(
            !sizes.is_empty(),
            ErrorKind::InvalidConfiguration,
            "Empty block size list"
        );
        let mut blocks = Vec::with_capacity(sizes.len());
        for (i, &size) in sizes.iter().enumerate() {
            track_assert!(
                size > 0,
                ErrorKind::InvalidConfiguration,
                "Non-positive block size: index={}, size={}",
                i,
                size
            );
            blocks.push(Block::new(BlockIndex::from(i), size));
        }
        Ok(BlockPool { blocks })
    }

    /// ブロック数を返す.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// プールが空かどうかを判定する.
    ///
    /// 構築に成功したプールは、常に一つ以上のブロックを保持している.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// 指定位置のブロックを返す.
    pub fn get(&self, index: BlockIndex) -> Option<&Block> {
        self.blocks.get(index.as_usize())
    }

    /// ブロック群をプール内の順序で走査するためのイテレータを返す.
    pub fn iter(&self) -> slice::Iter<Block> {
        self.blocks.iter()
    }

    /// 各ブロックの空き容量を、プール内の順序で走査するためのイテレータを返す.
    pub fn remainings(&self) -> Remainings {
        Remainings(self.blocks.iter())
    }

    /// `index`のブロックから`amount`分の容量を確保する.
    ///
    /// # Errors
    ///
    /// `index`が範囲外の場合や、空き容量が`amount`に満たない場合には、
    /// 種類が`ErrorKind::InvalidRequest`のエラーが返される.
    /// その場合、プールの状態は変更されない.
    pub fn try_reserve(&mut self, index: BlockIndex, amount: u32) -> Result<()> {
        let block = track_assert_some!(
            self.blocks.get_mut(index.as_usize()),
            ErrorKind::InvalidRequest,
            "No such block: {}",
            index
        );
        track_assert!(
            block.checked_reserve(amount),
            ErrorKind::InvalidRequest,
            "Insufficient space: index={}, remaining={}, amount={}",
            index,
            block.remaining(),
            amount
        );
        Ok(())
    }

    /// `index`のブロックに`amount`分の容量を戻す.
    ///
    /// # Errors
    ///
    /// `index`が範囲外の場合や、解放によって空き容量が容量を超過してしまう場合には、
    /// 種類が`ErrorKind::InvalidRequest`のエラーが返される.
    /// その場合、プールの状態は変更されない.
    pub fn release(&mut self, index: BlockIndex, amount: u32) -> Result<()> {
        let block = track_assert_some!(
            self.blocks.get_mut(index.as_usize()),
            ErrorKind::InvalidRequest,
            "No such block: {}",
            index
        );
        track_assert!(
            block.checked_release(amount),
            ErrorKind::InvalidRequest,
            "Over-release: index={}, remaining={}, capacity={}, amount={}",
            index,
            block.remaining(),
            block.capacity(),
            amount
        );
        Ok(())
    }

    /// 全ブロックの空き容量の合計 (i.e., "wasted space") を返す.
    pub fn total_free(&self) -> u64 {
        self.remainings().map(u64::from).sum()
    }

    /// 全ブロックの容量の合計を返す.
    pub fn total_capacity(&self) -> u64 {
        self.blocks.iter().map(|b| u64::from(b.capacity())).sum()
    }
}

/// 各ブロックの空き容量を走査するためのイテレータ.
#[derive(Debug)]
pub struct Remainings<'a>(slice::Iter<'a, Block>);
impl<'a> Iterator for Remainings<'a> {
    type Item = u32;
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(Block::remaining)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use trackable::result::TestResult;

    use super::*;
    use crate::ErrorKind;

    #[test]
    fn it_works() -> TestResult {
        let mut pool = track!(BlockPool::new(&[2, 4, 6]))?;
        assert_eq!(pool.remainings().collect::<Vec<_>>(), vec![2, 4, 6]);
        assert_eq!(pool.total_capacity(), 12);

        track!(pool.try_reserve(BlockIndex::from(1), 3))?;
        assert_eq!(pool.remainings().collect::<Vec<_>>(), vec![2, 1, 6]);
        assert_eq!(pool.total_free(), 9);

        track!(pool.release(BlockIndex::from(1), 3))?;
        assert_eq!(pool.total_free(), 12);
        Ok(())
    }

    #[test]
    fn failed_operations_leave_pool_unchanged() -> TestResult {
        let mut pool = track!(BlockPool::new(&[1, 1]))?;

        let e = pool.try_reserve(BlockIndex::from(0), 2).err();
        assert_eq!(e.map(|e| *e.kind()), Some(ErrorKind::InvalidRequest));
        let e = pool.try_reserve(BlockIndex::from(2), 1).err();
        assert_eq!(e.map(|e| *e.kind()), Some(ErrorKind::InvalidRequest));
        let e = pool.release(BlockIndex::from(1), 1).err();
        assert_eq!(e.map(|e| *e.kind()), Some(ErrorKind::InvalidRequest));

        assert_eq!(pool.remainings().collect::<Vec<_>>(), vec![1, 1]);
        Ok(())
    }

    #[test]
    fn indices_are_stable() -> TestResult {
        let mut pool = track!(BlockPool::new(&[5, 3, 8]))?;
        track!(pool.try_reserve(BlockIndex::from(2), 8))?;
        track!(pool.try_reserve(BlockIndex::from(0), 1))?;
        let indices = pool.iter().map(|b| b.index().as_usize()).collect::<Vec<_>>();
        assert_eq!(indices, vec![0, 1, 2]);
        let capacities = pool.iter().map(Block::capacity).collect::<Vec<_>>();
        assert_eq!(capacities, vec![5, 3, 8]);
        Ok(())
    }
}
