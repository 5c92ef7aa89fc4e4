//! Block
use std::fmt;

/// プール内のブロックの位置.
///
/// プールの構築時に割り当てられ、以後変わることはない.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockIndex(usize);
impl BlockIndex {
    /// 位置を`usize`として返す.
    pub fn as_usize(self) -> usize {
        self.0
    }
}
impl From<usize> for BlockIndex {
    fn from(f: usize) -> Self {
        BlockIndex(f)
    }
}
impl fmt::Display for BlockIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 一つのブロック(駐車スペース).
///
/// `capacity`は構築後に変化せず、`remaining`は常に`0..=capacity`の範囲に収まる.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    index: BlockIndex,
    capacity: u32,
    remaining: u32,
}
impl Block {
    pub(crate) fn new(index: BlockIndex, capacity: u32) -> Self {
        Block {
            index,
            capacity,
            remaining: capacity,
        }
    }

    /// プール内での位置.
    pub fn index(&self) -> BlockIndex {
        self.index
    }

    /// ブロックの容量.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// 現在の空き容量.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// 割当済みの容量.
    pub fn used(&self) -> u32 {
        self.capacity - self.remaining
    }

    /// 空き容量の中から`amount`分を確保する.
    ///
    /// 空き容量が足りない場合には、更新は行わず、関数の結果として`false`を返す.
    pub(crate) fn checked_reserve(&mut self, amount: u32) -> bool {
        if let Some(remaining) = self.remaining.checked_sub(amount) {
            self.remaining = remaining;
            true
        } else {
            false
        }
    }

    /// `amount`分を空き容量に戻す.
    ///
    /// それによって`capacity`を超過してしまう場合には、更新は行わず、関数の結果として`false`を返す.
    pub(crate) fn checked_release(&mut self, amount: u32) -> bool {
        match self.remaining.checked_add(amount) {
            Some(remaining) if remaining <= self.capacity => {
                self.remaining = remaining;
                true
            }
            _ => false,
        }
    }
}
