//! 生存中の割当の情報を管理するための台帳.
use std::slice;

use crate::pool::BlockIndex;
use crate::request::RequestId;

/// 一つの割当の記録.
///
/// 配置に成功した場合にのみ生成され、同じIDの解放によってのみ取り除かれる.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AllocationRecord {
    /// 要求のID
    pub request_id: RequestId,

    /// 要求サイズ
    pub request_size: u32,

    /// 割当先のブロック
    pub block_index: BlockIndex,
}

/// 生存中の割当群を保持する台帳.
///
/// どの要求がどのブロックを占有しているか、の唯一の情報源であり、
/// 解放処理はこの台帳の記録に基づいて行われる.
///
/// 要素は割当順に保持される.
/// ID による検索は線形探索だが、シミュレーションの規模では問題にならない.
#[derive(Debug, Clone, Default)]
pub struct AllocationLedger {
    records: Vec<AllocationRecord>,
}
impl AllocationLedger {
    /// 新しい`AllocationLedger`インスタンスを生成する.
    pub fn new() -> Self {
        AllocationLedger {
            records: Vec::new(),
        }
    }

    /// 指定されたIDの記録を検索する.
    pub fn get(&self, request_id: &RequestId) -> Option<&AllocationRecord> {
        self.records.iter().find(|r| r.request_id == *request_id)
    }

    /// 指定されたIDの記録が存在するかどうかを判定する.
    pub fn contains(&self, request_id: &RequestId) -> bool {
        self.get(request_id).is_some()
    }

    /// 新規の記録を末尾に追加する.
    pub fn append(&mut self, record: AllocationRecord) {
        self.records.push(record);
    }

    /// 指定されたIDの記録を取り除く.
    ///
    /// 残りの記録の相対的な順序は維持される.
    pub fn remove(&mut self, request_id: &RequestId) -> Option<AllocationRecord> {
        let position = self
            .records
            .iter()
            .position(|r| r.request_id == *request_id)?;
        Some(self.records.remove(position))
    }

    /// 台帳のサイズ(i.e., 生存中の割当数)を返す.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 台帳が空かどうかを判定する.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 記録を割当順に走査するためのイテレータを返す.
    pub fn iter(&self) -> slice::Iter<AllocationRecord> {
        self.records.iter()
    }

    /// 指定されたブロックに割り当てられている要求サイズの合計を返す.
    pub fn used_in(&self, block_index: BlockIndex) -> u64 {
        self.records
            .iter()
            .filter(|r| r.block_index == block_index)
            .map(|r| u64::from(r.request_size))
            .sum()
    }
}
