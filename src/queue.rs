//! 配置できなかった要求を保持するためのオーバーフローキュー.
use std::collections::{vec_deque, VecDeque};

use crate::request::RequestId;

/// オーバーフローキューのデフォルトの上限.
pub const DEFAULT_OVERFLOW_CAPACITY: usize = 5;

/// 未知の戦略が指定された要求をどう扱うか
/// default は Enqueue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownStrategyPolicy {
    /// 配置を試みずに、要求のIDをオーバーフローキューに積む.
    ///
    /// キューが上限に達している場合には、要求は何の通知もなく捨てられる.
    Enqueue,

    /// 種類が`ErrorKind::InvalidRequest`のエラーとして拒否する.
    Reject,
}
impl Default for UnknownStrategyPolicy {
    fn default() -> Self {
        UnknownStrategyPolicy::Enqueue
    }
}

/// 上限付きの要求IDのキュー.
///
/// 上限に達した後に追加された要求は受け付けられない(既存の要素が押し出されることはない).
///
/// キューの要素が自動的に取り出されることはなく、
/// 再割当を試みる場合には、利用者が明示的に取り出す必要がある.
#[derive(Debug, Clone)]
pub struct OverflowQueue {
    capacity: usize,
    items: VecDeque<RequestId>,
}
impl OverflowQueue {
    /// 上限が`capacity`の`OverflowQueue`インスタンスを生成する.
    pub fn new(capacity: usize) -> Self {
        OverflowQueue {
            capacity,
            items: VecDeque::with_capacity(capacity),
        }
    }

    /// 要求IDを末尾に追加する.
    ///
    /// キューが上限に達している場合には、何もせずに`false`を返す.
    pub fn push(&mut self, request_id: RequestId) -> bool {
        if self.items.len() < self.capacity {
            self.items.push_back(request_id);
            true
        } else {
            false
        }
    }

    /// 先頭の要求IDを取り出す.
    pub fn pop(&mut self) -> Option<RequestId> {
        self.items.pop_front()
    }

    /// 指定された要求IDを(最初に見つかった一つだけ)取り除く.
    pub fn remove(&mut self, request_id: &RequestId) -> bool {
        if let Some(i) = self.items.iter().position(|x| x == request_id) {
            self.items.remove(i);
            true
        } else {
            false
        }
    }

    /// キューの上限を返す.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// キューに格納されている要素数を返す.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// キューが空かどうかを判定する.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 要素を先頭から走査するためのイテレータを返す.
    pub fn iter(&self) -> vec_deque::Iter<RequestId> {
        self.items.iter()
    }
}
impl Default for OverflowQueue {
    fn default() -> Self {
        Self::new(DEFAULT_OVERFLOW_CAPACITY)
    }
}
