//! 割当要求関連のデータ構造群.
//!
//! "要求"とは、`fitalloc`における割当の単位.
//! 各要求は「文字列のID」と「正の整数のサイズ」から構成される.
use std::fmt;
use uuid::Uuid;

/// 割当要求の識別子.
///
/// 同時に生存している割当同士の間では、識別子は一意である必要がある.
#[derive(Clone, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct RequestId(String);
impl RequestId {
    /// 新しい`RequestId`インスタンスを生成する.
    ///
    /// # Examples
    ///
    /// ```
    /// use fitalloc::request::RequestId;
    ///
    /// assert_eq!(RequestId::new("car-1").as_str(), "car-1");
    /// ```
    pub fn new<T: Into<String>>(id: T) -> Self {
        RequestId(id.into())
    }

    /// ランダムな識別子を生成する.
    ///
    /// 識別子は配置結果には影響しないので、シミュレーションの決定性は損なわれない.
    pub fn generate() -> Self {
        RequestId(Uuid::new_v4().to_string())
    }

    /// 識別子の文字列表現を返す.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "RequestId({:?})", self.0)
    }
}
impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl<'a> From<&'a str> for RequestId {
    fn from(f: &'a str) -> Self {
        RequestId::new(f)
    }
}
impl From<String> for RequestId {
    fn from(f: String) -> Self {
        RequestId(f)
    }
}
