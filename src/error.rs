use trackable;

/// crate固有のエラー型.
#[derive(Debug, Clone, TrackableError)]
pub struct Error(trackable::error::TrackableError<ErrorKind>);

/// 発生し得るエラーの種別.
///
/// いずれのエラーも局所的かつ回復可能であり、
/// エラーを返した後もエンジンのインスタンスは引き続き利用可能である.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// ブロックサイズの設定が不正.
    ///
    /// ブロックサイズ列が空、あるいは`0`を含んでいる場合に返される.
    ///
    /// # 典型的な対応策
    ///
    /// - 利用者側で設定を修正した上で、エンジンを構築し直す
    InvalidConfiguration,

    /// 割当要求が不正.
    ///
    /// 要求サイズが`0`の場合や、既に割当済みのIDが再度指定された場合等に返される.
    ///
    /// # 典型的な対応策
    ///
    /// - 利用者側のプログラムを修正して入力を正しくする
    InvalidRequest,

    /// 解放対象の割当が存在しない.
    ///
    /// # 典型的な対応策
    ///
    /// - 何もしない (既に解放済みの可能性が高い)
    RecordNotFound,

    /// 内部状態が不整合に陥っている.
    ///
    /// プログラムにバグがあることを示している.
    ///
    /// # 典型的な対応策
    ///
    /// - バグ修正を行ってプログラムを更新する
    InconsistentState,
}
impl trackable::error::ErrorKind for ErrorKind {}
