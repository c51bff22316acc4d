//! # 通知
//!
//! メール送信（トランスポート）で発生するエラーを定義する。
//!
//! 送信処理の実装はインフラ層（`monthly-mailer-infra`）にあり、
//! このエラーを返す。送信失敗はその起動において致命的で、再送は行わない。

use thiserror::Error;

/// 通知送信エラー
#[derive(Debug, Error)]
pub enum NotificationError {
    /// アドレスがトランスポートの形式として不正
    #[error("メールアドレスが不正: {0}")]
    InvalidAddress(String),

    /// MIME メッセージの構築に失敗
    #[error("メッセージ構築に失敗: {0}")]
    BuildFailed(String),

    /// メール送信に失敗（接続・認証・送信）
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),
}
