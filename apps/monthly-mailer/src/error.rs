//! # Monthly Mailer エラー定義
//!
//! 設定読み込み時に発生するエラーを定義する。
//! 設定エラーは致命的で、送信判定やメッセージ組み立ての前に起動を中断する。

use monthly_mailer_domain::{DomainError, notification::NotificationError};
use monthly_mailer_shared::event_log::error::kind;
use thiserror::Error;

/// 設定エラー
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 必須の値が未設定または空白のみ
    #[error("必須の環境変数が設定されていません: {0}")]
    Missing(&'static str),

    /// 数値として解釈できない
    #[error("環境変数 {name} の値が数値として不正です: {value:?}")]
    InvalidNumber {
        name:  &'static str,
        value: String,
    },

    /// 値の範囲や形式が不正
    #[error("環境変数 {name} の値が不正です: {source}")]
    Invalid {
        name:   &'static str,
        #[source]
        source: DomainError,
    },

    /// 形式は満たすが SMTP で使えないメールアドレス
    #[error("環境変数 {name} のメールアドレスは送信に使えません: {source}")]
    Undeliverable {
        name:   &'static str,
        #[source]
        source: NotificationError,
    },
}

impl ConfigError {
    /// ログの `error.kind` に出力する種別
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Missing(_) => kind::MISSING_VALUE,
            Self::InvalidNumber { .. } | Self::Invalid { .. } | Self::Undeliverable { .. } => {
                kind::INVALID_VALUE
            }
        }
    }

    /// 原因となった環境変数名
    pub fn variable(&self) -> &'static str {
        match self {
            Self::Missing(name)
            | Self::InvalidNumber { name, .. }
            | Self::Invalid { name, .. }
            | Self::Undeliverable { name, .. } => name,
        }
    }
}
