//! # ビジネスイベントログとエラーコンテキストの構造化ヘルパー
//!
//! `jq` で効率的に調査できるよう、ログフィールドの命名規約と
//! ヘルパーマクロを提供する。
//!
//! ## ビジネスイベント
//!
//! [`log_business_event!`] マクロで出力する。`event.kind = "business_event"` マーカーが
//! 自動付与され、`jq 'select(.["event.kind"] == "business_event")'` でフィルタできる。
//!
//! ## エラーコンテキスト
//!
//! `tracing::error!` に `error.category` + `error.kind` フィールドを直接追加する。
//! 定数は [`error`] モジュールで提供。
//!
//! ## フィールド命名規約
//!
//! ドット記法（`event.category`、`error.kind`）を使用。tracing の
//! `$($field:ident).+` パターンでサポートされ、JSON 出力でフラットなキーになる。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、
/// `tracing::info!` レベルで出力する。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: イベントカテゴリ（[`event::category`] の定数を使用）
/// - `event.action`: アクション名（[`event::action`] の定数を使用）
/// - `event.result`: 結果（[`event::result`] の定数を使用）
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const SCHEDULE: &str = "schedule";
        pub const MAIL: &str = "mail";
    }

    /// イベントアクション
    pub mod action {
        // スケジュール
        pub const TRIGGER_EVALUATED: &str = "trigger.evaluated";

        // メール
        pub const ATTACHMENT_SKIPPED: &str = "attachment.skipped";
        pub const MAIL_SENT: &str = "mail.sent";
        pub const MAIL_FAILED: &str = "mail.failed";
        pub const MAIL_DRY_RUN: &str = "mail.dry_run";
    }

    /// イベント結果
    pub mod result {
        pub const SEND: &str = "send";
        pub const SKIP: &str = "skip";
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}

/// エラーコンテキストフィールドの定数
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// 設定（環境変数）
        pub const CONFIGURATION: &str = "configuration";
        /// 外部サービス呼び出し（SMTP リレー）
        pub const EXTERNAL_SERVICE: &str = "external_service";
    }

    /// エラー種別
    pub mod kind {
        pub const MISSING_VALUE: &str = "missing_value";
        pub const INVALID_VALUE: &str = "invalid_value";
        pub const SMTP: &str = "smtp";
        pub const MESSAGE_BUILD: &str = "message_build";
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_log_business_eventはsubscriberなしでもパニックしない() {
        crate::log_business_event!(
            event.category = super::event::category::SCHEDULE,
            event.action = super::event::action::TRIGGER_EVALUATED,
            event.result = super::event::result::SKIP,
            "テストイベント"
        );
    }

    #[test]
    fn test_log_business_eventはsubscriber下で出力できる() {
        let subscriber = tracing_subscriber::fmt().with_test_writer().finish();
        tracing::subscriber::with_default(subscriber, || {
            crate::log_business_event!(
                event.category = super::event::category::MAIL,
                event.action = super::event::action::MAIL_SENT,
                event.result = super::event::result::SUCCESS,
                recipients = "a@example.com",
                "テストイベント"
            );
        });
    }
}
