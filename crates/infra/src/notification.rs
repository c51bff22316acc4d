//! # 通知送信
//!
//! メール送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `MailSender` trait でメール送信を抽象化
//! - **2 つの実装**: SMTP（本番）、Noop（ドライラン）
//! - **環境変数切替**: `DRY_RUN` でランタイム選択
//! - **再送なし**: 送信失敗はそのまま返し、その起動は失敗として終了する

pub mod mime;
mod noop;
mod smtp;

use async_trait::async_trait;
use monthly_mailer_domain::{message::AssembledMessage, notification::NotificationError};
pub use noop::NoopMailSender;
pub use smtp::{SmtpMailSender, SmtpSettings};

/// メール送信トレイト
///
/// 組み立て済みメッセージを配送先（To + Cc + Bcc）へ送信する。
#[async_trait]
pub trait MailSender: Send + Sync {
    /// メールを送信する
    async fn send(&self, message: &AssembledMessage) -> Result<(), NotificationError>;

    /// 実際には送信しない実装か
    fn is_dry_run(&self) -> bool {
        false
    }
}
