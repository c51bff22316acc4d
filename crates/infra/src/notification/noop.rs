//! Noop 通知送信実装
//!
//! メールを実際に送信せず、送信内容のログ出力のみ行う。
//! `DRY_RUN=true` のときに使用する。

use async_trait::async_trait;
use monthly_mailer_domain::{message::AssembledMessage, notification::NotificationError};

use super::MailSender;

/// Noop 通知送信（ドライラン、ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NoopMailSender;

#[async_trait]
impl MailSender for NoopMailSender {
    async fn send(&self, message: &AssembledMessage) -> Result<(), NotificationError> {
        let recipients: Vec<&str> = message.recipients().iter().map(|r| r.as_str()).collect();

        tracing::info!(
            subject = %message.headers().subject(),
            recipients = %recipients.join(", "),
            parts = message.parts().len(),
            "DRY_RUN: 送信タイミングですが、メールは送信しません（would send）"
        );
        Ok(())
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}
