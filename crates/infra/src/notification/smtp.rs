//! SMTP 通知送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! `use_tls` が有効な場合は STARTTLS で暗号化し、送信元アドレスとアプリパスワードで認証する。

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    transport::smtp::authentication::Credentials,
};
use monthly_mailer_domain::{
    clock::Clock,
    message::AssembledMessage,
    notification::NotificationError,
};

use super::{
    MailSender,
    mime::{MimeParams, render_message},
};

/// SMTP 接続設定
#[derive(Clone)]
pub struct SmtpSettings {
    /// SMTP リレーのホスト名（例: "smtp.office365.com"）
    pub host:     String,
    /// ポート番号（例: 587）
    pub port:     u16,
    /// STARTTLS を使うか
    pub use_tls:  bool,
    /// 認証ユーザー（送信元アドレス）
    pub username: String,
    /// 認証パスワード（アプリパスワード）
    pub password: String,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("use_tls", &self.use_tls)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// SMTP 通知送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
/// 接続プールや再送は行わず、1 回の起動で 1 通を送る。
pub struct SmtpMailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    clock:     Arc<dyn Clock>,
}

impl SmtpMailSender {
    /// 新しい SMTP 送信インスタンスを作成
    ///
    /// 接続はこの時点では行わず、送信時に確立する。
    pub fn new(settings: &SmtpSettings, clock: Arc<dyn Clock>) -> Result<Self, NotificationError> {
        let builder = if settings.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host).map_err(|e| {
                NotificationError::SendFailed(format!("TLS 設定の構築に失敗: {e}"))
            })?
        } else {
            // builder_dangerous: TLS なしで接続（ローカルの SMTP サーバー向け）
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
        };

        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        Ok(Self { transport, clock })
    }
}

#[async_trait]
impl MailSender for SmtpMailSender {
    async fn send(&self, message: &AssembledMessage) -> Result<(), NotificationError> {
        let params = MimeParams::generate(self.clock.now(), message.sender().email());
        let email = render_message(message, &params)?;

        tracing::debug!(
            message_id = %params.message_id,
            recipients = message.recipients().len(),
            "SMTP 送信を開始"
        );

        self.transport
            .send(email)
            .await
            .map_err(|e| NotificationError::SendFailed(format!("SMTP 送信失敗: {e}")))?;

        Ok(())
    }
}
