//! # テスト用モック
//!
//! ユースケーステストで使用するインメモリモック。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! monthly-mailer-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use monthly_mailer_domain::{message::AssembledMessage, notification::NotificationError};

use crate::notification::MailSender;

// ===== MockMailSender =====

/// 送信したメッセージを記録するモック
///
/// `failing()` で作成すると常に `SendFailed` を返す。
/// `failing_with()` で返すエラーを指定できる。
#[derive(Clone, Default)]
pub struct MockMailSender {
    sent:    Arc<Mutex<Vec<AssembledMessage>>>,
    failure: Option<fn(String) -> NotificationError>,
}

impl MockMailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// 常に送信失敗するモックを作成する
    pub fn failing() -> Self {
        Self::failing_with(NotificationError::SendFailed)
    }

    /// 指定したバリアントのエラーを常に返すモックを作成する
    ///
    /// ```ignore
    /// let sender = MockMailSender::failing_with(NotificationError::BuildFailed);
    /// ```
    pub fn failing_with(failure: fn(String) -> NotificationError) -> Self {
        Self {
            sent:    Arc::new(Mutex::new(Vec::new())),
            failure: Some(failure),
        }
    }

    /// 送信されたメッセージの一覧を返す
    pub fn sent_messages(&self) -> Vec<AssembledMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailSender for MockMailSender {
    async fn send(&self, message: &AssembledMessage) -> Result<(), NotificationError> {
        if let Some(failure) = self.failure {
            return Err(failure("モック: 送信に失敗しました".to_string()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}
