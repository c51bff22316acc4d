//! # MIME 変換
//!
//! ドメインの [`AssembledMessage`] を lettre の [`Message`] に変換する。
//!
//! ## 構造
//!
//! ```text
//! multipart/mixed              ← 添付がある場合のみ
//! ├── multipart/alternative
//! │   ├── text/plain
//! │   └── text/html
//! ├── application/octet-stream (base64, attachment)
//! └── ...
//! ```
//!
//! 添付がない場合は multipart/alternative がトップレベルになる。
//!
//! Date、Message-ID、境界文字列は [`MimeParams`] で外から与える。
//! 同じメッセージと同じパラメータからは常にバイト単位で同一の出力が得られる。

use std::time::SystemTime;

use chrono::{DateTime, Utc};
use lettre::{
    Address,
    Message,
    address::Envelope,
    message::{
        Body,
        Mailbox,
        MultiPart,
        SinglePart,
        header::{ContentDisposition, ContentTransferEncoding, ContentType},
    },
};
use monthly_mailer_domain::{
    message::{AssembledMessage, Attachment, ContentPart},
    notification::NotificationError,
    value_objects::EmailAddress,
};
use uuid::Uuid;

/// MIME 出力の可変要素
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeParams {
    /// Date ヘッダー
    pub date:       DateTime<Utc>,
    /// Message-ID ヘッダー（`<...>` を含む）
    pub message_id: String,
    /// 境界文字列の接頭辞（`-mixed` / `-alt` を付けて使う）
    pub boundary:   String,
}

impl MimeParams {
    /// 送信用に新しい Message-ID と境界文字列を生成する
    pub fn generate(now: DateTime<Utc>, from: &EmailAddress) -> Self {
        let token = Uuid::new_v4().simple().to_string();
        let domain = from
            .as_str()
            .rsplit_once('@')
            .map_or("localhost", |(_, domain)| domain);

        Self {
            date:       now,
            message_id: format!("<{token}@{domain}>"),
            boundary:   format!("=_monthly_{token}"),
        }
    }

    fn mixed_boundary(&self) -> String {
        format!("{}-mixed", self.boundary)
    }

    fn alternative_boundary(&self) -> String {
        format!("{}-alt", self.boundary)
    }
}

/// 組み立て済みメッセージを lettre の `Message` に変換する
///
/// エンベロープの配送先には Bcc を含む全配送先を設定し、
/// Bcc ヘッダーは出力しない。
pub fn render_message(
    message: &AssembledMessage,
    params: &MimeParams,
) -> Result<Message, NotificationError> {
    let sender = message.sender();
    let from = Mailbox::new(sender.name().map(str::to_string), parse_address(sender.email())?);

    let recipients = message
        .recipients()
        .iter()
        .map(parse_address)
        .collect::<Result<Vec<_>, _>>()?;
    let envelope = Envelope::new(Some(from.email.clone()), recipients)
        .map_err(|e| NotificationError::InvalidAddress(format!("エンベロープ構築失敗: {e}")))?;

    let mut builder = Message::builder()
        .from(from)
        .subject(message.headers().subject())
        .date(SystemTime::from(params.date))
        .message_id(Some(params.message_id.clone()))
        .envelope(envelope);

    for to in message.to() {
        builder = builder.to(Mailbox::new(None, parse_address(to)?));
    }
    for cc in message.cc() {
        builder = builder.cc(Mailbox::new(None, parse_address(cc)?));
    }

    let alternative = alternative_part(message, params)?;

    let attachments = message
        .attachments()
        .map(attachment_part)
        .collect::<Result<Vec<_>, _>>()?;

    let body = if attachments.is_empty() {
        alternative
    } else {
        attachments.into_iter().fold(
            MultiPart::mixed()
                .boundary(params.mixed_boundary())
                .multipart(alternative),
            MultiPart::singlepart,
        )
    };

    builder
        .multipart(body)
        .map_err(|e| NotificationError::BuildFailed(format!("メッセージ構築失敗: {e}")))
}

/// アドレスを SMTP で使える形式として解釈する
///
/// 設定読み込み時にも呼び、送信時に初めて失敗することがないようにする。
pub fn parse_address(email: &EmailAddress) -> Result<Address, NotificationError> {
    email
        .as_str()
        .parse()
        .map_err(|e| NotificationError::InvalidAddress(format!("{email}: {e}")))
}

fn alternative_part(
    message: &AssembledMessage,
    params: &MimeParams,
) -> Result<MultiPart, NotificationError> {
    let mut body_parts = message.parts().iter().filter_map(|part| match part {
        ContentPart::PlainText(text) => Some(
            SinglePart::builder()
                .header(ContentType::TEXT_PLAIN)
                .body(text.clone()),
        ),
        ContentPart::Html(html) => Some(
            SinglePart::builder()
                .header(ContentType::TEXT_HTML)
                .body(html.clone()),
        ),
        ContentPart::Attachment(_) => None,
    });

    let first = body_parts
        .next()
        .ok_or_else(|| NotificationError::BuildFailed("本文パートがありません".to_string()))?;

    Ok(body_parts.fold(
        MultiPart::alternative()
            .boundary(params.alternative_boundary())
            .singlepart(first),
        MultiPart::singlepart,
    ))
}

fn attachment_part(attachment: &Attachment) -> Result<SinglePart, NotificationError> {
    let content_type = ContentType::parse(attachment.content_type())
        .map_err(|e| NotificationError::BuildFailed(format!("Content-Type 不正: {e}")))?;

    let body = Body::new_with_encoding(attachment.data().to_vec(), ContentTransferEncoding::Base64)
        .map_err(|_| {
            NotificationError::BuildFailed(format!(
                "添付ファイルのエンコードに失敗: {}",
                attachment.filename()
            ))
        })?;

    Ok(SinglePart::builder()
        .header(content_type)
        .header(ContentDisposition::attachment(attachment.filename()))
        .body(body))
}
