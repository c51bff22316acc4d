//! # メッセージ組み立て
//!
//! 設定から送信するメールの構造（ヘッダー、本文パート、添付ファイル）と
//! 配送先の一覧を組み立てる。
//!
//! ## 設計方針
//!
//! - **本文は alternative**: テキストと HTML は同じ内容の別表現として扱い、
//!   閲覧側が表示できる最もリッチなものを選ぶ
//! - **添付の欠落は非致命**: 見つからない・読めない添付はスキップして記録し、
//!   送信自体は止めない（警告は呼び出し側が出す）
//! - **Bcc は非表示**: Bcc はヘッダーに一切現れず、配送先一覧にのみ含まれる
//! - **ファイルアクセスは注入**: [`PathAccessor`] 経由で読み込み、実ファイルなしでテスト可能

use std::path::{Path, PathBuf};

use derive_more::Display;
use strum::IntoStaticStr;

use crate::{DomainError, path_accessor::PathAccessor, value_objects::EmailAddress};

/// 本文が未指定のときに使うプレーンテキスト
pub const FALLBACK_BODY_TEXT: &str = "Hello,\n\nThis is an automated monthly email.\n";

/// 添付ファイルの Content-Type
pub const ATTACHMENT_CONTENT_TYPE: &str = "application/octet-stream";

/// 件名のデフォルト値
pub const DEFAULT_SUBJECT: &str = "Monthly Update";

/// アドレスを連結する区切り文字
const ADDRESS_SEPARATOR: &str = ", ";

// =========================================================================
// MessageConfig（メッセージ設定）
// =========================================================================

/// メッセージの設定
///
/// 起動ごとに環境から構築される不変の値。必須項目（送信元、宛先）は
/// [`MessageConfig::new`] で検証済みであることが保証される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageConfig {
    from_name:        Option<String>,
    from_email:       EmailAddress,
    to:               Vec<EmailAddress>,
    cc:               Vec<EmailAddress>,
    bcc:              Vec<EmailAddress>,
    subject:          String,
    body_text:        Option<String>,
    body_html:        Option<String>,
    attachment_paths: Vec<PathBuf>,
}

impl MessageConfig {
    /// メッセージ設定を作成する
    ///
    /// # エラー
    ///
    /// 宛先（To）が空の場合は `DomainError::Validation` を返す。
    pub fn new(
        from_email: EmailAddress,
        to: Vec<EmailAddress>,
        subject: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if to.is_empty() {
            return Err(DomainError::Validation(
                "宛先（To）は 1 件以上必要です".to_string(),
            ));
        }

        Ok(Self {
            from_name: None,
            from_email,
            to,
            cc: Vec::new(),
            bcc: Vec::new(),
            subject: subject.into(),
            body_text: None,
            body_html: None,
            attachment_paths: Vec::new(),
        })
    }

    /// 送信者名を設定する（空文字列は未設定として扱う）
    pub fn with_from_name(mut self, from_name: Option<String>) -> Self {
        self.from_name = non_empty(from_name);
        self
    }

    pub fn with_cc(mut self, cc: Vec<EmailAddress>) -> Self {
        self.cc = cc;
        self
    }

    pub fn with_bcc(mut self, bcc: Vec<EmailAddress>) -> Self {
        self.bcc = bcc;
        self
    }

    /// テキスト本文を設定する（空文字列は未設定として扱う）
    pub fn with_body_text(mut self, body_text: Option<String>) -> Self {
        self.body_text = non_empty(body_text);
        self
    }

    /// HTML 本文を設定する（空文字列は未設定として扱う）
    pub fn with_body_html(mut self, body_html: Option<String>) -> Self {
        self.body_html = non_empty(body_html);
        self
    }

    pub fn with_attachment_paths(mut self, attachment_paths: Vec<PathBuf>) -> Self {
        self.attachment_paths = attachment_paths;
        self
    }

    pub fn from_name(&self) -> Option<&str> {
        self.from_name.as_deref()
    }

    pub fn from_email(&self) -> &EmailAddress {
        &self.from_email
    }

    pub fn to(&self) -> &[EmailAddress] {
        &self.to
    }

    pub fn cc(&self) -> &[EmailAddress] {
        &self.cc
    }

    pub fn bcc(&self) -> &[EmailAddress] {
        &self.bcc
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body_text(&self) -> Option<&str> {
        self.body_text.as_deref()
    }

    pub fn body_html(&self) -> Option<&str> {
        self.body_html.as_deref()
    }

    pub fn attachment_paths(&self) -> &[PathBuf] {
        &self.attachment_paths
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// =========================================================================
// AssembledMessage（組み立て済みメッセージ）
// =========================================================================

/// 送信者（表示名 + アドレス）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    name:  Option<String>,
    email: EmailAddress,
}

impl Sender {
    pub fn new(name: Option<String>, email: EmailAddress) -> Self {
        Self {
            name: non_empty(name),
            email,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// From ヘッダーの値を返す
    ///
    /// 表示名がある場合は `名前 <アドレス>`、ない場合はアドレスのみ。
    /// 表示名に RFC 5322 の特殊文字が含まれる場合はダブルクォートで囲み、
    /// `\` と `"` をエスケープする。
    pub fn header_value(&self) -> String {
        match &self.name {
            Some(name) => format!("{} <{}>", quote_display_name(name), self.email),
            None => self.email.to_string(),
        }
    }
}

fn quote_display_name(name: &str) -> String {
    const SPECIALS: &[char] = &[
        '(', ')', '<', '>', '[', ']', ':', ';', '@', '\\', ',', '.', '"',
    ];

    if !name.contains(SPECIALS) {
        return name.to_string();
    }

    let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// 表示用ヘッダー
///
/// Bcc フィールドは意図的に持たない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeaders {
    subject: String,
    from:    String,
    to:      String,
    cc:      Option<String>,
}

impl MessageHeaders {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn cc(&self) -> Option<&str> {
        self.cc.as_deref()
    }

    /// 出力順（Subject, From, To, Cc）のヘッダー名と値の組を返す
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        let mut entries = vec![
            ("Subject", self.subject.as_str()),
            ("From", self.from.as_str()),
            ("To", self.to.as_str()),
        ];
        if let Some(cc) = &self.cc {
            entries.push(("Cc", cc.as_str()));
        }
        entries
    }
}

/// 添付ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    filename:     String,
    content_type: &'static str,
    data:         Vec<u8>,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: ATTACHMENT_CONTENT_TYPE,
            data,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// メッセージを構成するパート
///
/// `IntoStaticStr` でパート種別（snake_case）を取得できる。
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ContentPart {
    /// text/plain 本文
    PlainText(String),
    /// text/html 本文
    Html(String),
    /// バイナリ添付ファイル
    Attachment(Attachment),
}

impl ContentPart {
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// 本文（alternative グループに属するパート）か
    pub fn is_body(&self) -> bool {
        matches!(self, Self::PlainText(_) | Self::Html(_))
    }
}

/// 添付をスキップした理由
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SkipReason {
    #[display("ファイルが存在しないか通常ファイルではありません")]
    NotAFile,
    #[display("読み込みに失敗しました: {_0}")]
    Unreadable(String),
}

/// スキップされた添付ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedAttachment {
    pub path:   PathBuf,
    pub reason: SkipReason,
}

/// 組み立て済みメッセージ
///
/// 送信処理に渡された後は破棄される一時的な値。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledMessage {
    headers:             MessageHeaders,
    sender:              Sender,
    to:                  Vec<EmailAddress>,
    cc:                  Vec<EmailAddress>,
    parts:               Vec<ContentPart>,
    recipients:          Vec<EmailAddress>,
    skipped_attachments: Vec<SkippedAttachment>,
}

impl AssembledMessage {
    pub fn headers(&self) -> &MessageHeaders {
        &self.headers
    }

    pub fn sender(&self) -> &Sender {
        &self.sender
    }

    /// 表示用の宛先（To）
    pub fn to(&self) -> &[EmailAddress] {
        &self.to
    }

    /// 表示用の宛先（Cc）
    pub fn cc(&self) -> &[EmailAddress] {
        &self.cc
    }

    pub fn parts(&self) -> &[ContentPart] {
        &self.parts
    }

    /// 本文パート（テキスト、HTML の順）
    pub fn body_parts(&self) -> impl Iterator<Item = &ContentPart> {
        self.parts.iter().filter(|p| p.is_body())
    }

    /// 添付ファイル（指定順）
    pub fn attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.parts.iter().filter_map(|p| match p {
            ContentPart::Attachment(attachment) => Some(attachment),
            _ => None,
        })
    }

    /// 配送先（To + Cc + Bcc、順序維持・重複除去なし）
    pub fn recipients(&self) -> &[EmailAddress] {
        &self.recipients
    }

    pub fn skipped_attachments(&self) -> &[SkippedAttachment] {
        &self.skipped_attachments
    }
}

/// 設定からメッセージを組み立てる
///
/// 検証済みの [`MessageConfig`] に対しては失敗しない。
/// 添付ファイルが見つからない・読めない場合はスキップし、
/// [`AssembledMessage::skipped_attachments`] に記録する。
pub fn build_message(config: &MessageConfig, path_accessor: &dyn PathAccessor) -> AssembledMessage {
    let sender = Sender::new(config.from_name.clone(), config.from_email.clone());

    let headers = MessageHeaders {
        subject: config.subject.clone(),
        from:    sender.header_value(),
        to:      join_addresses(&config.to),
        cc:      (!config.cc.is_empty()).then(|| join_addresses(&config.cc)),
    };

    let mut parts = Vec::new();
    if let Some(text) = &config.body_text {
        parts.push(ContentPart::PlainText(text.clone()));
    }
    if let Some(html) = &config.body_html {
        parts.push(ContentPart::Html(html.clone()));
    }
    if parts.is_empty() {
        parts.push(ContentPart::PlainText(FALLBACK_BODY_TEXT.to_string()));
    }

    let mut skipped_attachments = Vec::new();
    for path in &config.attachment_paths {
        match load_attachment(path, path_accessor) {
            Ok(attachment) => parts.push(ContentPart::Attachment(attachment)),
            Err(reason) => skipped_attachments.push(SkippedAttachment {
                path: path.clone(),
                reason,
            }),
        }
    }

    let recipients = config
        .to
        .iter()
        .chain(&config.cc)
        .chain(&config.bcc)
        .cloned()
        .collect();

    AssembledMessage {
        headers,
        sender,
        to: config.to.clone(),
        cc: config.cc.clone(),
        parts,
        recipients,
        skipped_attachments,
    }
}

fn join_addresses(addresses: &[EmailAddress]) -> String {
    addresses
        .iter()
        .map(EmailAddress::as_str)
        .collect::<Vec<_>>()
        .join(ADDRESS_SEPARATOR)
}

fn load_attachment(path: &Path, path_accessor: &dyn PathAccessor) -> Result<Attachment, SkipReason> {
    if !path_accessor.is_file(path) {
        return Err(SkipReason::NotAFile);
    }

    let data = path_accessor
        .read_bytes(path)
        .map_err(|e| SkipReason::Unreadable(e.to_string()))?;

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    Ok(Attachment::new(filename, data))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::path_accessor::InMemoryPathAccessor;

    fn email(value: &str) -> EmailAddress {
        EmailAddress::new(value).unwrap()
    }

    #[fixture]
    fn base_config() -> MessageConfig {
        MessageConfig::new(
            email("sender@example.com"),
            vec![email("a@example.com")],
            DEFAULT_SUBJECT,
        )
        .unwrap()
    }

    #[fixture]
    fn no_files() -> InMemoryPathAccessor {
        InMemoryPathAccessor::new()
    }

    // =========================================================================
    // MessageConfig のテスト
    // =========================================================================

    #[test]
    fn test_宛先が空の設定は拒否される() {
        let result = MessageConfig::new(email("sender@example.com"), vec![], "件名");
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[rstest]
    fn test_空文字列の任意項目は未設定として扱う(base_config: MessageConfig) {
        let config = base_config
            .with_from_name(Some(String::new()))
            .with_body_text(Some(String::new()))
            .with_body_html(Some(String::new()));

        assert_eq!(config.from_name(), None);
        assert_eq!(config.body_text(), None);
        assert_eq!(config.body_html(), None);
    }

    // =========================================================================
    // ヘッダーのテスト
    // =========================================================================

    #[rstest]
    fn test_送信者名がなければfromはアドレスのみ(
        base_config: MessageConfig,
        no_files: InMemoryPathAccessor,
    ) {
        let message = build_message(&base_config, &no_files);
        assert_eq!(message.headers().from(), "sender@example.com");
    }

    #[rstest]
    #[case("Monthly Bot", "Monthly Bot <sender@example.com>")]
    #[case("Acme, Inc.", "\"Acme, Inc.\" <sender@example.com>")]
    #[case("Say \"hi\"", "\"Say \\\"hi\\\"\" <sender@example.com>")]
    #[case("経理部", "経理部 <sender@example.com>")]
    fn test_送信者名があればfromは表示名付き(
        base_config: MessageConfig,
        no_files: InMemoryPathAccessor,
        #[case] name: &str,
        #[case] expected: &str,
    ) {
        let config = base_config.with_from_name(Some(name.to_string()));
        let message = build_message(&config, &no_files);
        assert_eq!(message.headers().from(), expected);
    }

    #[rstest]
    fn test_ccが空ならccヘッダーを出さない(
        base_config: MessageConfig,
        no_files: InMemoryPathAccessor,
    ) {
        let message = build_message(&base_config, &no_files);

        assert_eq!(message.headers().cc(), None);
        assert_eq!(
            message
                .headers()
                .entries()
                .iter()
                .map(|(name, _)| *name)
                .collect::<Vec<_>>(),
            vec!["Subject", "From", "To"]
        );
    }

    #[rstest]
    fn test_宛先と配送先の順序とbccの非表示(no_files: InMemoryPathAccessor) {
        let config = MessageConfig::new(
            email("sender@example.com"),
            vec![email("a@example.com"), email("b@example.com")],
            "月次報告",
        )
        .unwrap()
        .with_cc(vec![email("c@example.com")])
        .with_bcc(vec![email("d@example.com")]);

        let message = build_message(&config, &no_files);

        assert_eq!(message.headers().to(), "a@example.com, b@example.com");
        assert_eq!(message.headers().cc(), Some("c@example.com"));
        assert_eq!(
            message.recipients(),
            &[
                email("a@example.com"),
                email("b@example.com"),
                email("c@example.com"),
                email("d@example.com"),
            ]
        );
        for (name, value) in message.headers().entries() {
            assert_ne!(name, "Bcc");
            assert!(!value.contains("d@example.com"), "{name}: {value}");
        }
    }

    #[rstest]
    fn test_配送先は重複を除去しない(no_files: InMemoryPathAccessor) {
        let config = MessageConfig::new(
            email("sender@example.com"),
            vec![email("a@example.com")],
            "件名",
        )
        .unwrap()
        .with_cc(vec![email("a@example.com")]);

        let message = build_message(&config, &no_files);
        assert_eq!(message.recipients().len(), 2);
    }

    // =========================================================================
    // 本文のテスト
    // =========================================================================

    #[rstest]
    fn test_本文が両方空ならフォールバック本文を1つだけ添付する(
        base_config: MessageConfig,
        no_files: InMemoryPathAccessor,
    ) {
        let message = build_message(&base_config, &no_files);

        assert_eq!(
            message.parts(),
            &[ContentPart::PlainText(FALLBACK_BODY_TEXT.to_string())]
        );
    }

    #[rstest]
    fn test_テキストとhtmlを両方指定すると順に添付する(
        base_config: MessageConfig,
        no_files: InMemoryPathAccessor,
    ) {
        let config = base_config
            .with_body_text(Some("本文".to_string()))
            .with_body_html(Some("<p>本文</p>".to_string()));

        let message = build_message(&config, &no_files);

        assert_eq!(
            message.parts(),
            &[
                ContentPart::PlainText("本文".to_string()),
                ContentPart::Html("<p>本文</p>".to_string()),
            ]
        );
    }

    #[rstest]
    fn test_htmlのみならフォールバック本文を付けない(
        base_config: MessageConfig,
        no_files: InMemoryPathAccessor,
    ) {
        let config = base_config.with_body_html(Some("<p>hi</p>".to_string()));
        let message = build_message(&config, &no_files);

        let kinds: Vec<_> = message.parts().iter().map(ContentPart::kind).collect();
        assert_eq!(kinds, vec!["html"]);
    }

    // =========================================================================
    // 添付ファイルのテスト
    // =========================================================================

    #[rstest]
    fn test_添付ファイルはベース名とoctet_streamで添付する(base_config: MessageConfig) {
        let accessor = InMemoryPathAccessor::new()
            .with_file("reports/2025/summary.pdf", b"%PDF-1.7".to_vec())
            .with_file("data.csv", b"a,b\n1,2\n".to_vec());
        let config = base_config.with_attachment_paths(vec![
            PathBuf::from("reports/2025/summary.pdf"),
            PathBuf::from("data.csv"),
        ]);

        let message = build_message(&config, &accessor);
        let attachments: Vec<_> = message.attachments().collect();

        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].filename(), "summary.pdf");
        assert_eq!(attachments[0].content_type(), "application/octet-stream");
        assert_eq!(attachments[0].data(), b"%PDF-1.7");
        assert_eq!(attachments[1].filename(), "data.csv");
        assert!(message.skipped_attachments().is_empty());
    }

    #[rstest]
    fn test_存在しない添付はスキップして組み立てを続ける(base_config: MessageConfig) {
        let accessor = InMemoryPathAccessor::new()
            .with_file("a.txt", b"a".to_vec())
            .with_file("c.txt", b"c".to_vec());
        let config = base_config.with_attachment_paths(vec![
            PathBuf::from("a.txt"),
            PathBuf::from("missing.txt"),
            PathBuf::from("c.txt"),
        ]);

        let message = build_message(&config, &accessor);

        let filenames: Vec<_> = message.attachments().map(Attachment::filename).collect();
        assert_eq!(filenames, vec!["a.txt", "c.txt"]);
        assert_eq!(
            message.skipped_attachments(),
            &[SkippedAttachment {
                path:   PathBuf::from("missing.txt"),
                reason: SkipReason::NotAFile,
            }]
        );
        // 本文パートは影響を受けない
        assert_eq!(message.body_parts().count(), 1);
    }

    #[rstest]
    fn test_読み込めない添付はスキップする(base_config: MessageConfig) {
        let accessor = InMemoryPathAccessor::new().with_unreadable_file("locked.bin");
        let config = base_config.with_attachment_paths(vec![PathBuf::from("locked.bin")]);

        let message = build_message(&config, &accessor);

        assert_eq!(message.attachments().count(), 0);
        assert_eq!(message.skipped_attachments().len(), 1);
        assert!(matches!(
            message.skipped_attachments()[0].reason,
            SkipReason::Unreadable(_)
        ));
    }

    #[rstest]
    fn test_同じ設定から組み立てると同じメッセージになる(base_config: MessageConfig) {
        let accessor = InMemoryPathAccessor::new().with_file("a.bin", vec![0u8, 159, 146, 150]);
        let config = base_config
            .with_from_name(Some("Bot".to_string()))
            .with_body_text(Some("text".to_string()))
            .with_body_html(Some("<b>html</b>".to_string()))
            .with_attachment_paths(vec![PathBuf::from("a.bin")]);

        assert_eq!(build_message(&config, &accessor), build_message(&config, &accessor));
    }
}
