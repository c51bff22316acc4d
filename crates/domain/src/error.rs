//! # ドメイン層エラー定義
//!
//! 設定値や値オブジェクトのルール違反を表現するエラー型。
//!
//! ## 設計方針
//!
//! - **型による分類**: エラーの種類を列挙型で明示し、パターンマッチで処理可能に
//! - **thiserror 活用**: `#[error(...)]` マクロでエラーメッセージを自動生成
//! - **境界での検出**: 不正な設定値は評価・組み立ての前に、設定読み込み時に拒否する
//!
//! ## 使用例
//!
//! ```rust
//! use monthly_mailer_domain::DomainError;
//!
//! fn validate_subject(subject: &str) -> Result<(), DomainError> {
//!     if subject.is_empty() {
//!         return Err(DomainError::Validation("件名は必須です".to_string()));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
///
/// 値オブジェクトの生成時に不正な値を検出した場合に使用する。
/// アプリケーション層でこのエラーを受け取り、設定エラーとして扱う。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// # 例
    ///
    /// - 送信日が 1〜31 の範囲外
    /// - メールアドレスの形式が不正
    /// - 宛先（To）が空
    #[error("バリデーションエラー: {0}")]
    Validation(String),
}
