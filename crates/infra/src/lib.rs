//! # Monthly Mailer インフラ層
//!
//! 外部システム（SMTP リレー）との通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **メール送信**: 組み立て済みメッセージを SMTP で送信する
//! - **MIME 変換**: ドメインのメッセージ構造を lettre の `Message` に変換する
//! - **ドライラン**: 送信せずにログ出力のみ行う
//!
//! ## 依存関係
//!
//! ```text
//! app → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`notification`] - メール送信トレイトと実装（SMTP / Noop）
//! - `mock` - テスト用モック（`test-utils` feature）

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod notification;
