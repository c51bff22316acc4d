//! # Monthly Mailer 共有ユーティリティ
//!
//! ログ出力に関する共通処理を提供する。
//!
//! ## 設計方針
//!
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - トレーシング初期化は `observability` feature の背後に置き、
//!   ライブラリクレートが subscriber 実装に依存しないようにする

pub mod event_log;
pub mod observability;
