//! # ユースケース層
//!
//! 1 回の起動（tick）で行う処理を実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: 時刻・ファイル・送信処理を `Arc<dyn Trait>` で外部から注入
//! - **ステートレス**: 起動をまたいで保持する状態はない
//!
//! ## モジュール構成
//!
//! - `monthly_mail`: 送信判定 → 組み立て → 送信

pub mod monthly_mail;

pub use monthly_mail::{MonthlyMailUseCase, RunOutcome};
