//! # Monthly Mailer ライブラリ
//!
//! 設定読み込みとユースケースを公開する。
//! 結合テストからも同じ経路で呼び出せるよう、`main.rs` から分離している。

pub mod config;
pub mod error;
pub mod usecase;
