//! # Monthly Mailer ドメイン層
//!
//! 毎月の定期メール送信における判定と組み立てのロジックを定義する。
//!
//! ## 設計方針
//!
//! - **純粋なロジック**: 環境変数、システム時刻、ファイルシステムには直接触れない
//! - **注入による抽象化**: 時刻は [`clock::Clock`]、ファイルは
//!   [`path_accessor::PathAccessor`] として呼び出し側から渡す
//! - **検証済みの値**: 設定は値オブジェクトとして受け取り、不正な値は境界で拒否する
//!
//! ## 依存関係の方向
//!
//! ```text
//! app → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`schedule`] - 送信タイミングの判定（Trigger Evaluator）
//! - [`message`] - メッセージの組み立て（Message Assembler）
//! - [`value_objects`] - 送信日・送信時刻・メールアドレス
//! - [`clock`] - 時刻プロバイダ
//! - [`path_accessor`] - 添付ファイルへのアクセス
//! - [`notification`] - 送信エラー
//! - [`error`] - ドメイン層エラー

pub mod clock;
pub mod error;
pub mod message;
pub mod notification;
pub mod path_accessor;
pub mod schedule;
pub mod value_objects;

pub use error::DomainError;
