//! # 共通値オブジェクト
//!
//! スケジュール設定とメッセージ設定で共有される値オブジェクトを定義する。
//!
//! ## 設計方針
//!
//! - **Newtype パターン**: プリミティブ型をラップし、型安全性を確保
//! - **バリデーション**: 生成時に検証し、不正な値の存在を型レベルで排除
//! - **不変性**: 一度作成したら変更不可
//!
//! ## 含まれる型
//!
//! | 型 | ラップ対象 | 用途 |
//! |---|-----------|------|
//! | [`TargetDay`] | `u32` | 送信する日（1〜31） |
//! | [`RunTime`] | `hour + minute` | 送信時刻（UTC） |
//! | [`EmailAddress`] | `String` | メールアドレス |

use chrono::{DateTime, Timelike, Utc};
use derive_more::Display;

use crate::DomainError;

// =========================================================================
// TargetDay（送信日）
// =========================================================================

/// 送信日（値オブジェクト）
///
/// 毎月の送信対象となる日。1〜31 の範囲のみ受け付ける。
/// 月の日数との整合（2 月に 31 日を指定する等）は設定時には検証せず、
/// 評価時に月ごとに解決する。
///
/// # 使用例
///
/// ```rust
/// use monthly_mailer_domain::value_objects::TargetDay;
///
/// let day = TargetDay::new(31).unwrap();
/// assert_eq!(day.as_u32(), 31);
/// assert!(TargetDay::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub struct TargetDay(u32);

impl TargetDay {
    /// 送信日を作成する
    ///
    /// # エラー
    ///
    /// 1〜31 の範囲外の場合は `DomainError::Validation` を返す。
    pub fn new(value: u32) -> Result<Self, DomainError> {
        if !(1..=31).contains(&value) {
            return Err(DomainError::Validation(format!(
                "送信日は 1〜31 の範囲で指定してください: {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

// =========================================================================
// RunTime（送信時刻）
// =========================================================================

/// 送信時刻（値オブジェクト、UTC）
///
/// 時と分の組。秒以下は持たない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("{hour:02}:{minute:02}")]
pub struct RunTime {
    hour:   u32,
    minute: u32,
}

impl RunTime {
    /// 送信時刻を作成する
    ///
    /// # エラー
    ///
    /// 時が 0〜23、分が 0〜59 の範囲外の場合は `DomainError::Validation` を返す。
    pub fn new(hour: u32, minute: u32) -> Result<Self, DomainError> {
        if hour > 23 {
            return Err(DomainError::Validation(format!(
                "時は 0〜23 の範囲で指定してください: {hour}"
            )));
        }
        if minute > 59 {
            return Err(DomainError::Validation(format!(
                "分は 0〜59 の範囲で指定してください: {minute}"
            )));
        }
        Ok(Self { hour, minute })
    }

    /// 日時から時・分を取り出す（秒以下は切り捨て）
    pub fn of(datetime: &DateTime<Utc>) -> Self {
        Self {
            hour:   datetime.hour(),
            minute: datetime.minute(),
        }
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }
}

// =========================================================================
// EmailAddress（メールアドレス）
// =========================================================================

/// メールアドレス（値オブジェクト）
///
/// 生成時に最低限の構造検証を行う。厳密な RFC 5322 の検証は
/// 送信時にトランスポート側で行われる。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{_0}")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// メールアドレスを作成する
    ///
    /// # バリデーション
    ///
    /// - 空文字列ではない
    /// - `local@domain` の形式で、両側が空でなく `@` は 1 つだけ
    /// - 空白を含まない
    /// - 最大 255 文字
    ///
    /// # エラー
    ///
    /// バリデーションに失敗した場合は `DomainError::Validation` を返す。
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();

        if value.is_empty() {
            return Err(DomainError::Validation(
                "メールアドレスは必須です".to_string(),
            ));
        }

        let Some((local, domain)) = value.split_once('@') else {
            return Err(DomainError::Validation(format!(
                "メールアドレスの形式が不正です: {value}"
            )));
        };

        if local.is_empty()
            || domain.is_empty()
            || domain.contains('@')
            || value.chars().any(char::is_whitespace)
        {
            return Err(DomainError::Validation(format!(
                "メールアドレスの形式が不正です: {value}"
            )));
        }

        if value.len() > 255 {
            return Err(DomainError::Validation(
                "メールアドレスは255文字以内である必要があります".to_string(),
            ));
        }

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
