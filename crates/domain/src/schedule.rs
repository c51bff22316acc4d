//! # 送信スケジュール判定
//!
//! 起動（tick）ごとに「今が毎月の送信タイミングか」を判定する。
//!
//! ## 判定ルール
//!
//! 1. 現在時刻の時・分が設定された送信時刻と完全一致しなければ送信しない
//! 2. 当月の末日を求める（翌月 1 日まで進めてから 1 日戻す）
//! 3. 送信日が末日以下ならそのまま、超える場合は
//!    `send_on_last_if_short` が有効なら末日に繰り下げ、無効なら当月はスキップ
//! 4. 今日の日付が実効送信日と一致すれば送信する
//!
//! 月の日数はうるう年の 2 月を含めて呼び出しのたびに計算し、テーブルは持たない。
//!
//! ## 使用例
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use monthly_mailer_domain::{
//!     schedule::{ScheduleConfig, should_send_today},
//!     value_objects::{RunTime, TargetDay},
//! };
//!
//! let config = ScheduleConfig::new(
//!     TargetDay::new(31).unwrap(),
//!     RunTime::new(8, 0).unwrap(),
//!     true,
//! );
//!
//! // 4 月は 30 日までなので 30 日に繰り下がる
//! let now = Utc.with_ymd_and_hms(2025, 4, 30, 8, 0, 0).unwrap();
//! assert!(should_send_today(now, &config));
//! ```

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use strum::IntoStaticStr;

use crate::value_objects::{RunTime, TargetDay};

/// 送信スケジュールの設定
///
/// 起動ごとに環境から構築される不変の値。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    target_day:            TargetDay,
    run_time:              RunTime,
    send_on_last_if_short: bool,
}

impl ScheduleConfig {
    pub fn new(target_day: TargetDay, run_time: RunTime, send_on_last_if_short: bool) -> Self {
        Self {
            target_day,
            run_time,
            send_on_last_if_short,
        }
    }

    pub fn target_day(&self) -> TargetDay {
        self.target_day
    }

    pub fn run_time(&self) -> RunTime {
        self.run_time
    }

    pub fn send_on_last_if_short(&self) -> bool {
        self.send_on_last_if_short
    }
}

/// 送信判定の結果
///
/// 送信しない場合も理由ごとにバリアントを分け、呼び出し側でログに残せるようにする。
/// `IntoStaticStr` でログ用の理由コード（snake_case）を取得できる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum TriggerDecision {
    /// 送信時刻ではない
    NotYetTime { now: RunTime, target: RunTime },
    /// 送信日が当月に存在せず、末日への繰り下げも無効
    ShortMonthSkip { target_day: TargetDay, last_day: u32 },
    /// 今日は実効送信日ではない
    DayMismatch { today: u32, effective_day: u32 },
    /// 送信する
    Send { effective_day: u32 },
}

impl TriggerDecision {
    pub fn should_send(&self) -> bool {
        matches!(self, Self::Send { .. })
    }

    /// ログ用の理由コードを返す
    pub fn reason(&self) -> &'static str {
        self.into()
    }
}

/// 日付が属する月の末日（日）を返す
///
/// 月初から 32 日進めて月境界を確実に越え、その月の 1 日に切り詰めてから 1 日戻す。
pub fn last_day_of_month(date: NaiveDate) -> u32 {
    let first_of_month = date - Days::new(u64::from(date.day0()));
    let past_boundary = first_of_month + Days::new(32);
    let first_of_next_month = past_boundary - Days::new(u64::from(past_boundary.day0()));
    (first_of_next_month - Days::new(1)).day()
}

/// 現在時刻と設定から送信判定を行う
pub fn evaluate(now_utc: DateTime<Utc>, config: &ScheduleConfig) -> TriggerDecision {
    let now = RunTime::of(&now_utc);
    if now != config.run_time {
        return TriggerDecision::NotYetTime {
            now,
            target: config.run_time,
        };
    }

    let today = now_utc.date_naive();
    let last_day = last_day_of_month(today);
    let target_day = config.target_day.as_u32();

    let effective_day = if target_day <= last_day {
        target_day
    } else if config.send_on_last_if_short {
        last_day
    } else {
        return TriggerDecision::ShortMonthSkip {
            target_day: config.target_day,
            last_day,
        };
    };

    if today.day() == effective_day {
        TriggerDecision::Send { effective_day }
    } else {
        TriggerDecision::DayMismatch {
            today: today.day(),
            effective_day,
        }
    }
}

/// 今日が送信日かどうかを返す
pub fn should_send_today(now_utc: DateTime<Utc>, config: &ScheduleConfig) -> bool {
    evaluate(now_utc, config).should_send()
}
