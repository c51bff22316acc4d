//! # ログ出力の初期化
//!
//! Monthly Mailer は cron や CI のスケジュール実行から起動される短命なプロセスで、
//! 1 回の起動のログが 1 つのルートスパン（`app`）の下にまとまるようにする。
//!
//! - `LOG_FORMAT=json`: CI のログ収集向け。イベントのフィールドをトップレベルに展開する
//! - `LOG_FORMAT=pretty`（既定）: 手動実行向け
//! - `RUST_LOG`: フィルタ。未設定なら [`DEFAULT_LOG_FILTER`]

use strum::{Display, EnumString};

/// `RUST_LOG` 未設定時のフィルタ
pub const DEFAULT_LOG_FILTER: &str = "info,monthly_mailer=debug";

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    /// `LOG_FORMAT` の値から出力形式を決める
    ///
    /// 未設定なら既定値。不明な値は既定値に倒し、stderr に警告する
    /// （subscriber の初期化前なので tracing には出せない）。
    pub fn from_value(value: Option<&str>) -> Self {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Self::default();
        };

        value.parse().unwrap_or_else(|_| {
            eprintln!(
                "WARNING: LOG_FORMAT={value:?} は不明な値です。{} を使います",
                Self::default()
            );
            Self::default()
        })
    }
}

/// ログ出力の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// ルートスパンの `service` フィールド
    pub service_name: String,
    pub log_format:   LogFormat,
}

impl TracingConfig {
    pub fn new(service_name: impl Into<String>, log_format: LogFormat) -> Self {
        Self {
            service_name: service_name.into(),
            log_format,
        }
    }

    /// `LOG_FORMAT` 環境変数から設定を作る
    pub fn from_env(service_name: impl Into<String>) -> Self {
        let value = std::env::var("LOG_FORMAT").ok();
        Self::new(service_name, LogFormat::from_value(value.as_deref()))
    }

    /// 1 回の起動全体を囲むルートスパンを作る
    pub fn root_span(&self) -> tracing::Span {
        tracing::info_span!("app", service = %self.service_name)
    }
}

/// グローバル subscriber を設定する
///
/// # エラー
///
/// subscriber が既に設定されている場合はエラーを返す。
#[cfg(feature = "observability")]
pub fn init_tracing(
    config: &TracingConfig,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::{EnvFilter, Layer as _, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let output = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => fmt::layer().with_target(false).boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(output)
        .try_init()
}
