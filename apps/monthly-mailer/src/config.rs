//! # Monthly Mailer 設定
//!
//! 環境変数から送信スケジュール、メッセージ、SMTP の設定を読み込む。
//!
//! 文字列からの型変換（真偽値、数値、カンマ区切りリスト）はこのモジュールに閉じ込め、
//! ドメイン層には検証済みの値オブジェクトだけを渡す。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `DAY_OF_MONTH` | No | 送信日 1〜31（デフォルト: `23`） |
//! | `RUN_HOUR_UTC` | No | 送信時（デフォルト: `8`） |
//! | `RUN_MINUTE_UTC` | No | 送信分（デフォルト: `0`） |
//! | `SEND_ON_LAST_IF_SHORT` | No | 送信日が存在しない月は末日に送るか（デフォルト: `true`） |
//! | `FROM_NAME` | No | 送信者の表示名 |
//! | `FROM_EMAIL` | **Yes** | 送信元アドレス（SMTP 認証ユーザーを兼ねる） |
//! | `TO_EMAILS` / `TO_EMAIL` | **Yes** | 宛先（カンマ区切り）。`TO_EMAILS` が空なら `TO_EMAIL` |
//! | `CC_EMAILS` / `BCC_EMAILS` | No | Cc / Bcc（カンマ区切り） |
//! | `SUBJECT` | No | 件名（デフォルト: `Monthly Update`） |
//! | `BODY_TEXT` / `BODY_HTML` | No | 本文 |
//! | `ATTACHMENTS` | No | 添付ファイルのパス（カンマ区切り） |
//! | `DRY_RUN` | No | 送信せずにログ出力のみ（デフォルト: `false`） |
//! | `SMTP_HOST` | No | デフォルト: `smtp.office365.com` |
//! | `SMTP_PORT` | No | デフォルト: `587` |
//! | `SMTP_USE_TLS` | No | STARTTLS を使うか（デフォルト: `true`） |
//! | `APP_PASSWORD` | **Yes**（`DRY_RUN` 時は No） | SMTP 認証パスワード |

use std::{fmt, path::PathBuf, str::FromStr};

use monthly_mailer_domain::{
    DomainError,
    message::{DEFAULT_SUBJECT, MessageConfig},
    schedule::ScheduleConfig,
    value_objects::{EmailAddress, RunTime, TargetDay},
};
use monthly_mailer_infra::notification::{SmtpSettings, mime::parse_address};

use crate::error::ConfigError;

const DEFAULT_DAY_OF_MONTH: u32 = 23;
const DEFAULT_RUN_HOUR_UTC: u32 = 8;
const DEFAULT_RUN_MINUTE_UTC: u32 = 0;
const DEFAULT_SMTP_HOST: &str = "smtp.office365.com";
const DEFAULT_SMTP_PORT: u16 = 587;

/// 真偽値として true と解釈する値（小文字化・前後空白除去後）
const TRUTHY_VALUES: &[&str] = &["1", "true", "yes", "y", "on"];

/// Monthly Mailer の設定
///
/// 起動ごとに 1 回構築し、各コンポーネントへ参照で渡す。
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// 送信スケジュール
    pub schedule: ScheduleConfig,
    /// メッセージ
    pub message:  MessageConfig,
    /// SMTP 接続
    pub smtp:     SmtpConfig,
    /// ドライラン（送信せずにログ出力のみ）
    pub dry_run:  bool,
}

/// SMTP 接続の設定
#[derive(Clone)]
pub struct SmtpConfig {
    pub host:     String,
    pub port:     u16,
    pub use_tls:  bool,
    app_password: Option<String>,
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("use_tls", &self.use_tls)
            .field(
                "app_password",
                &self.app_password.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl SmtpConfig {
    /// SMTP 送信用の接続設定を作る
    ///
    /// 認証ユーザーには送信元アドレスを使う。
    ///
    /// # エラー
    ///
    /// `APP_PASSWORD` が未設定の場合は `ConfigError::Missing` を返す。
    pub fn settings(&self, username: &EmailAddress) -> Result<SmtpSettings, ConfigError> {
        let password = self
            .app_password
            .clone()
            .ok_or(ConfigError::Missing("APP_PASSWORD"))?;

        Ok(SmtpSettings {
            host: self.host.clone(),
            port: self.port,
            use_tls: self.use_tls,
            username: username.as_str().to_string(),
            password,
        })
    }
}

impl MailerConfig {
    /// 環境変数から設定を読み込む
    ///
    /// `.env` の読み込みは呼び出し側（`main`）で行う。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 名前から値を引く関数を使って設定を読み込む
    ///
    /// テストでは `HashMap` を引く関数を渡す。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let dry_run = env.bool("DRY_RUN", false);

        // 時と分はそれぞれの変数名でエラーを報告する
        let run_hour = env.number("RUN_HOUR_UTC", DEFAULT_RUN_HOUR_UTC)?;
        RunTime::new(run_hour, 0).map_err(invalid("RUN_HOUR_UTC"))?;
        let run_time = RunTime::new(
            run_hour,
            env.number("RUN_MINUTE_UTC", DEFAULT_RUN_MINUTE_UTC)?,
        )
        .map_err(invalid("RUN_MINUTE_UTC"))?;

        let schedule = ScheduleConfig::new(
            TargetDay::new(env.number("DAY_OF_MONTH", DEFAULT_DAY_OF_MONTH)?)
                .map_err(invalid("DAY_OF_MONTH"))?,
            run_time,
            env.bool("SEND_ON_LAST_IF_SHORT", true),
        );

        let from_email = address("FROM_EMAIL", env.required("FROM_EMAIL")?)?;

        let to = match env.addresses("TO_EMAILS")? {
            to if !to.is_empty() => to,
            _ => vec![address("TO_EMAIL", env.required("TO_EMAIL")?)?],
        };

        let message = MessageConfig::new(
            from_email,
            to,
            env.get("SUBJECT")
                .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
        )
        .map_err(invalid("TO_EMAILS"))?
        .with_from_name(env.get("FROM_NAME"))
        .with_cc(env.addresses("CC_EMAILS")?)
        .with_bcc(env.addresses("BCC_EMAILS")?)
        .with_body_text(env.get("BODY_TEXT"))
        .with_body_html(env.get("BODY_HTML"))
        .with_attachment_paths(env.list("ATTACHMENTS").into_iter().map(PathBuf::from).collect());

        // パスワードは実際に送信する場合のみ必須
        let app_password = if dry_run {
            env.get("APP_PASSWORD").filter(|v| !v.trim().is_empty())
        } else {
            Some(env.required("APP_PASSWORD")?)
        };

        let smtp = SmtpConfig {
            host: env
                .get("SMTP_HOST")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            port: env.number("SMTP_PORT", DEFAULT_SMTP_PORT)?,
            use_tls: env.bool("SMTP_USE_TLS", true),
            app_password,
        };

        Ok(Self {
            schedule,
            message,
            smtp,
            dry_run,
        })
    }
}

fn invalid(name: &'static str) -> impl Fn(DomainError) -> ConfigError {
    move |source| ConfigError::Invalid { name, source }
}

/// メールアドレスを検証する
///
/// 値オブジェクトの構造検証に加えて SMTP で使える形式かを確認し、
/// 送信日になって初めて失敗することがないようにする。
fn address(name: &'static str, value: String) -> Result<EmailAddress, ConfigError> {
    let email = EmailAddress::new(value).map_err(invalid(name))?;
    parse_address(&email).map_err(|source| ConfigError::Undeliverable { name, source })?;
    Ok(email)
}

/// 値の型変換ヘルパー
struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// 値をそのまま返す（未設定なら `None`）
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
    }

    /// 必須の値を返す（未設定または空白のみならエラー）
    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing(name))
    }

    fn bool(&self, name: &str, default: bool) -> bool {
        self.get(name).map_or(default, |v| parse_bool(&v))
    }

    /// 数値を返す（未設定または空白のみならデフォルト値）
    fn number<T: FromStr>(&self, name: &'static str, default: T) -> Result<T, ConfigError> {
        match self.get(name) {
            Some(v) if !v.trim().is_empty() => {
                v.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                    name,
                    value: v.clone(),
                })
            }
            _ => Ok(default),
        }
    }

    fn list(&self, name: &str) -> Vec<String> {
        self.get(name).map(|v| parse_list(&v)).unwrap_or_default()
    }

    fn addresses(&self, name: &'static str) -> Result<Vec<EmailAddress>, ConfigError> {
        self.list(name)
            .into_iter()
            .map(|v| address(name, v))
            .collect()
    }
}

/// 真偽値をパースする
///
/// 前後の空白を除いて小文字化し、`1, true, yes, y, on` のいずれかなら true。
pub fn parse_bool(value: &str) -> bool {
    let normalized = value.trim().to_lowercase();
    TRUTHY_VALUES.contains(&normalized.as_str())
}

/// カンマ区切りのリストをパースする
///
/// 各要素の前後の空白を除き、空の要素は捨てる。
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
