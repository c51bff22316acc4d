//! # Monthly Mailer
//!
//! 毎月決まった日時（UTC）にメールを 1 通送信するバッチ。
//!
//! ## 役割
//!
//! 外部スケジューラ（cron、GitHub Actions の schedule など）から定期的に起動され、
//! 1 回の起動ごとに次を行って終了する:
//!
//! - **送信判定**: 現在時刻が設定した日・時刻に一致するか（短い月は末日に繰り下げ）
//! - **メッセージ組み立て**: 本文と添付ファイルから MIME メッセージを作る
//! - **送信**: SMTP リレーへ送信（`DRY_RUN=true` ならログ出力のみ）
//!
//! 送信判定は分単位で一致を見るため、スケジューラの起動間隔は 1 分以下にする。
//!
//! ## 終了コード
//!
//! | 状況 | 終了コード |
//! |------|-----------|
//! | 送信タイミングではない / 送信成功 / ドライラン | 0 |
//! | 設定エラー / 送信失敗 | 非 0 |
//!
//! ## 起動方法
//!
//! ```bash
//! # ドライラン
//! DRY_RUN=true FROM_EMAIL=me@example.com TO_EMAILS=you@example.com \
//!   cargo run -p monthly-mailer
//!
//! # JSON ログ
//! LOG_FORMAT=json cargo run -p monthly-mailer --release
//! ```
//!
//! 環境変数の一覧は [`monthly_mailer::config`] を参照。

use std::sync::Arc;

use monthly_mailer::{config::MailerConfig, usecase::MonthlyMailUseCase};
use monthly_mailer_domain::{clock::SystemClock, path_accessor::LocalPathAccessor};
use monthly_mailer_infra::notification::{MailSender, NoopMailSender, SmtpMailSender};
use monthly_mailer_shared::{
    event_log::error as log_error,
    observability::{TracingConfig, init_tracing},
};
use tracing::Instrument;

const SERVICE_NAME: &str = "monthly-mailer";

/// Monthly Mailer のエントリーポイント
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化
    let tracing_config = TracingConfig::from_env(SERVICE_NAME);
    init_tracing(&tracing_config)?;

    run().instrument(tracing_config.root_span()).await
}

async fn run() -> anyhow::Result<()> {
    let config = MailerConfig::from_env().inspect_err(|e| {
        tracing::error!(
            error.category = log_error::category::CONFIGURATION,
            error.kind = e.kind(),
            variable = e.variable(),
            "設定の読み込みに失敗しました: {e}"
        );
    })?;

    tracing::debug!(
        smtp = ?config.smtp,
        dry_run = config.dry_run,
        "設定を読み込みました"
    );

    let clock = Arc::new(SystemClock);

    let sender: Arc<dyn MailSender> = if config.dry_run {
        Arc::new(NoopMailSender)
    } else {
        let settings = config
            .smtp
            .settings(config.message.from_email())
            .inspect_err(|e| {
                tracing::error!(
                    error.category = log_error::category::CONFIGURATION,
                    error.kind = e.kind(),
                    variable = e.variable(),
                    "設定の読み込みに失敗しました: {e}"
                );
            })?;
        Arc::new(SmtpMailSender::new(&settings, clock.clone())?)
    };

    let usecase = MonthlyMailUseCase::new(clock, Arc::new(LocalPathAccessor), sender);
    let outcome = usecase.run(&config.schedule, &config.message).await?;

    tracing::debug!(?outcome, "処理を終了します");
    Ok(())
}
