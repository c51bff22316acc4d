//! # 月次メール送信ユースケース
//!
//! 送信判定 → メッセージ組み立て → 送信 を 1 回の起動で行う。
//!
//! ## 設計方針
//!
//! - **判定ごとにログ**: 送信しない理由（時刻外、日付不一致、短い月のスキップ）を必ず残す
//! - **添付の欠落は警告のみ**: 組み立て結果のスキップ一覧を警告として出力し、送信は続ける
//! - **送信失敗は致命的**: 再送せず、エラーをそのまま返す

use std::sync::Arc;

use itertools::Itertools;
use monthly_mailer_domain::{
    clock::Clock,
    message::{MessageConfig, build_message},
    notification::NotificationError,
    path_accessor::PathAccessor,
    schedule::{ScheduleConfig, TriggerDecision, evaluate},
    value_objects::EmailAddress,
};
use monthly_mailer_infra::notification::MailSender;
use monthly_mailer_shared::{
    event_log::{error as log_error, event},
    log_business_event,
};

/// 1 回の起動の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// 送信タイミングではなかった
    Skipped(TriggerDecision),
    /// 送信した
    Sent { recipients: Vec<EmailAddress> },
    /// 送信タイミングだったがドライランのため送信しなかった
    DryRun { recipients: Vec<EmailAddress> },
}

/// 月次メール送信ユースケース
pub struct MonthlyMailUseCase {
    clock:         Arc<dyn Clock>,
    path_accessor: Arc<dyn PathAccessor>,
    sender:        Arc<dyn MailSender>,
}

impl MonthlyMailUseCase {
    pub fn new(
        clock: Arc<dyn Clock>,
        path_accessor: Arc<dyn PathAccessor>,
        sender: Arc<dyn MailSender>,
    ) -> Self {
        Self {
            clock,
            path_accessor,
            sender,
        }
    }

    /// 1 回分の処理を実行する
    ///
    /// # エラー
    ///
    /// 送信処理が失敗した場合は `NotificationError` を返す。
    pub async fn run(
        &self,
        schedule: &ScheduleConfig,
        message_config: &MessageConfig,
    ) -> Result<RunOutcome, NotificationError> {
        let now = self.clock.now();
        tracing::info!(now = %now.to_rfc3339(), "現在時刻（UTC）");

        let decision = evaluate(now, schedule);
        log_decision(&decision);
        if !decision.should_send() {
            return Ok(RunOutcome::Skipped(decision));
        }

        let message = build_message(message_config, self.path_accessor.as_ref());
        for skipped in message.skipped_attachments() {
            tracing::warn!(
                event.kind = "business_event",
                event.category = event::category::MAIL,
                event.action = event::action::ATTACHMENT_SKIPPED,
                event.result = event::result::SKIP,
                attachment.path = %skipped.path.display(),
                attachment.reason = %skipped.reason,
                "添付ファイルをスキップします: {}",
                skipped.path.display()
            );
        }

        let recipients = message.recipients().to_vec();
        let recipient_list = recipients.iter().join(", ");

        if let Err(e) = self.sender.send(&message).await {
            tracing::error!(
                error.category = log_error::category::EXTERNAL_SERVICE,
                error.kind = error_kind(&e),
                "メール送信に失敗しました: {e}"
            );
            log_business_event!(
                event.category = event::category::MAIL,
                event.action = event::action::MAIL_FAILED,
                event.result = event::result::FAILURE,
                mail.recipients = %recipient_list,
                error = %e,
                "メール送信失敗"
            );
            return Err(e);
        }

        if self.sender.is_dry_run() {
            log_business_event!(
                event.category = event::category::MAIL,
                event.action = event::action::MAIL_DRY_RUN,
                event.result = event::result::SKIP,
                mail.recipients = %recipient_list,
                "DRY_RUN のため送信しませんでした"
            );
            return Ok(RunOutcome::DryRun { recipients });
        }

        log_business_event!(
            event.category = event::category::MAIL,
            event.action = event::action::MAIL_SENT,
            event.result = event::result::SUCCESS,
            mail.recipients = %recipient_list,
            mail.attachments = message.attachments().count(),
            "送信しました: {recipient_list}"
        );
        Ok(RunOutcome::Sent { recipients })
    }
}

/// 送信エラーをログの `error.kind` に分類する
///
/// SMTP セッション前に失敗したもの（アドレス変換、MIME 構築）は `message_build`。
fn error_kind(error: &NotificationError) -> &'static str {
    match error {
        NotificationError::InvalidAddress(_) | NotificationError::BuildFailed(_) => {
            log_error::kind::MESSAGE_BUILD
        }
        NotificationError::SendFailed(_) => log_error::kind::SMTP,
    }
}

fn log_decision(decision: &TriggerDecision) {
    let result = if decision.should_send() {
        event::result::SEND
    } else {
        event::result::SKIP
    };

    match decision {
        TriggerDecision::NotYetTime { now, target } => log_business_event!(
            event.category = event::category::SCHEDULE,
            event.action = event::action::TRIGGER_EVALUATED,
            event.result = result,
            trigger.reason = decision.reason(),
            "送信時刻ではありません（現在 {now}、設定 {target}）"
        ),
        TriggerDecision::ShortMonthSkip {
            target_day,
            last_day,
        } => log_business_event!(
            event.category = event::category::SCHEDULE,
            event.action = event::action::TRIGGER_EVALUATED,
            event.result = result,
            trigger.reason = decision.reason(),
            "送信日 {target_day} は当月の末日 {last_day} を超え、SEND_ON_LAST_IF_SHORT=false のためスキップします"
        ),
        TriggerDecision::DayMismatch {
            today,
            effective_day,
        } => log_business_event!(
            event.category = event::category::SCHEDULE,
            event.action = event::action::TRIGGER_EVALUATED,
            event.result = result,
            trigger.reason = decision.reason(),
            "今日は {today} 日、送信日は {effective_day} 日のため送信しません"
        ),
        TriggerDecision::Send { effective_day } => log_business_event!(
            event.category = event::category::SCHEDULE,
            event.action = event::action::TRIGGER_EVALUATED,
            event.result = result,
            trigger.reason = decision.reason(),
            trigger.effective_day = effective_day,
            "送信日です（{effective_day} 日）"
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::{DateTime, TimeZone, Utc};
    use monthly_mailer_domain::{
        clock::FixedClock,
        path_accessor::InMemoryPathAccessor,
        value_objects::{RunTime, TargetDay},
    };
    use monthly_mailer_infra::{mock::MockMailSender, notification::NoopMailSender};
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    fn email(value: &str) -> EmailAddress {
        EmailAddress::new(value).unwrap()
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, day, hour, 0, 0).unwrap()
    }

    fn usecase(
        now: DateTime<Utc>,
        files: InMemoryPathAccessor,
        sender: Arc<dyn MailSender>,
    ) -> MonthlyMailUseCase {
        MonthlyMailUseCase::new(Arc::new(FixedClock::new(now)), Arc::new(files), sender)
    }

    fn schedule(target_day: u32, send_on_last_if_short: bool) -> ScheduleConfig {
        ScheduleConfig::new(
            TargetDay::new(target_day).unwrap(),
            RunTime::new(8, 0).unwrap(),
            send_on_last_if_short,
        )
    }

    #[fixture]
    fn message_config() -> MessageConfig {
        MessageConfig::new(
            email("sender@example.com"),
            vec![email("a@example.com"), email("b@example.com")],
            "Monthly Update",
        )
        .unwrap()
        .with_cc(vec![email("c@example.com")])
        .with_bcc(vec![email("d@example.com")])
    }

    #[rstest]
    #[tokio::test]
    async fn test_送信時刻でなければ送信しない(message_config: MessageConfig) {
        let sender = MockMailSender::new();
        let sut = usecase(at(30, 9), InMemoryPathAccessor::new(), Arc::new(sender.clone()));

        let outcome = sut.run(&schedule(30, true), &message_config).await.unwrap();

        assert!(matches!(
            outcome,
            RunOutcome::Skipped(TriggerDecision::NotYetTime { .. })
        ));
        assert!(sender.sent_messages().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_短い月で繰り下げ無効なら送信しない(message_config: MessageConfig) {
        let sender = MockMailSender::new();
        let sut = usecase(at(30, 8), InMemoryPathAccessor::new(), Arc::new(sender.clone()));

        let outcome = sut.run(&schedule(31, false), &message_config).await.unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Skipped(TriggerDecision::ShortMonthSkip {
                target_day: TargetDay::new(31).unwrap(),
                last_day:   30,
            })
        );
        assert!(sender.sent_messages().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_送信日には全配送先へ送信する(message_config: MessageConfig) {
        let sender = MockMailSender::new();
        let sut = usecase(at(30, 8), InMemoryPathAccessor::new(), Arc::new(sender.clone()));

        let outcome = sut.run(&schedule(31, true), &message_config).await.unwrap();

        let expected = vec![
            email("a@example.com"),
            email("b@example.com"),
            email("c@example.com"),
            email("d@example.com"),
        ];
        assert_eq!(
            outcome,
            RunOutcome::Sent {
                recipients: expected.clone(),
            }
        );
        let sent = sender.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipients(), expected.as_slice());
    }

    #[rstest]
    #[tokio::test]
    async fn test_存在しない添付があっても残りを添付して送信する(
        message_config: MessageConfig,
    ) {
        let sender = MockMailSender::new();
        let files = InMemoryPathAccessor::new().with_file("reports/ok.pdf", b"%PDF".to_vec());
        let sut = usecase(at(15, 8), files, Arc::new(sender.clone()));
        let config = message_config.with_attachment_paths(vec![
            PathBuf::from("reports/missing.pdf"),
            PathBuf::from("reports/ok.pdf"),
        ]);

        let outcome = sut.run(&schedule(15, true), &config).await.unwrap();

        assert!(matches!(outcome, RunOutcome::Sent { .. }));
        let sent = sender.sent_messages();
        assert_eq!(sent[0].attachments().count(), 1);
        assert_eq!(sent[0].skipped_attachments().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_ドライランでは送信せずにdry_runを返す(message_config: MessageConfig) {
        let sut = usecase(at(15, 8), InMemoryPathAccessor::new(), Arc::new(NoopMailSender));

        let outcome = sut.run(&schedule(15, true), &message_config).await.unwrap();

        assert!(matches!(outcome, RunOutcome::DryRun { recipients } if recipients.len() == 4));
    }

    #[rstest]
    #[tokio::test]
    async fn test_送信失敗はエラーとして返す(message_config: MessageConfig) {
        let sut = usecase(
            at(15, 8),
            InMemoryPathAccessor::new(),
            Arc::new(MockMailSender::failing()),
        );

        let result = sut.run(&schedule(15, true), &message_config).await;

        assert!(matches!(result, Err(NotificationError::SendFailed(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn test_メッセージ構築の失敗もエラーとして返す(message_config: MessageConfig) {
        let sut = usecase(
            at(15, 8),
            InMemoryPathAccessor::new(),
            Arc::new(MockMailSender::failing_with(NotificationError::BuildFailed)),
        );

        let result = sut.run(&schedule(15, true), &message_config).await;

        let err = result.unwrap_err();
        assert!(matches!(err, NotificationError::BuildFailed(_)));
        assert_eq!(error_kind(&err), "message_build");
    }

    #[rstest]
    #[case(NotificationError::InvalidAddress("a(b@example.com".to_string()), "message_build")]
    #[case(NotificationError::BuildFailed("境界".to_string()), "message_build")]
    #[case(NotificationError::SendFailed("535 認証失敗".to_string()), "smtp")]
    fn test_送信エラーはバリアントごとにerror_kindを分ける(
        #[case] error: NotificationError,
        #[case] expected: &str,
    ) {
        assert_eq!(error_kind(&error), expected);
    }
}
