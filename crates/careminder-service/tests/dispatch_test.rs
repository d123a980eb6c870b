//! Dispatcher behavior: claim exclusivity, channel fallback, retry
//! backoff, truncation, and guard no-ops.

mod common;

use chrono::{Duration, Utc};

use careminder_database::store::{DeliveryStore, ReminderStore};
use careminder_entity::appointment::AppointmentStatus;
use careminder_entity::delivery::{DeliveryChannel, DeliveryStatus};
use careminder_entity::reminder::{ReminderKind, ReminderStatus};
use careminder_service::dispatch::{DispatchOutcome, SkipReason};

use common::TestHarness;

#[tokio::test]
async fn concurrent_dispatch_sends_at_most_once() {
    let h = TestHarness::new();
    let patient = h.seed_patient().await;
    let appointment = h
        .seed_appointment(patient.id, Utc::now() + Duration::days(1))
        .await;
    let reminder = h
        .insert_pending_reminder(
            appointment.id,
            ReminderKind::SevenDays,
            Utc::now() - Duration::minutes(1),
            None,
        )
        .await;

    let (a, b) = tokio::join!(
        h.dispatcher.deliver(reminder.id),
        h.dispatcher.deliver(reminder.id)
    );
    let outcomes = [a.unwrap(), b.unwrap()];

    let sent = outcomes
        .iter()
        .filter(|o| matches!(o, DispatchOutcome::Sent(_)))
        .count();
    let skipped = outcomes
        .iter()
        .filter(|o| matches!(o, DispatchOutcome::Skipped(SkipReason::NotClaimable)))
        .count();
    assert_eq!(sent, 1);
    assert_eq!(skipped, 1);

    assert_eq!(h.line.sent_count().await, 1);
    let attempts = h.deliveries.find_for_reminder(reminder.id).await.unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].status, DeliveryStatus::Sent);
}

#[tokio::test]
async fn email_only_patient_falls_back_to_email() {
    let h = TestHarness::new();
    // Preference points at LINE, but only an email address is on file.
    let patient = h
        .seed_patient_with(
            None,
            Some("only-email@example.com"),
            None,
            Some(DeliveryChannel::Line),
        )
        .await;
    let appointment = h
        .seed_appointment(patient.id, Utc::now() + Duration::days(1))
        .await;
    let reminder = h
        .insert_pending_reminder(
            appointment.id,
            ReminderKind::ThreeDays,
            Utc::now() - Duration::minutes(1),
            None,
        )
        .await;

    let outcome = h.dispatcher.deliver(reminder.id).await.unwrap();
    assert_eq!(outcome, DispatchOutcome::Sent(DeliveryChannel::Email));

    assert_eq!(h.line.sent_count().await, 0);
    assert_eq!(h.sms.sent_count().await, 0);
    let sent = h.email.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "only-email@example.com");
    assert_eq!(sent[0].subject, "Reminder: appointment in three days");
}

#[tokio::test]
async fn preferred_channel_wins_over_fallback_order() {
    let h = TestHarness::new();
    let patient = h
        .seed_patient_with(
            Some("U-line-1"),
            Some("p@example.com"),
            None,
            Some(DeliveryChannel::Email),
        )
        .await;
    let appointment = h
        .seed_appointment(patient.id, Utc::now() + Duration::days(1))
        .await;
    let reminder = h
        .insert_pending_reminder(
            appointment.id,
            ReminderKind::SevenDays,
            Utc::now() - Duration::minutes(1),
            None,
        )
        .await;

    let outcome = h.dispatcher.deliver(reminder.id).await.unwrap();
    assert_eq!(outcome, DispatchOutcome::Sent(DeliveryChannel::Email));
    assert_eq!(h.line.sent_count().await, 0);
}

#[tokio::test]
async fn unreachable_patient_fails_without_delivery_row() {
    let h = TestHarness::new();
    let patient = h.seed_patient_with(None, None, None, None).await;
    let appointment = h
        .seed_appointment(patient.id, Utc::now() + Duration::days(1))
        .await;
    let reminder = h
        .insert_pending_reminder(
            appointment.id,
            ReminderKind::SevenDays,
            Utc::now() - Duration::minutes(1),
            None,
        )
        .await;

    let outcome = h.dispatcher.deliver(reminder.id).await.unwrap();
    assert_eq!(outcome, DispatchOutcome::NoContactableChannel);

    let stored = h.reminders.find_by_id(reminder.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ReminderStatus::Failed);
    assert_eq!(stored.error_message.as_deref(), Some("no contactable channel"));
    assert_eq!(stored.next_retry_at, None);

    let attempts = h.deliveries.find_for_reminder(reminder.id).await.unwrap();
    assert!(attempts.is_empty());
}

#[tokio::test]
async fn cancelled_appointment_turns_dispatch_into_noop() {
    let h = TestHarness::new();
    let patient = h.seed_patient().await;
    let appointment = h
        .seed_appointment(patient.id, Utc::now() + Duration::days(1))
        .await;
    let reminder = h
        .insert_pending_reminder(
            appointment.id,
            ReminderKind::OneDay,
            Utc::now() - Duration::minutes(1),
            None,
        )
        .await;

    h.appointments
        .set_status(appointment.id, AppointmentStatus::Cancelled)
        .await;

    let outcome = h.dispatcher.deliver(reminder.id).await.unwrap();
    assert_eq!(
        outcome,
        DispatchOutcome::Skipped(SkipReason::AppointmentInactive)
    );

    let stored = h.reminders.find_by_id(reminder.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ReminderStatus::Cancelled);
    assert_eq!(h.line.sent_count().await, 0);
}

#[tokio::test]
async fn backoff_windows_grow_until_the_ceiling_stops_retries() {
    let h = TestHarness::new();
    h.line.fail_next(10).await;
    h.email.fail_next(10).await;
    h.sms.fail_next(10).await;

    let patient = h.seed_patient().await;
    let appointment = h
        .seed_appointment(patient.id, Utc::now() + Duration::days(1))
        .await;
    let reminder = h
        .insert_pending_reminder(
            appointment.id,
            ReminderKind::SevenDays,
            Utc::now() - Duration::minutes(1),
            None,
        )
        .await;

    // Attempt 1: wait 1 minute.
    let before = Utc::now();
    let outcome = h.dispatcher.deliver(reminder.id).await.unwrap();
    assert!(matches!(outcome, DispatchOutcome::Failed { .. }));
    let after_first = h.reminders.find_by_id(reminder.id).await.unwrap().unwrap();
    assert_eq!(after_first.status, ReminderStatus::Failed);
    assert_eq!(after_first.retry_count, 1);
    let first_wait = after_first.next_retry_at.unwrap() - before;
    assert!(first_wait >= Duration::minutes(1) && first_wait < Duration::minutes(2));

    // Attempt 2 (requeued as if the window elapsed): wait 5 minutes.
    let requeued = h
        .reminders
        .requeue_failed(Utc::now() + Duration::minutes(2), 3)
        .await
        .unwrap();
    assert_eq!(requeued, 1);
    let before = Utc::now();
    h.dispatcher.deliver(reminder.id).await.unwrap();
    let after_second = h.reminders.find_by_id(reminder.id).await.unwrap().unwrap();
    assert_eq!(after_second.retry_count, 2);
    let second_wait = after_second.next_retry_at.unwrap() - before;
    assert!(second_wait >= Duration::minutes(5) && second_wait < Duration::minutes(6));

    // Attempt 3: wait 15 minutes.
    h.reminders
        .requeue_failed(Utc::now() + Duration::minutes(6), 3)
        .await
        .unwrap();
    let before = Utc::now();
    h.dispatcher.deliver(reminder.id).await.unwrap();
    let after_third = h.reminders.find_by_id(reminder.id).await.unwrap().unwrap();
    assert_eq!(after_third.retry_count, 3);
    let third_wait = after_third.next_retry_at.unwrap() - before;
    assert!(third_wait >= Duration::minutes(15) && third_wait < Duration::minutes(16));

    // Monotonic progression, and the ceiling stops further requeueing.
    assert!(after_first.next_retry_at < after_second.next_retry_at);
    assert!(after_second.next_retry_at < after_third.next_retry_at);

    let requeued = h
        .reminders
        .requeue_failed(Utc::now() + Duration::hours(2), 3)
        .await
        .unwrap();
    assert_eq!(requeued, 0);
    let terminal = h.reminders.find_by_id(reminder.id).await.unwrap().unwrap();
    assert_eq!(terminal.status, ReminderStatus::Failed);
    assert_eq!(terminal.retry_count, 3);
}

#[tokio::test]
async fn sms_content_is_truncated_to_160_chars() {
    let h = TestHarness::new();
    let patient = h
        .seed_patient_with(None, None, Some("+819012345678"), None)
        .await;
    let appointment = h
        .seed_appointment(patient.id, Utc::now() + Duration::days(1))
        .await;
    let long_content = "x".repeat(300);
    let reminder = h
        .insert_pending_reminder(
            appointment.id,
            ReminderKind::Manual,
            Utc::now() - Duration::minutes(1),
            Some(&long_content),
        )
        .await;

    let outcome = h.dispatcher.deliver(reminder.id).await.unwrap();
    assert_eq!(outcome, DispatchOutcome::Sent(DeliveryChannel::Sms));

    let attempts = h.deliveries.find_for_reminder(reminder.id).await.unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].content.chars().count(), 160);

    let transmitted = h.sms.sent_messages().await;
    assert_eq!(transmitted[0].content.chars().count(), 160);
}

#[tokio::test]
async fn successful_retry_resets_bookkeeping() {
    let h = TestHarness::new();
    h.line.fail_next(1).await;

    let patient = h
        .seed_patient_with(Some("U-line-1"), None, None, None)
        .await;
    let appointment = h
        .seed_appointment(patient.id, Utc::now() + Duration::days(1))
        .await;
    let reminder = h
        .insert_pending_reminder(
            appointment.id,
            ReminderKind::ThreeDays,
            Utc::now() - Duration::minutes(1),
            None,
        )
        .await;

    h.dispatcher.deliver(reminder.id).await.unwrap();
    h.reminders
        .requeue_failed(Utc::now() + Duration::minutes(2), 3)
        .await
        .unwrap();
    let outcome = h.dispatcher.deliver(reminder.id).await.unwrap();
    assert_eq!(outcome, DispatchOutcome::Sent(DeliveryChannel::Line));

    let stored = h.reminders.find_by_id(reminder.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ReminderStatus::Sent);
    assert_eq!(stored.retry_count, 0);
    assert_eq!(stored.error_message, None);
    assert_eq!(stored.next_retry_at, None);
    assert!(stored.sent_at.is_some());

    // Append-only audit: one failed row, one sent row.
    let attempts = h.deliveries.find_for_reminder(reminder.id).await.unwrap();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0].status, DeliveryStatus::Failed);
    assert_eq!(attempts[1].status, DeliveryStatus::Sent);
}
