//! Notification fan-out: recipients, preference gating, masking and
//! failure isolation.

mod common;

use common::*;

use std::time::{Duration, Instant};

use lostpet_notification_service::animal::{Animal, ContactPreferences};
use lostpet_notification_service::notification::{
    ActorContact, ChannelKind, NotificationEvent, RecipientRole, SkipReason,
};

fn finder(email: Option<&str>, phone: Option<&str>) -> ActorContact {
    ActorContact {
        name: Some("Sam".to_string()),
        email: email.map(str::to_string),
        phone: phone.map(str::to_string),
    }
}

#[tokio::test]
async fn test_dispatch_never_fails_when_every_transport_errors() {
    let env = TestEnvironment::with_behaviors(Behavior::Fail, Behavior::Fail)
        .with_visible_preferences();

    let bag = env
        .dispatcher
        .dispatch(NotificationEvent::owner_marked_lost(ANIMAL_ID))
        .await;

    assert!(bag.error.is_none());
    assert_eq!(bag.outcomes.len(), 2);
    assert!(bag.outcomes.iter().all(|o| !o.ok && o.error.is_some()));
    assert_eq!(bag.failures().count(), 2);
    assert_eq!(env.dispatcher.stats().total_failed, 2);
}

#[tokio::test]
async fn test_hidden_email_is_never_attempted() {
    let env = TestEnvironment::new();
    env.preferences.insert(ContactPreferences {
        animal_id: ANIMAL_ID.to_string(),
        show_email: false,
        show_phone: true,
        show_sms: true,
        email: Some(OWNER_EMAIL.to_string()),
        phone: Some("+15550101".to_string()),
    });

    let bag = env
        .dispatcher
        .dispatch(NotificationEvent::owner_marked_lost(ANIMAL_ID))
        .await;

    assert!(env.email.sent().is_empty());
    let email = bag.outcome(RecipientRole::Owner, ChannelKind::Email).unwrap();
    assert!(email.ok);
    assert_eq!(email.skipped, Some(SkipReason::NotVisible));
    assert!(bag.outcome(RecipientRole::Owner, ChannelKind::Sms).unwrap().was_sent());
}

#[tokio::test]
async fn test_owner_email_falls_back_to_identity_address() {
    let env = TestEnvironment::new();
    env.preferences.insert(ContactPreferences {
        animal_id: ANIMAL_ID.to_string(),
        show_email: true,
        ..ContactPreferences::default()
    });

    let bag = env
        .dispatcher
        .dispatch(NotificationEvent::owner_marked_lost(ANIMAL_ID))
        .await;

    assert_eq!(env.email.recipients(), vec![OWNER_EMAIL.to_string()]);
    assert_eq!(
        bag.outcome(RecipientRole::Owner, ChannelKind::Sms).unwrap().skipped,
        Some(SkipReason::NotVisible)
    );
}

#[tokio::test]
async fn test_reported_found_without_preferences_only_reaches_finder() {
    let env = TestEnvironment::new();

    let event = NotificationEvent::reported_found(ANIMAL_ID, finder(Some("f@x.com"), None))
        .location_hint(Some("Elm street".to_string()));
    let bag = env.dispatcher.dispatch(event).await;

    assert_eq!(env.email.recipients(), vec!["f@x.com".to_string()]);
    assert!(env.sms.sent().is_empty());

    let finder_email = bag.outcome(RecipientRole::Finder, ChannelKind::Email).unwrap();
    assert!(finder_email.was_sent());
    assert_eq!(
        bag.outcome(RecipientRole::Finder, ChannelKind::Sms).unwrap().skipped,
        Some(SkipReason::NoAddress)
    );
    for channel in [ChannelKind::Email, ChannelKind::Sms] {
        let owner = bag.outcome(RecipientRole::Owner, channel).unwrap();
        assert!(owner.ok);
        assert_eq!(owner.skipped, Some(SkipReason::NotVisible));
    }
    assert!(!bag.has_failures());
}

#[tokio::test]
async fn test_owner_sees_masked_finder_contact() {
    let env = TestEnvironment::new().with_visible_preferences();

    let event = NotificationEvent::reported_found(
        ANIMAL_ID,
        finder(Some("samwise@shire.org"), Some("+1 555 010 9876")),
    );
    env.dispatcher.dispatch(event).await;

    let owner_message = env.email.message_to(OWNER_EMAIL).unwrap();
    assert_eq!(owner_message.subject, "Biscuit may have been found");
    assert!(owner_message.text.contains("s*****e@shire.org"));
    assert!(owner_message.text.contains("+* *** *** **76"));
    assert!(!owner_message.text.contains("samwise@shire.org"));
    assert!(!owner_message.text.contains("555 010 9876"));

    // The finder gets their own acknowledgement
    let finder_message = env.email.message_to("samwise@shire.org").unwrap();
    assert_ne!(finder_message.subject, owner_message.subject);
    assert!(env.sms.recipients().contains(&"+1 555 010 9876".to_string()));
}

#[tokio::test]
async fn test_finder_without_email_is_not_a_recipient() {
    let env = TestEnvironment::new().with_visible_preferences();

    let event = NotificationEvent::reported_found(ANIMAL_ID, finder(None, Some("+15550199")));
    let bag = env.dispatcher.dispatch(event).await;

    assert!(bag.outcomes.iter().all(|o| o.recipient_role == RecipientRole::Owner));
    assert!(!env.sms.recipients().contains(&"+15550199".to_string()));
}

#[tokio::test]
async fn test_reported_lost_reaches_reporter_and_owner() {
    let env = TestEnvironment::new().with_visible_preferences();

    let reporter = ActorContact {
        name: Some("Robin".to_string()),
        email: Some("robin@example.net".to_string()),
        phone: None,
    };
    let bag = env
        .dispatcher
        .dispatch(NotificationEvent::reported_lost(ANIMAL_ID, reporter))
        .await;

    assert!(bag.outcome(RecipientRole::Reporter, ChannelKind::Email).unwrap().was_sent());
    let owner_message = env.email.message_to(OWNER_EMAIL).unwrap();
    assert_eq!(owner_message.subject, "Biscuit was reported lost");
    assert!(owner_message.text.contains("r***n@example.net"));
}

#[tokio::test]
async fn test_slow_transport_times_out() {
    let env = TestEnvironment::with_behaviors(Behavior::Hang, Behavior::Succeed)
        .with_visible_preferences();

    let bag = env
        .dispatcher
        .dispatch(NotificationEvent::owner_marked_found(ANIMAL_ID))
        .await;

    let email = bag.outcome(RecipientRole::Owner, ChannelKind::Email).unwrap();
    assert!(!email.ok);
    assert!(email.error.as_deref().unwrap().contains("timed out"));
    assert!(bag.outcome(RecipientRole::Owner, ChannelKind::Sms).unwrap().was_sent());
}

#[tokio::test]
async fn test_unconfigured_transport_counts_as_skipped() {
    let env = TestEnvironment::with_behaviors(Behavior::Succeed, Behavior::Unconfigured)
        .with_visible_preferences();

    let bag = env
        .dispatcher
        .dispatch(NotificationEvent::owner_marked_lost(ANIMAL_ID))
        .await;

    let sms = bag.outcome(RecipientRole::Owner, ChannelKind::Sms).unwrap();
    assert!(sms.ok);
    assert_eq!(sms.skipped, Some(SkipReason::NotConfigured));
    assert!(!bag.has_failures());
    assert_eq!(env.dispatcher.stats().total_skipped, 1);
}

#[tokio::test]
async fn test_unknown_animal_aborts_without_sending() {
    let env = TestEnvironment::new().with_visible_preferences();

    let bag = env
        .dispatcher
        .dispatch(NotificationEvent::owner_marked_lost("ghost"))
        .await;

    assert!(bag.error.is_some());
    assert!(bag.outcomes.is_empty());
    assert!(env.email.sent().is_empty());
    assert_eq!(env.dispatcher.stats().total_aborted, 1);
}

#[tokio::test]
async fn test_spawned_dispatch_survives_dropped_handle() {
    let env = TestEnvironment::new().with_visible_preferences();

    drop(
        env.dispatcher
            .spawn_dispatch(NotificationEvent::owner_marked_lost(ANIMAL_ID)),
    );

    for _ in 0..50 {
        if !env.email.sent().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(env.email.recipients(), vec![OWNER_EMAIL.to_string()]);
}

#[tokio::test]
async fn test_hanging_channels_time_out_side_by_side() {
    let env = TestEnvironment::with_behaviors(Behavior::Hang, Behavior::Hang)
        .with_visible_preferences();

    // Finder and owner on both channels: four sends, each bounded at 200ms
    let event = NotificationEvent::reported_found(
        ANIMAL_ID,
        finder(Some("samwise@shire.org"), Some("+15550199")),
    );
    let started = Instant::now();
    let bag = env.dispatcher.dispatch(event).await;
    let elapsed = started.elapsed();

    assert_eq!(bag.failures().count(), 4);
    assert!(
        elapsed < Duration::from_millis(400),
        "sends did not run concurrently: {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_render_failure_sends_default_message() {
    let env = TestEnvironment::new().with_visible_preferences();
    env.animals.insert(Animal::new(ANIMAL_ID, "   ", OWNER_ID));

    let bag = env
        .dispatcher
        .dispatch(NotificationEvent::owner_marked_lost(ANIMAL_ID))
        .await;

    assert_eq!(bag.sent_count(), 2);
    assert!(!bag.has_failures());
    let email = env.email.message_to(OWNER_EMAIL).unwrap();
    assert_eq!(email.subject, "PawTrack: status update");
    let sms = env.sms.message_to("+15550101").unwrap();
    assert_eq!(sms.subject, "PawTrack: status update");
}
