//! Shared fixtures and test doubles for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderMap;
use dashmap::DashMap;

use lostpet_notification_service::animal::{
    Animal, ContactPreferences, MemoryAnimalStore, MemoryContactPreferencesStore,
};
use lostpet_notification_service::auth::{IdentityService, UserProfile};
use lostpet_notification_service::config::NotificationConfig;
use lostpet_notification_service::error::AppError;
use lostpet_notification_service::notification::{
    ChannelError, ChannelKind, DeliveryChannel, DeliveryChannels, NotificationDispatcher,
    RenderedMessage,
};
use lostpet_notification_service::transition::StatusTransitionHandler;

pub const OWNER_ID: &str = "owner-1";
pub const OWNER_EMAIL: &str = "dana.owner@example.com";
pub const ANIMAL_ID: &str = "biscuit";

/// How a test channel behaves when asked to send
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    Succeed,
    Unconfigured,
    Fail,
    Hang,
    Panic,
}

/// Channel double that records every send it receives
pub struct RecordingChannel {
    kind: ChannelKind,
    behavior: Behavior,
    sent: Mutex<Vec<(String, RenderedMessage)>>,
}

impl RecordingChannel {
    pub fn new(kind: ChannelKind, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            kind,
            behavior,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<(String, RenderedMessage)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn recipients(&self) -> Vec<String> {
        self.sent().into_iter().map(|(to, _)| to).collect()
    }

    pub fn message_to(&self, to: &str) -> Option<RenderedMessage> {
        self.sent()
            .into_iter()
            .find(|(recipient, _)| recipient == to)
            .map(|(_, message)| message)
    }
}

#[async_trait]
impl DeliveryChannel for RecordingChannel {
    fn kind(&self) -> ChannelKind {
        self.kind
    }

    async fn send(&self, to: &str, content: &RenderedMessage) -> Result<(), ChannelError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), content.clone()));

        match self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Unconfigured => Err(ChannelError::NotConfigured),
            Behavior::Fail => Err(ChannelError::Transport("connection refused".to_string())),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
            Behavior::Panic => panic!("transport exploded"),
        }
    }
}

/// Identity double with a user directory and fixed credentials
#[derive(Default)]
pub struct StubIdentity {
    users: DashMap<String, UserProfile>,
    /// bearer token -> subject
    tokens: DashMap<String, String>,
}

impl StubIdentity {
    pub fn with_owner() -> Arc<Self> {
        let identity = Self::default();
        identity.users.insert(
            OWNER_ID.to_string(),
            UserProfile {
                id: OWNER_ID.to_string(),
                email: OWNER_EMAIL.to_string(),
                display_name: "Dana".to_string(),
            },
        );
        identity
            .tokens
            .insert("owner-token".to_string(), OWNER_ID.to_string());
        identity
            .tokens
            .insert("stranger-token".to_string(), "stranger".to_string());
        Arc::new(identity)
    }
}

#[async_trait]
impl IdentityService for StubIdentity {
    async fn validate_bearer_token(&self, token: &str) -> Result<String, AppError> {
        self.tokens
            .get(token)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::Auth("unknown token".to_string()))
    }

    async fn session_identity(&self, _headers: &HeaderMap) -> Option<String> {
        None
    }

    async fn lookup_user_by_id(&self, id: &str) -> Option<UserProfile> {
        self.users.get(id).map(|entry| entry.value().clone())
    }
}

pub struct TestEnvironment {
    pub animals: Arc<MemoryAnimalStore>,
    pub preferences: Arc<MemoryContactPreferencesStore>,
    pub identity: Arc<StubIdentity>,
    pub email: Arc<RecordingChannel>,
    pub sms: Arc<RecordingChannel>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub transitions: StatusTransitionHandler,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self::with_behaviors(Behavior::Succeed, Behavior::Succeed)
    }

    pub fn with_behaviors(email: Behavior, sms: Behavior) -> Self {
        let animals = Arc::new(MemoryAnimalStore::new());
        animals.insert(Animal::new(ANIMAL_ID, "Biscuit", OWNER_ID));
        let preferences = Arc::new(MemoryContactPreferencesStore::new());
        let identity = StubIdentity::with_owner();
        let email = RecordingChannel::new(ChannelKind::Email, email);
        let sms = RecordingChannel::new(ChannelKind::Sms, sms);

        let config = NotificationConfig {
            app_name: "PawTrack".to_string(),
            channel_timeout_secs: 5,
            max_text_len: 300,
        };
        let dispatcher = Arc::new(
            NotificationDispatcher::new(
                animals.clone(),
                preferences.clone(),
                identity.clone(),
                DeliveryChannels {
                    email: email.clone(),
                    sms: sms.clone(),
                },
                &config,
            )
            .with_send_timeout(Duration::from_millis(200)),
        );
        let transitions = StatusTransitionHandler::new(animals.clone(), dispatcher.clone());

        Self {
            animals,
            preferences,
            identity,
            email,
            sms,
            dispatcher,
            transitions,
        }
    }

    /// Owner shows email and SMS
    pub fn with_visible_preferences(self) -> Self {
        self.preferences.insert(ContactPreferences {
            animal_id: ANIMAL_ID.to_string(),
            show_email: true,
            show_phone: true,
            show_sms: true,
            email: Some(OWNER_EMAIL.to_string()),
            phone: Some("+15550101".to_string()),
        });
        self
    }
}
