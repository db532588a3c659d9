use std::sync::Arc;
use std::time::Duration;

use crate::animal::{
    AnimalStore, ContactPreferencesStore, MemoryAnimalStore, MemoryContactPreferencesStore,
    SeedData, SeedError,
};
use crate::auth::{AuthorizationResolver, IdentityService, LocalIdentityService};
use crate::config::Settings;
use crate::notification::{
    DeliveryChannels, HttpEmailTransport, HttpSmsTransport, NotificationDispatcher,
};
use crate::transition::StatusTransitionHandler;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub animals: Arc<dyn AnimalStore>,
    pub resolver: AuthorizationResolver,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub transitions: Arc<StatusTransitionHandler>,
}

impl AppState {
    /// Build the state with in-memory stores and HTTP transports, loading
    /// the seed file when one is configured.
    pub fn new(settings: Settings) -> Result<Self, SeedError> {
        let identity = Arc::new(LocalIdentityService::new(&settings.jwt, &settings.session));
        let animals = Arc::new(MemoryAnimalStore::new());
        let preferences = Arc::new(MemoryContactPreferencesStore::new());

        if let Some(ref path) = settings.data.seed_path {
            let summary = SeedData::from_file(path)?.apply(&identity, &animals, &preferences);
            tracing::info!(
                path = %path,
                users = summary.users,
                animals = summary.animals,
                contact_preferences = summary.contact_preferences,
                "Seed data loaded"
            );
        }

        let timeout = Duration::from_secs(settings.notifications.channel_timeout_secs);
        let email = HttpEmailTransport::new(settings.email.clone(), timeout);
        let sms = HttpSmsTransport::new(settings.sms.clone(), timeout);
        if !email.is_configured() {
            tracing::info!("Email transport not configured, email notifications will be skipped");
        }
        if !sms.is_configured() {
            tracing::info!("SMS transport not configured, SMS notifications will be skipped");
        }

        let channels = DeliveryChannels {
            email: Arc::new(email),
            sms: Arc::new(sms),
        };

        Ok(Self::with_components(
            settings,
            animals,
            preferences,
            identity,
            channels,
        ))
    }

    /// Wire the state from explicit collaborators
    pub fn with_components(
        settings: Settings,
        animals: Arc<dyn AnimalStore>,
        preferences: Arc<dyn ContactPreferencesStore>,
        identity: Arc<dyn IdentityService>,
        channels: DeliveryChannels,
    ) -> Self {
        let dispatcher = Arc::new(NotificationDispatcher::new(
            animals.clone(),
            preferences,
            identity.clone(),
            channels,
            &settings.notifications,
        ));
        let transitions = Arc::new(StatusTransitionHandler::new(
            animals.clone(),
            dispatcher.clone(),
        ));

        Self {
            settings: Arc::new(settings),
            animals,
            resolver: AuthorizationResolver::new(identity),
            dispatcher,
            transitions,
        }
    }
}
