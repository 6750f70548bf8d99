#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use erp_client::http::{Navigator, ToastQueue};
use erp_client::session::{SessionStorage, StorageMedium};
use erp_client::{AccessToken, ApiClient, ClientConfig, SessionStore, User};

pub const STORAGE_KEY: &str = "auth-storage";

/// Records every redirect to the login route.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    count: AtomicUsize,
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn to_login(&self, route: &str) {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.routes.lock().unwrap().push(route.to_owned());
    }
}

/// A client against `base_url` with in-memory media and observable sinks.
pub struct Harness {
    pub client: ApiClient,
    pub toasts: ToastQueue,
    pub navigator: Arc<RecordingNavigator>,
    pub durable: Arc<SessionStorage>,
    pub scoped: Arc<SessionStorage>,
}

impl Harness {
    pub fn new(base_url: &str) -> Self {
        let durable = Arc::new(SessionStorage::new());
        let scoped = Arc::new(SessionStorage::new());
        let session = SessionStore::hydrate(durable.clone(), scoped.clone(), STORAGE_KEY);

        let toasts = ToastQueue::new();
        let navigator = Arc::new(RecordingNavigator::default());
        let config = ClientConfig::new(base_url.parse().unwrap());
        let client = ApiClient::new(&config, session)
            .unwrap()
            .with_notifier(toasts.clone())
            .with_navigator(navigator.clone());

        Self {
            client,
            toasts,
            navigator,
            durable,
            scoped,
        }
    }

    pub fn session(&self) -> &SessionStore {
        self.client.session()
    }

    pub fn logged_in(self, token: &str) -> Self {
        self.session().login(ana(), AccessToken::new(token), false);
        self
    }

    pub fn logged_in_remembered(self, token: &str) -> Self {
        self.session().login(ana(), AccessToken::new(token), true);
        self
    }

    pub fn messages(&self) -> Vec<String> {
        self.toasts.drain().into_iter().map(|n| n.message).collect()
    }

    pub fn durable_record(&self) -> Option<String> {
        self.durable.read(STORAGE_KEY).unwrap()
    }

    pub fn scoped_record(&self) -> Option<String> {
        self.scoped.read(STORAGE_KEY).unwrap()
    }
}

pub fn ana() -> User {
    User::new(1u64, "Ana", "ana@example.com")
}
