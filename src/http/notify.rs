use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use derive_more::Display;

/// User-facing messages shown by the client wrapper.
pub mod messages {
    pub const SESSION_EXPIRED: &str = "Sessão expirada. Faça login novamente.";
    pub const INVALID_CREDENTIALS: &str = "Credenciais inválidas.";
    pub const FORBIDDEN: &str = "Você não tem permissão para realizar esta ação.";
    pub const NOT_FOUND: &str = "Recurso não encontrado.";
    pub const VALIDATION_FAILED: &str = "Verifique os dados informados.";
    pub const SERVER_ERROR: &str = "Erro no servidor. Tente novamente mais tarde.";
    pub const NO_RESPONSE: &str = "Sem resposta do servidor. Verifique sua conexão.";
    pub const REQUEST_FAILED: &str = "Erro ao processar a requisição.";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Level {
    #[display("info")]
    Info,
    #[display("success")]
    Success,
    #[display("warning")]
    Warning,
    #[display("error")]
    Error,
}

/// A transient, toast-style message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Notification {
    pub level: Level,
    pub message: String,
    /// Form field the message belongs to (422 field errors).
    pub field: Option<String>,
}

impl Notification {
    #[must_use]
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            field: None,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warning, message)
    }

    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// Sink for [`Notification`]s. Fire-and-forget: implementations must not block.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, notification: Notification);
}

/// Forces the UI to the login screen after a session expiry.
pub trait Navigator: Send + Sync + 'static {
    fn to_login(&self, route: &str);
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}

impl<T: Navigator + ?Sized> Navigator for Arc<T> {
    fn to_login(&self, route: &str) {
        (**self).to_login(route);
    }
}

/// Default notifier: logs every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, n: Notification) {
        match n.level {
            Level::Error => tracing::error!(field = ?n.field, "{}", n.message),
            Level::Warning => tracing::warn!(field = ?n.field, "{}", n.message),
            Level::Info | Level::Success => tracing::info!(field = ?n.field, "{}", n.message),
        }
    }
}

/// Default navigator: logs the redirect the host UI should perform.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn to_login(&self, route: &str) {
        tracing::info!(route, "Redirect to login");
    }
}

/// Buffering notifier the UI drains to render toasts.
#[derive(Debug, Clone, Default)]
pub struct ToastQueue {
    inner: Arc<Mutex<VecDeque<Notification>>>,
}

impl ToastQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every pending notification, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<Notification> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, notification: Notification) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(notification);
    }
}
