mod dispatcher;
mod notifier;

pub use dispatcher::DispatchError;
pub use dispatcher::NotificationDispatcher;
pub use notifier::HttpNotifier;
pub use notifier::Notifier;
