//! Observable theme service.
//!
//! Holds the current [`Theme`], persists changes through the settings
//! aggregate and tells subscribers about every change. Hosts create one
//! service and hand it to whatever needs the theme, instead of reaching for a
//! global.

use crate::error::Result;
use crate::model::Theme;
use crate::store::{GrimoireStore, KvBackend};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(Theme)>;

#[derive(Default)]
pub struct ThemeService {
    current: Theme,
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
}

impl ThemeService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the stored theme and notifies subscribers once.
    pub fn init<B: KvBackend>(&mut self, store: &GrimoireStore<B>) -> Result<Theme> {
        self.current = store.get_settings()?.theme;
        debug!(theme = %self.current, "theme initialised");
        self.notify();
        Ok(self.current)
    }

    pub fn get(&self) -> Theme {
        self.current
    }

    /// Persists `theme`, then notifies. A failed save leaves the current theme
    /// and the subscribers untouched.
    pub fn set<B: KvBackend>(&mut self, store: &GrimoireStore<B>, theme: Theme) -> Result<()> {
        let mut settings = store.get_settings()?;
        settings.theme = theme;
        store.save_settings(&settings)?;
        self.current = theme;
        self.notify();
        Ok(())
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(Theme) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Returns false when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self) {
        let theme = self.current;
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(theme);
        }
    }
}
