use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::DEFAULT_FORM_IDLE_TTL_SECS;
use crate::form::FlightForm;
use crate::models::FormView;
use crate::variants::FormVariant;

/// Live form sessions. In memory only; nothing outlives the process.
///
/// The lock is only held for synchronous edits, never across a request to
/// the prediction service. Forms idle for longer than `idle_ttl` are
/// dropped whenever a new form is opened; a pending form is never dropped.
#[derive(Clone)]
pub struct FormStore {
    forms: Arc<Mutex<HashMap<Uuid, FlightForm>>>,
    idle_ttl: Duration,
}

impl Default for FormStore {
    fn default() -> Self {
        Self::with_idle_ttl(Duration::from_secs(DEFAULT_FORM_IDLE_TTL_SECS))
    }
}

impl FormStore {
    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            forms: Arc::new(Mutex::new(HashMap::new())),
            idle_ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, FlightForm>> {
        self.forms.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn create(&self, variant: Arc<FormVariant>) -> FormView {
        let evicted = self.evict_idle(Utc::now());
        if evicted > 0 {
            log::info!("evicted {} idle forms", evicted);
        }

        let id = Uuid::new_v4();
        let form = FlightForm::new(variant);
        let view = form.view(id);
        self.lock().insert(id, form);
        view
    }

    pub fn view(&self, id: Uuid) -> Option<FormView> {
        self.lock().get(&id).map(|form| form.view(id))
    }

    /// Run `f` against one form. `None` if the form does not exist.
    pub fn with_form<R>(&self, id: Uuid, f: impl FnOnce(&mut FlightForm) -> R) -> Option<R> {
        self.lock().get_mut(&id).map(f)
    }

    pub fn remove(&self, id: Uuid) -> bool {
        self.lock().remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Drop forms with no activity for longer than the idle ttl, as of `now`.
    /// Returns how many were dropped.
    pub fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        let ttl = self.idle_ttl;
        let mut forms = self.lock();
        let before = forms.len();
        forms.retain(|_, form| {
            form.is_pending()
                || (now - form.last_active())
                    .to_std()
                    .map(|idle| idle <= ttl)
                    .unwrap_or(true)
        });
        before - forms.len()
    }
}
