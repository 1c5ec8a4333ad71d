//! Typed value storage keyed by scope
//!
//! Each value lives under `(Scope, property type)`. Writes compare against
//! the stored value so that only real changes reach watchers.

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::{mpsc, Arc, Mutex, RwLock};

use kaleido_api::Scope;

use crate::event::ChangeEvent;
use crate::iter::{ChangeIterator, SharedReceiver};
use crate::property::Property;

type Slot = (Scope, TypeId);

/// Which changes are reported on the change channel
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Interest {
    /// A property on every scope
    Everywhere(&'static str),
    /// A property on one scope
    On(Scope, &'static str),
}

#[derive(Default)]
struct Tables {
    values: HashMap<Slot, Box<dyn Any + Send + Sync>>,
    interests: HashSet<Interest>,
}

impl Tables {
    fn wants(&self, scope: &Scope, key: &'static str) -> bool {
        self.interests.contains(&Interest::Everywhere(key))
            || self.interests.contains(&Interest::On(scope.clone(), key))
    }
}

/// Shared, watchable property store
///
/// Clones are handles to the same values, watch set and change channel.
pub struct StateStore {
    tables: Arc<RwLock<Tables>>,
    tx: mpsc::Sender<ChangeEvent>,
    rx: SharedReceiver,
}

impl StateStore {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            tx,
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    pub fn get<P: Property>(&self, scope: &Scope) -> Option<P> {
        let tables = self.tables.read().ok()?;
        tables
            .values
            .get(&(scope.clone(), TypeId::of::<P>()))?
            .downcast_ref::<P>()
            .cloned()
    }

    /// Store `value` for `scope`. Returns false when it equals what is stored.
    pub fn set<P: Property>(&self, scope: &Scope, value: P) -> bool {
        let Ok(mut tables) = self.tables.write() else {
            return false;
        };

        let slot = (scope.clone(), TypeId::of::<P>());
        let unchanged = tables
            .values
            .get(&slot)
            .and_then(|stored| stored.downcast_ref::<P>())
            .is_some_and(|stored| *stored == value);
        if unchanged {
            return false;
        }

        tables.values.insert(slot, Box::new(value));
        let notify = tables.wants(scope, P::KEY);
        drop(tables);

        if notify {
            self.notify(scope, P::KEY);
        }
        true
    }

    /// Every scope holding a `P`, with its value, in scope order
    pub fn entries<P: Property>(&self) -> Vec<(Scope, P)> {
        let Ok(tables) = self.tables.read() else {
            return Vec::new();
        };

        let mut entries: Vec<(Scope, P)> = tables
            .values
            .iter()
            .filter(|((_, type_id), _)| *type_id == TypeId::of::<P>())
            .filter_map(|((scope, _), value)| {
                value.downcast_ref::<P>().map(|v| (scope.clone(), v.clone()))
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Report changes of `P` on every scope
    pub fn watch<P: Property>(&self) {
        self.add_interest(Interest::Everywhere(P::KEY));
    }

    /// Report changes of `P` on `scope` only
    pub fn watch_on<P: Property>(&self, scope: Scope) {
        self.add_interest(Interest::On(scope, P::KEY));
    }

    pub fn unwatch_on<P: Property>(&self, scope: &Scope) {
        if let Ok(mut tables) = self.tables.write() {
            tables.interests.remove(&Interest::On(scope.clone(), P::KEY));
        }
    }

    pub fn is_watched(&self, scope: &Scope, key: &'static str) -> bool {
        self.tables
            .read()
            .map(|t| t.wants(scope, key))
            .unwrap_or(false)
    }

    /// Blocking iterator over changes of watched properties
    pub fn iter(&self) -> ChangeIterator {
        ChangeIterator::new(Arc::clone(&self.rx))
    }

    /// Scopes holding at least one value
    pub fn scopes(&self) -> Vec<Scope> {
        let Ok(tables) = self.tables.read() else {
            return Vec::new();
        };
        let mut scopes: Vec<Scope> = tables.values.keys().map(|(s, _)| s.clone()).collect();
        scopes.sort();
        scopes.dedup();
        scopes
    }

    pub fn is_empty(&self) -> bool {
        self.tables
            .read()
            .map(|t| t.values.is_empty())
            .unwrap_or(true)
    }

    fn add_interest(&self, interest: Interest) {
        if let Ok(mut tables) = self.tables.write() {
            tables.interests.insert(interest);
        }
    }

    fn notify(&self, scope: &Scope, key: &'static str) {
        // The receiver lives as long as any handle, so this only fails mid-drop
        let _ = self.tx.send(ChangeEvent::new(scope.clone(), key));
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for StateStore {
    fn clone(&self) -> Self {
        Self {
            tables: Arc::clone(&self.tables),
            tx: self.tx.clone(),
            rx: Arc::clone(&self.rx),
        }
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("scopes", &self.scopes())
            .finish()
    }
}
