//! Host callback registry.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::settings::Params;

/// Host callback receiving the selected URL and the caller params.
pub type Callback = Arc<dyn Fn(&str, &Params) + Send + Sync>;

/// Browsing context a callback was registered in, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    Window,
    Parent,
    Top,
}

impl Scope {
    /// Scopes in lookup order.
    pub const LOOKUP_ORDER: [Scope; 3] = [Scope::Window, Scope::Parent, Scope::Top];
}

/// Callbacks registered by the host, keyed by scope and name.
#[derive(Default, Clone)]
pub struct CallbackRegistry {
    scopes: BTreeMap<Scope, HashMap<String, Callback>>,
}

impl CallbackRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` under `name` in `scope`, replacing any previous one.
    pub fn register<F>(&mut self, scope: Scope, name: impl Into<String>, callback: F)
    where
        F: Fn(&str, &Params) + Send + Sync + 'static,
    {
        self.scopes
            .entry(scope)
            .or_default()
            .insert(name.into(), Arc::new(callback));
    }

    /// Find `name`, searching window, then parent, then top.
    pub fn resolve(&self, name: &str) -> Option<(Scope, Callback)> {
        Scope::LOOKUP_ORDER.into_iter().find_map(|scope| {
            self.scopes
                .get(&scope)
                .and_then(|callbacks| callbacks.get(name))
                .map(|callback| (scope, Arc::clone(callback)))
        })
    }

    /// Whether no callback is registered.
    pub fn is_empty(&self) -> bool {
        self.scopes.values().all(HashMap::is_empty)
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: BTreeMap<_, Vec<_>> = self
            .scopes
            .iter()
            .map(|(scope, callbacks)| (scope, callbacks.keys().collect()))
            .collect();
        f.debug_struct("CallbackRegistry").field("scopes", &names).finish()
    }
}
