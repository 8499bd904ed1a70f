//! Named guide callbacks.
//!
//! Guide files can't carry code, so `func` actions name a callback that the
//! embedding application registered up front.

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;

use super::action::CallbackAction;
use crate::executor::TextHandler;
use crate::world::EntityRef;

/// Signature every guide callback has: the text handler to compose further
/// messages with, the action that scheduled it, and the triggering entity.
pub type CallbackFn = dyn Fn(&mut TextHandler<'_>, &CallbackAction, &EntityRef) + Send + Sync;

/// A registered callback together with the name guides refer to it by.
#[derive(Clone)]
pub struct GuideFn {
    name: Arc<str>,
    func: Arc<CallbackFn>,
}

impl GuideFn {
    pub fn new<F>(name: &str, func: F) -> Self
    where
        F: Fn(&mut TextHandler<'_>, &CallbackAction, &EntityRef) + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, handler: &mut TextHandler<'_>, action: &CallbackAction, entity: &EntityRef) {
        (self.func)(handler, action, entity)
    }
}

impl fmt::Debug for GuideFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GuideFn").field(&self.name).finish()
    }
}

impl PartialEq for GuideFn {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.func, &other.func)
    }
}

/// Callbacks available to guides, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct CallbackRegistry {
    fns: HashMap<String, GuideFn>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `func` under `name`, replacing any earlier registration.
    pub fn register<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&mut TextHandler<'_>, &CallbackAction, &EntityRef) + Send + Sync + 'static,
    {
        self.fns.insert(name.to_string(), GuideFn::new(name, func));
    }

    pub fn get(&self, name: &str) -> Option<GuideFn> {
        self.fns.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.fns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fns.is_empty()
    }
}
