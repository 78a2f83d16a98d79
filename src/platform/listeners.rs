//! Event listener registry
//!
//! Every listener the game registers is kept in a [`ListenerSet`] together
//! with its target and callback. Dropping the set unregisters them all, so no
//! callback can be invoked after it has been freed.

/// Something callbacks can be registered on (a DOM `EventTarget` in the browser)
pub trait ListenerTarget: Clone {
    type Callback;
    type Error;

    fn add_listener(&self, kind: &'static str, callback: &Self::Callback) -> Result<(), Self::Error>;

    fn remove_listener(&self, kind: &'static str, callback: &Self::Callback);
}

struct Registration<T: ListenerTarget> {
    target: T,
    kind: &'static str,
    callback: T::Callback,
}

/// Owned listeners, unregistered on [`clear`](ListenerSet::clear) or drop
pub struct ListenerSet<T: ListenerTarget> {
    registrations: Vec<Registration<T>>,
}

impl<T: ListenerTarget> Default for ListenerSet<T> {
    fn default() -> Self {
        Self {
            registrations: Vec::new(),
        }
    }
}

impl<T: ListenerTarget> ListenerSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for `kind` events on `target`. The callback is only
    /// kept when registration succeeds.
    pub fn add(&mut self, target: &T, kind: &'static str, callback: T::Callback) -> Result<(), T::Error> {
        target.add_listener(kind, &callback)?;
        self.registrations.push(Registration {
            target: target.clone(),
            kind,
            callback,
        });
        Ok(())
    }

    /// Move every registration of `other` into this set
    pub fn extend(&mut self, mut other: ListenerSet<T>) {
        self.registrations.append(&mut other.registrations);
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Unregister everything, then free the callbacks
    pub fn clear(&mut self) {
        for reg in self.registrations.drain(..) {
            reg.target.remove_listener(reg.kind, &reg.callback);
        }
    }
}

impl<T: ListenerTarget> Drop for ListenerSet<T> {
    fn drop(&mut self) {
        self.clear();
    }
}
