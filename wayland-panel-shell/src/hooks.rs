//! Ordered handler chains around toolkit callbacks

use std::fmt;

/// A handler registered on a [`HookChain`]
pub type Hook<C, E> = Box<dyn FnMut(&mut C, &E)>;

/// Handlers running around the toolkit's own handler for an event
///
/// [`run`](HookChain::run) calls the `before` hooks in registration order,
/// then the native handler, then the `after` hooks in registration order.
pub struct HookChain<C, E> {
    before: Vec<Hook<C, E>>,
    after: Vec<Hook<C, E>>,
}

impl<C, E> Default for HookChain<C, E> {
    fn default() -> Self {
        HookChain { before: Vec::new(), after: Vec::new() }
    }
}

impl<C, E> fmt::Debug for HookChain<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookChain")
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .finish()
    }
}

impl<C, E> HookChain<C, E> {
    /// An empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook running before the native handler
    pub fn before(&mut self, hook: impl FnMut(&mut C, &E) + 'static) -> &mut Self {
        self.before.push(Box::new(hook));
        self
    }

    /// Register a hook running after the native handler
    pub fn after(&mut self, hook: impl FnMut(&mut C, &E) + 'static) -> &mut Self {
        self.after.push(Box::new(hook));
        self
    }

    /// Number of registered hooks
    pub fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    /// Whether no hook is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run the chain around `native`
    pub fn run(&mut self, ctx: &mut C, event: &E, native: impl FnOnce(&E)) {
        for hook in &mut self.before {
            hook(ctx, event);
        }
        native(event);
        for hook in &mut self.after {
            hook(ctx, event);
        }
    }
}
