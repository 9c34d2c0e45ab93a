//! Route context - the per-unit-of-work routing state
//!
//! A `RouteContext` is an owned value, one per logical execution unit
//! (request, transaction, task). It is passed by reference to whatever
//! acquires connections, so writes from one unit are never visible to
//! another and no thread affinity is involved.
//!
//! # Overrides
//!
//! Method-level overrides ("always read from a replica", "always write")
//! are scoped: [`RouteContext::scoped`] returns a [`RouteOverride`] guard
//! that restores the enclosing intent when dropped, whether the scope
//! returned, failed with `?`, panicked or was cancelled mid-`await`.
//!
//! ```text
//! begin_unit_of_work(read_only = false)   intent = Write
//!     │
//!     ├── with_read_intent(|ctx| ...)     intent = Read
//!     │       └── (scope exits)           intent = Write   (restored)
//!     │
//! end_unit_of_work()                      intent = unset
//! ```

use std::ops::{Deref, DerefMut};
use tracing::trace;
use uuid::Uuid;

use dsroute_types::RouteIntent;

/// Routing state for one logical execution unit
#[derive(Debug)]
pub struct RouteContext {
    /// Identifier of this execution unit, for logs
    unit_id: Uuid,

    /// Declared intent (None = nobody expressed one)
    intent: Option<RouteIntent>,
}

impl RouteContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self {
            unit_id: Uuid::new_v4(),
            intent: None,
        }
    }

    /// Create a context with an initial intent
    pub fn with_intent(intent: RouteIntent) -> Self {
        Self {
            unit_id: Uuid::new_v4(),
            intent: Some(intent),
        }
    }

    /// Identifier of this execution unit
    pub fn unit_id(&self) -> Uuid {
        self.unit_id
    }

    /// Store `intent`, returning the previous value. Last write wins.
    pub fn set(&mut self, intent: RouteIntent) -> Option<RouteIntent> {
        self.intent.replace(intent)
    }

    /// Current intent, or `None` if unset
    pub fn get(&self) -> Option<RouteIntent> {
        self.intent
    }

    /// Remove any stored intent
    pub fn clear(&mut self) {
        self.intent = None;
    }

    /// Force `intent` regardless of the enclosing unit of work.
    ///
    /// Returns the previous value, which must be handed back to
    /// [`restore_route`](Self::restore_route). Prefer [`scoped`](Self::scoped),
    /// which cannot forget the restore.
    pub fn override_route(&mut self, intent: RouteIntent) -> Option<RouteIntent> {
        let previous = self.set(intent);
        trace!(unit_id = %self.unit_id, ?previous, %intent, "Route overridden");
        previous
    }

    /// Put back the value returned by [`override_route`](Self::override_route)
    pub fn restore_route(&mut self, previous: Option<RouteIntent>) {
        trace!(unit_id = %self.unit_id, ?previous, "Route restored");
        self.intent = previous;
    }

    /// Override the intent until the returned guard is dropped
    pub fn scoped(&mut self, intent: RouteIntent) -> RouteOverride<'_> {
        let previous = self.override_route(intent);
        RouteOverride { ctx: self, previous }
    }

    /// Run `f` with the intent forced to `intent`, restoring afterwards
    pub fn run_with_intent<R>(&mut self, intent: RouteIntent, f: impl FnOnce(&mut RouteContext) -> R) -> R {
        let mut guard = self.scoped(intent);
        f(&mut guard)
    }

    /// Run `f` with reads routed to a replica
    pub fn with_read_intent<R>(&mut self, f: impl FnOnce(&mut RouteContext) -> R) -> R {
        self.run_with_intent(RouteIntent::Read, f)
    }

    /// Run `f` with operations routed to the primary
    pub fn with_write_intent<R>(&mut self, f: impl FnOnce(&mut RouteContext) -> R) -> R {
        self.run_with_intent(RouteIntent::Write, f)
    }
}

impl Default for RouteContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped override of a [`RouteContext`] intent
///
/// Dereferences to the context it overrides. Dropping it restores the
/// intent that was in place when it was created.
#[derive(Debug)]
pub struct RouteOverride<'a> {
    ctx: &'a mut RouteContext,
    previous: Option<RouteIntent>,
}

impl RouteOverride<'_> {
    /// Intent that will be restored on drop
    pub fn previous(&self) -> Option<RouteIntent> {
        self.previous
    }
}

impl Deref for RouteOverride<'_> {
    type Target = RouteContext;

    fn deref(&self) -> &RouteContext {
        self.ctx
    }
}

impl DerefMut for RouteOverride<'_> {
    fn deref_mut(&mut self) -> &mut RouteContext {
        self.ctx
    }
}

impl Drop for RouteOverride<'_> {
    fn drop(&mut self) {
        self.ctx.restore_route(self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn test_set_get_clear() {
        let mut ctx = RouteContext::new();
        assert_eq!(ctx.get(), None);

        assert_eq!(ctx.set(RouteIntent::Read), None);
        assert_eq!(ctx.get(), Some(RouteIntent::Read));

        // Double set is allowed, last write wins
        assert_eq!(ctx.set(RouteIntent::Write), Some(RouteIntent::Read));
        assert_eq!(ctx.get(), Some(RouteIntent::Write));

        ctx.clear();
        assert_eq!(ctx.get(), None);
    }

    #[test]
    fn test_override_and_restore() {
        for prior in [None, Some(RouteIntent::Read), Some(RouteIntent::Write)] {
            let mut ctx = RouteContext::new();
            if let Some(intent) = prior {
                ctx.set(intent);
            }

            let previous = ctx.override_route(RouteIntent::Read);
            assert_eq!(previous, prior);
            assert_eq!(ctx.get(), Some(RouteIntent::Read));

            ctx.restore_route(previous);
            assert_eq!(ctx.get(), prior);
        }
    }

    #[test]
    fn test_scoped_guard_restores() {
        let mut ctx = RouteContext::with_intent(RouteIntent::Write);
        {
            let mut guard = ctx.scoped(RouteIntent::Read);
            assert_eq!(guard.get(), Some(RouteIntent::Read));
            assert_eq!(guard.previous(), Some(RouteIntent::Write));

            // Nested override restores to the enclosing override
            guard.with_write_intent(|inner| {
                assert_eq!(inner.get(), Some(RouteIntent::Write));
            });
            assert_eq!(guard.get(), Some(RouteIntent::Read));
        }
        assert_eq!(ctx.get(), Some(RouteIntent::Write));
    }

    #[test]
    fn test_with_intent_returns_value() {
        let mut ctx = RouteContext::new();
        let seen = ctx.with_read_intent(|inner| inner.get());
        assert_eq!(seen, Some(RouteIntent::Read));
        assert_eq!(ctx.get(), None);
    }

    #[test]
    fn test_run_with_intent_nests() {
        let mut ctx = RouteContext::with_intent(RouteIntent::Read);
        let inner = ctx.run_with_intent(RouteIntent::Write, |outer| {
            let nested = outer.run_with_intent(RouteIntent::Read, |inner| inner.get());
            (nested, outer.get())
        });
        assert_eq!(inner, (Some(RouteIntent::Read), Some(RouteIntent::Write)));
        assert_eq!(ctx.get(), Some(RouteIntent::Read));
    }

    #[test]
    fn test_restore_on_early_return() {
        fn failing(ctx: &mut RouteContext) -> Result<(), String> {
            let _guard = ctx.scoped(RouteIntent::Read);
            let query: Result<(), String> = Err("query failed".to_string());
            query?;
            Ok(())
        }

        let mut ctx = RouteContext::with_intent(RouteIntent::Write);
        assert!(failing(&mut ctx).is_err());
        assert_eq!(ctx.get(), Some(RouteIntent::Write));
    }

    #[test]
    fn test_restore_on_panic() {
        let mut ctx = RouteContext::new();
        let result = catch_unwind(AssertUnwindSafe(|| {
            ctx.with_read_intent::<()>(|_| panic!("boom"));
        }));
        assert!(result.is_err());
        assert_eq!(ctx.get(), None);
    }

    #[test]
    fn test_restore_on_cancellation() {
        let mut ctx = RouteContext::with_intent(RouteIntent::Write);
        {
            let ctx = &mut ctx;
            let mut task = tokio_test::task::spawn(async move {
                let _guard = ctx.scoped(RouteIntent::Read);
                std::future::pending::<()>().await;
            });
            tokio_test::assert_pending!(task.poll());
            // Dropping the pending future cancels it mid-scope
        }
        assert_eq!(ctx.get(), Some(RouteIntent::Write));
    }

    #[test]
    fn test_unit_ids_are_distinct() {
        let a = RouteContext::new();
        let b = RouteContext::new();
        assert_ne!(a.unit_id(), b.unit_id());
    }
}
