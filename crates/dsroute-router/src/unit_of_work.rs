//! Unit-of-work boundary
//!
//! A transaction boundary sets the route intent before the work begins and
//! clears it unconditionally when the work ends. [`UnitOfWork`] ties the
//! clear to scope exit so a failed or cancelled unit cannot leak its
//! intent into the next one run on the same context.

use std::ops::{Deref, DerefMut};
use tracing::debug;

use dsroute_types::RouteIntent;

use crate::context::RouteContext;

/// Active unit of work over a [`RouteContext`]
///
/// Dereferences to the context. Dropping it clears the intent.
#[derive(Debug)]
pub struct UnitOfWork<'a> {
    ctx: &'a mut RouteContext,
    read_only: bool,
}

impl UnitOfWork<'_> {
    /// Read-only flag the unit was started with
    pub fn read_only(&self) -> bool {
        self.read_only
    }

    /// End the unit of work, clearing the route intent
    pub fn end(self) {}
}

impl Deref for UnitOfWork<'_> {
    type Target = RouteContext;

    fn deref(&self) -> &RouteContext {
        self.ctx
    }
}

impl DerefMut for UnitOfWork<'_> {
    fn deref_mut(&mut self) -> &mut RouteContext {
        self.ctx
    }
}

impl Drop for UnitOfWork<'_> {
    fn drop(&mut self) {
        self.ctx.end_unit_of_work();
    }
}

impl RouteContext {
    /// Start a unit of work: READ_INTENT if `read_only`, WRITE_INTENT otherwise
    pub fn begin_unit_of_work(&mut self, read_only: bool) -> UnitOfWork<'_> {
        self.set(RouteIntent::from_read_only(read_only));
        debug!(unit_id = %self.unit_id(), read_only, "Unit of work started");
        UnitOfWork { ctx: self, read_only }
    }

    /// Clear the route intent at the end of a unit of work
    pub fn end_unit_of_work(&mut self) {
        self.clear();
        debug!(unit_id = %self.unit_id(), "Unit of work ended");
    }

    /// Run `work` as one unit of work
    ///
    /// The intent is cleared whether `work` succeeds, fails or panics.
    pub fn in_unit_of_work<T, E>(
        &mut self,
        read_only: bool,
        work: impl FnOnce(&mut RouteContext) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut unit = self.begin_unit_of_work(read_only);
        work(&mut unit)
    }
}
