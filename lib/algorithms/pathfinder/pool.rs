use std::cell::RefCell;

use super::engine::PathFinder;
use super::goal::{Goal, SearchOptions};
use super::room::RoomResolver;
use super::types::{SearchError, SearchOutcome};
use crate::datatypes::WorldPosition;

thread_local! {
    // Two instances per thread: a resolver sometimes issues a nested search,
    // and the spare covers one level of recursion without paying the ~2 MB
    // allocation. Anything deeper allocates a fresh instance.
    static PATH_FINDERS: [RefCell<PathFinder>; 2] =
        [RefCell::new(PathFinder::new()), RefCell::new(PathFinder::new())];
}

/// Runs a search on a thread-local pooled instance.
///
/// Picks the first instance not currently in use; the borrow state of each
/// slot doubles as its in-use flag, so re-entrant calls from inside a
/// resolver transparently get the next slot.
pub fn search(
    origin: WorldPosition,
    goals: &[Goal],
    resolver: &mut dyn RoomResolver,
    options: SearchOptions,
) -> Result<SearchOutcome, SearchError> {
    PATH_FINDERS.with(|pool| {
        for slot in pool.iter() {
            if let Ok(mut pf) = slot.try_borrow_mut() {
                return pf.search(origin, goals, resolver, options);
            }
        }
        PathFinder::new().search(origin, goals, resolver, options)
    })
}
