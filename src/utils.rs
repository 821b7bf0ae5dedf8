// Copyright 2022 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Utility functions used by several parts of this crate.
//!
//! This module is for anything that doesn't fit into the other top-level modules. Try not to add
//! new code here unless it really doesn't belong anywhere else.

use std::sync::OnceLock;
use std::thread::ThreadId;

/// Checks that an object is only ever used from a single thread.
///
/// The checker starts detached: the first call to [`SequenceChecker::check_run_on`] binds it to
/// the calling thread, and every later call must come from that same thread. A call from another
/// thread is a programming error and panics in debug builds. Release builds do not check anything.
#[derive(Debug, Default)]
pub struct SequenceChecker {
    owner: OnceLock<ThreadId>,
}

impl SequenceChecker {
    /// Creates a detached checker.
    pub fn new() -> Self {
        Default::default()
    }

    /// Unbinds the checker so that the next checked call binds it again.
    pub fn detach(&mut self) {
        self.owner = OnceLock::new();
    }

    /// Returns true if the calling thread is the one the checker is bound to, binding it first if
    /// the checker is detached.
    pub fn is_current(&self) -> bool {
        let current = std::thread::current().id();
        *self.owner.get_or_init(|| current) == current
    }

    /// Asserts that the calling thread owns the checked object.
    pub fn check_run_on(&self) {
        if cfg!(debug_assertions) && !self.is_current() {
            log::error!(
                "Accessed from thread {:?}, but bound to thread {:?}",
                std::thread::current().id(),
                self.owner.get()
            );
            panic!("sequence checker violation: object used from more than one thread");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn binds_on_first_use() {
        let checker = SequenceChecker::new();
        assert!(checker.owner.get().is_none());

        assert!(checker.is_current());
        assert_eq!(checker.owner.get(), Some(&std::thread::current().id()));

        checker.check_run_on();
        checker.check_run_on();
    }

    #[test]
    fn binds_to_first_thread() {
        let checker = Arc::new(SequenceChecker::new());

        let remote = Arc::clone(&checker);
        let bound_remotely = std::thread::spawn(move || remote.is_current()).join().unwrap();

        assert!(bound_remotely);
        assert!(!checker.is_current());
    }

    #[test]
    fn detach_allows_rebinding() {
        let mut checker = SequenceChecker::new();
        std::thread::scope(|s| {
            s.spawn(|| checker.check_run_on());
        });
        assert!(!checker.is_current());

        checker.detach();
        assert!(checker.is_current());
        checker.check_run_on();
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "sequence checker violation")]
    fn panics_on_foreign_thread() {
        let checker = SequenceChecker::new();
        std::thread::scope(|s| {
            s.spawn(|| checker.check_run_on());
        });

        checker.check_run_on();
    }
}
