//! Entity client layer
//!
//! Typed handles over a shared [`Repository`](crate::repository::Repository):
//!
//! - [`asynchronous`]: [`AsyncRubicon`], [`AsyncProject`], [`AsyncExperiment`].
//!   Every call returns a future the caller awaits. Batches of calls run
//!   concurrently with [`try_gather`] (all results or the first failure)
//!   or [`gather_settled`] (every result, independently).
//! - [`blocking`]: [`Rubicon`], [`Project`], [`Experiment`]. Every call
//!   blocks the calling thread until its I/O completes.
//!
//! Both variants read and write the same records, so data logged through
//! one is visible through the other.
//!
//! Concurrency only pays off against the object-store backend. The
//! filesystem and memory backends complete each call without suspending,
//! so a gathered batch against them runs one call after another.

pub mod asynchronous;
pub mod blocking;

pub use asynchronous::{gather_settled, try_gather, AsyncExperiment, AsyncProject, AsyncRubicon};
pub use blocking::{Experiment, Project, Rubicon};
