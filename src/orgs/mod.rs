//! Organisations, memberships, and invitations.
//!
//! # Data Flow
//! ```text
//! HTTP handlers (handlers.rs)
//!     → guards.rs (role/ownership checks, all-or-nothing)
//!     → store (mutation)
//!     → ui fragments (re-rendered members panel)
//! ```
//!
//! # Design Decisions
//! - Guards are pure functions over membership snapshots; handlers fetch
//!   the snapshot, run the guard, then apply the change
//! - Guard failures re-render the members panel with an inline error and
//!   status 200, so wire swaps still land

pub mod guards;
pub mod handlers;
pub mod model;

pub use guards::GuardError;
pub use model::{Membership, Org, OrgInvite, Role};
