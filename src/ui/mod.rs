//! Server-rendered HTML: the page shell and the fragments the wire
//! library swaps into it.
//!
//! Fragments are built with plain string rendering; every interpolated
//! value goes through [`html::escape`]. Panels carry the ids the swap
//! targets reference (`#members-block`, `#incidents-block`,
//! `#records-block`).

pub mod html;
pub mod fragments;
pub mod pages;
