//! Social Culture Core - Shared domain types.
//!
//! This crate provides the types used by the site and its tests:
//! - typed record ids for services and projects
//! - validated email addresses
//! - the `Service`, `Project` and `ContactMessage` records
//! - editor drafts and their validation
//! - contact ticket ids
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP
//! clients, no templates. Persistence lives in the external datastore and is
//! reached from the `site` crate.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
