//! Mail store implementations.
//!
//! This module defines the [`MailStore`] trait that all mail backends
//! implement, plus the Gmail REST implementation used in production.

mod gmail;
mod traits;

pub use gmail::{GmailCredentials, GmailStore};
pub use traits::{MailStore, Result, StoreError, ThreadQuery};
