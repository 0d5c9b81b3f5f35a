//! Grant tracking domain module.
//!
//! Records which delivered artifact corresponds to which (recipient, product)
//! grant so it can be retracted later. Pure in-memory bookkeeping.

pub mod grant;

pub use grant::{Grant, GrantIndex};
