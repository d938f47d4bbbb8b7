//! Core invoice types, configuration, ledger access and computation.
//!
//! An [`Invoice`] prices one user's work for one calendar month. Work comes
//! from two record kinds kept in a [`Ledger`]: score logs written by the
//! scoring subsystem and manually entered paid tasks.

mod config;
mod error;
mod invoice;
mod ledger;
mod memory;
mod month;
mod rates;
mod types;

pub use config::*;
pub use error::*;
pub use invoice::*;
pub use ledger::*;
pub use memory::*;
pub use month::*;
pub use rates::resolve_rates;
pub use types::*;
