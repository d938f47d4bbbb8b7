//! # zing-invoice
//!
//! Monthly invoices for translators and reviewers of a translation
//! management system.
//!
//! An invoice sums a user's translated and reviewed words, hourly work and
//! manual corrections for one calendar month, prices them at the rates
//! recorded for that month and, when the payment is negative or below the
//! configured minimum, defers it to the next month through a pair of
//! correction entries.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use rust_decimal_macros::dec;
//! use zing_invoice::core::*;
//!
//! let ledger = InMemoryLedger::new();
//! let user = User::new("alice").with_rate(dec!(0.5));
//! let at = Utc.with_ymd_and_hms(2014, 4, 10, 0, 0, 0).unwrap();
//! for _ in 0..5 {
//!     ledger
//!         .add_score_log(ScoreLog::record(&user, TranslationActionCode::New, 5, at))
//!         .unwrap();
//! }
//!
//! let config = InvoiceConfig::new("Alice", "Acme Ltd", "IBAN 0000")
//!     .with_minimal_payment(dec!(20));
//! let mut invoice = Invoice::new(&ledger, user, config)
//!     .for_month(Month::new(2014, 4).unwrap())
//!     .with_correction(true);
//!
//! let amounts = invoice.generate().unwrap();
//! assert_eq!(amounts.total, dec!(0));
//! assert_eq!(amounts.balance, Some(dec!(12.5)));
//! assert!(invoice.is_carried_over().unwrap());
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Invoice computation, configuration checks, in-memory ledger |
//! | `json` | Loading invoice configuration from JSON |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
