//! # almersal-shared
//!
//! Domain logic of the Al Mersal remittance ledger that does not touch
//! storage or HTTP: fee computation, internal-id sequencing, QR payloads,
//! receipts and the English/Arabic message catalogue.

pub mod constants;
pub mod error;
pub mod fees;
pub mod i18n;
pub mod models;
pub mod qr;
pub mod receipt;
pub mod sequence;
pub mod types;
pub mod validation;

pub use error::{AlmersalError, QrError, ValidationError};
pub use fees::{compute_fee, FeeBreakdown};
pub use i18n::{Locale, Messages};
pub use models::{DashboardSummary, NewRemittance, Remittance, Settings};
pub use types::{authorize, Action, Channel, Provider, Role};
