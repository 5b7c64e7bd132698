//! Domain types for smsched
//!
//! - Recipient: one destination plus its message body
//! - SendOutcome: result of a single transport attempt
//! - RecipientOutcome: final result of a recipient's retry sequence
//! - RunSummary / RunReport: aggregate results of one run

pub mod outcome;
pub mod recipient;
pub mod summary;

pub use outcome::{RecipientOutcome, SendOutcome, Terminal};
pub use recipient::Recipient;
pub use summary::{RunReport, RunSummary};
