//! Reporting
//!
//! Derived views over the store, formatted for the terminal or exported as
//! CSV. Reports hold plain data rows so the desktop shell can render them
//! its own way.

pub mod grant_summary;

pub use grant_summary::{
    CategoryReportRow, DeliverableReportRow, GrantSummaryReport, SubRecipientReportRow,
};
