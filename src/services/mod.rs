//! Business logic services
//!
//! Services borrow the storage layer and implement the operations the CLI
//! and desktop shell expose: grant-tree management, expenditure posting with
//! indirect-cost recovery, pure allocation math, snapshot merging, receipt
//! scanning, and host-platform integration.

pub mod allocation;
pub mod expenditure;
pub mod grant;
pub mod merge;
pub mod platform;
pub mod receipt;

pub use allocation::{
    category_stats, deliverable_stats, grant_stats, sub_recipient_stats, CategoryStats,
    DeliverableStats, GrantStats, SubRecipientStats,
};
pub use expenditure::{ExpenditureDraft, ExpenditureService, PostOptions, Posting};
pub use grant::GrantService;
pub use merge::{apply as apply_merge, merge, MergeCounts, MergeReport};
pub use platform::{NativePlatform, NoPlatform, Platform};
pub use receipt::{
    parse_receipt_reply, scan_receipt, LanguageModel, ReceiptFields, ReceiptParse,
};
