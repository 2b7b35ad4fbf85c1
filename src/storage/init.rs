//! Storage initialization
//!
//! Handles first-run setup and default data creation

use crate::config::paths::LedgerPaths;
use crate::error::GrantResult;
use crate::models::EmailTemplate;

use super::templates::TemplateRepository;

/// Initialize storage for a fresh installation
///
/// Creates the directory layout and a couple of starter email templates.
pub fn initialize_storage(paths: &LedgerPaths) -> GrantResult<()> {
    paths.ensure_directories()?;

    if !paths.templates_file().exists() {
        create_default_templates(paths)?;
    }

    Ok(())
}

/// Seed templates for the communications nonprofits send most often
fn create_default_templates(paths: &LedgerPaths) -> GrantResult<()> {
    let repo = TemplateRepository::new(paths.templates_file());
    repo.load()?;

    repo.put(EmailTemplate::new(
        "Funder status update",
        "{{grant_name}} - quarterly status",
        "Dear {{funder}},\n\n\
         Attached is our quarterly report for {{grant_name}}. To date we have \
         spent {{spent}} of the {{total_award}} award, with {{remaining}} remaining.\n\n\
         Sincerely,\n{{organization_name}}",
    ))?;

    repo.put(EmailTemplate::new(
        "Sub-recipient reminder",
        "Expenditure documentation needed for {{grant_name}}",
        "Hello {{sub_recipient}},\n\n\
         Please send receipts and justifications for expenditures posted against \
         {{grant_name}} before the reporting deadline.\n\n\
         Thank you,\n{{organization_name}}",
    ))?;

    Ok(())
}
