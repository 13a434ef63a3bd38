use super::record::LenderRecord;
use super::schema::{resolve_field, LogicalField};
use serde::Serialize;

const DEFAULT_CONTACT_NAME: &str = "New Business Team";

/// Enquiry contact for a lender, preferring the central enquiry lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LenderContact {
    pub bdm_name: String,
    pub email: String,
    pub phone: String,
}

impl LenderContact {
    /// Extracts contact details. Returns `None` when neither an email nor a phone is known.
    pub fn from_record(record: &LenderRecord) -> Option<Self> {
        let text = |field: LogicalField| {
            resolve_field(record, field.token())
                .filter(|value| !value.is_blank())
                .map(|value| value.as_text().trim().to_string())
                .unwrap_or_default()
        };

        let mut email = text(LogicalField::EnquiryEmail);
        if email.is_empty() {
            email = text(LogicalField::BdmEmail);
        }

        let mut phone = text(LogicalField::EnquiryPhone);
        if phone.is_empty() {
            phone = text(LogicalField::BdmMobile);
        }

        let mut bdm_name = text(LogicalField::BdmName);
        if bdm_name.is_empty() {
            bdm_name = DEFAULT_CONTACT_NAME.to_string();
        }

        if email.is_empty() && phone.is_empty() {
            return None;
        }

        Some(Self {
            bdm_name,
            email,
            phone,
        })
    }
}

/// Lender notes, truncated for display.
pub fn notes_excerpt(record: &LenderRecord, max_chars: usize) -> Option<String> {
    let notes = [LogicalField::FreeTextNotes, LogicalField::LenderNotes]
        .into_iter()
        .filter_map(|field| resolve_field(record, field.token()))
        .find(|value| !value.is_blank())?;

    Some(notes.as_text().chars().take(max_chars).collect())
}
