//! Lender catalogue records and the field-level tools shared by every component.

pub mod contact;
pub mod record;
pub mod schema;
pub mod values;

pub use contact::LenderContact;
pub use record::{CellValue, LenderRecord, NAME_KEY};
pub use schema::{resolve_field, resolve_key, LogicalField};
