//! Built-in rule families.
//!
//! | Family | Rule ids |
//! |--------|----------|
//! | Presence | `PRESENCE.REQUIRED` |
//! | Format | `FORMAT.ISO8601_DATETIME`, `FORMAT.ISO8601_DURATION`, `FORMAT.TESTCD_NAME`, `FORMAT.NUMERIC`, `LIMIT.TEXT_LENGTH` |
//! | Consistency | `CONSISTENCY.DOMAIN_CODE`, `CONSISTENCY.SEQ_UNIQUE`, `CONSISTENCY.DATE_ORDER`, `CONSISTENCY.RANGE_ORDER`, `CONSISTENCY.STUDY_DAY_ZERO`, `CONSISTENCY.PAIRED_TEST` |
//! | Terminology | `TERMINOLOGY.CODELIST`, `TERMINOLOGY.PAIRED_DECODE` |
//! | Cross-reference | `XREF.SUBJECT_IN_DM`, `XREF.VISIT_IN_SV`, `XREF.ARM_IN_TA`, `XREF.RECORD_REFERENCE`, `XREF.DM_UNIQUE_SUBJECT` |

mod consistency;
mod cross_reference;
mod format;
mod presence;
mod terminology;

pub use consistency::{DateOrder, DomainCode, PairedTest, RangeOrder, SequenceUnique, StudyDayZero};
pub use cross_reference::{ArmInTa, DmUniqueSubject, RecordReference, SubjectInDm, VisitInSv};
pub use format::{DateTimeFormat, DurationFormat, NumericValues, TestCodeName, TextLength};
pub use presence::RequiredValues;
pub use terminology::{CodelistValues, PairedDecode};

use crate::engine::ValidationRule;

/// Every built-in rule, in reporting order.
pub fn default_rules() -> Vec<Box<dyn ValidationRule>> {
    vec![
        Box::new(RequiredValues),
        Box::new(DateTimeFormat),
        Box::new(DurationFormat),
        Box::new(TestCodeName),
        Box::new(NumericValues),
        Box::new(TextLength),
        Box::new(DomainCode),
        Box::new(SequenceUnique),
        Box::new(DateOrder),
        Box::new(RangeOrder),
        Box::new(StudyDayZero),
        Box::new(PairedTest),
        Box::new(CodelistValues),
        Box::new(PairedDecode),
        Box::new(SubjectInDm),
        Box::new(VisitInSv),
        Box::new(ArmInTa),
        Box::new(RecordReference),
        Box::new(DmUniqueSubject),
    ]
}
