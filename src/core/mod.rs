// Pure console logic: validation, view building and workflow state
pub mod compare;
pub mod match_view;
pub mod removal;
pub mod schema_form;
pub mod stats;
pub mod submission;
pub mod validation;

pub use compare::{build_compare_view, compare_request, ComparePair, CompareRow, CompareView, Slot};
pub use match_view::{build_match_view, distinct_banks, MatchRow, MatchView, PARTIAL_ROLLOUT_WARNING};
pub use removal::{
    DeleteOutcome, RemovalBatch, RemovalError, RemovalPhase, RemovalStatus, RemovalSummary,
    RemovalTarget,
};
pub use schema_form::{
    assemble_object, build_form, parse_leading_int, parse_set_of_number, ExchangeForm, FieldKind,
    FormField, SchemaField, Widget,
};
pub use stats::{shorten_number, stat_title, DashboardView, StatCardView, TimeSpan};
pub use submission::{ContentSubmission, QuerySubmission, UploadedFile};
pub use validation::{check_bank_name, is_hex_hash, validate_bank_name, ValidationError};
