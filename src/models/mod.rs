// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AddContentResult, Bank, ComparisonDetail, ContentId, ContentType, CredentialStatus,
    DeleteContentResult, EnabledRatio, ExchangeSchema, FieldSet, FindContentQuery,
    FindContentResult, HashComparison, MatchEntry, MatchResult, SchemaFieldSpec, SignalMap,
    StatsCard, StatsResponse,
};
pub use requests::{
    AddHashRequest, AddUrlRequest, BankNameRequest, CreateExchangeRequest, DashboardQuery,
    FormInput, QueryHashRequest, QueryUrlRequest, RemoveContentRequest,
};
pub use responses::{
    AddContentView, BankNameCheck, BankSummary, ErrorResponse, ExchangeCreated, HealthResponse,
};
