pub mod catalog;
pub mod domain;
pub mod handoff;
pub mod leads;
pub mod offer;
pub mod personalization;

pub use catalog::{phase_label, Question, QuestionCatalog, QuestionKind, QuizOption, Visibility};
pub use domain::{Answer, CaptureError, QuestionId, QuizResponse, UserInfo};
pub use handoff::{
    resolve_results, HandoffError, HandoffStore, ResultsSource, ResultsView, SessionHandoff,
    SessionId, StoreError,
};
pub use personalization::{derive, Bundle, PersonalizationResult, PrimaryIssue, RuleId};
