pub mod models;
pub mod orchestrator;
pub mod validation;

pub use models::{LeadRecord, SubmissionResult};
pub use orchestrator::{FieldEdit, Feedback, FormEvent, Orchestrator, SubmitPhase};
