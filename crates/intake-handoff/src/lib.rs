//! Intake handoff crate - the advisor handoff workflow.
//!
//! Given consent artifacts produced by the reasoning engine, the workflow
//! resolves the lead record in the CRM, updates its status, writes a
//! transcript record, and dispatches an outbound message. Each step has an
//! explicit failure policy: CRM connect, lead resolution, and transcript
//! creation are fatal to the workflow; status update and message dispatch
//! are tolerated and reported as warnings.

pub mod crm;
pub mod error;
pub mod messaging;
pub mod transcript;
pub mod types;
pub mod workflow;

pub use crm::{CrmClient, HttpCrmClient};
pub use error::HandoffError;
pub use messaging::{HttpMessageGateway, MessageGateway};
pub use types::{HandoffReport, HandoffRequest, LeadRecord, NewLead, StepOutcome};
pub use workflow::HandoffOrchestrator;
