//! # Cardio Core
//!
//! Core business logic for the cardiovascular risk assessment service.
//!
//! This crate contains the assessment pipeline and record management:
//! - Health data validation and prompt construction
//! - The inference gateway client and model reply parsing
//! - Risk banding and doctor-facing analytics
//! - Health record, prediction and appointment storage (in memory or sharded JSON files)
//!
//! **No API concerns**: HTTP servers, request extraction and status codes belong in `api-rest`.
//! Wire types shared with clients live in `api-shared`.

pub mod analytics;
pub mod config;
pub mod constants;
pub mod error;
pub mod identity;
pub mod inference;
pub mod parser;
pub mod prompt;
pub mod risk;
pub mod service;
pub mod store;
pub mod validation;

pub use config::{CoreConfig, GatewayConfig};
pub use error::{AssessmentError, AssessmentResult};
pub use identity::{IdentityProvider, ProfileRegistry};
pub use inference::{GatewayClient, InferenceClient};
pub use parser::{parse_assessment, Assessment, FallbackReason, ParseOutcome};
pub use service::{AssessmentOutcome, AssessmentService};
pub use store::{AssessmentStore, FileStore, MemoryStore};
