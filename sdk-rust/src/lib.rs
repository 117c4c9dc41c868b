//! Provider-agnostic text generation.
//!
//! Each supported provider implements [`LanguageModel`] over its own wire
//! format. [`ProviderCredentials::select`] picks one provider from whatever
//! keys are configured and [`create_language_model`] builds it.

pub mod anthropic;
mod client_utils;
mod errors;
pub mod google;
mod language_model;
pub mod openai;
pub mod opentelemetry;
mod registry;
pub mod sdk_test;
mod types;
mod types_ext;

pub use errors::*;
pub use language_model::LanguageModel;
pub use registry::{create_language_model, ProviderConfig, ProviderCredentials, ProviderKind};
pub use types::*;
