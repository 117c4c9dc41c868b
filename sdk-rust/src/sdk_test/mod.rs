//! Test doubles for code built on [`crate::LanguageModel`].

mod model;

pub use model::{MockGenerateResult, MockLanguageModel};
