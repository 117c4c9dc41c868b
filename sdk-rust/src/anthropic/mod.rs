mod api;
mod model;

pub use model::{AnthropicModel, AnthropicModelOptions, DEFAULT_ENDPOINT, DEFAULT_MODEL};
