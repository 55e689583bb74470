pub mod toml_loader;

pub use toml_loader::{load_input_text, load_review_settings};
