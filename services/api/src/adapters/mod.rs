pub mod gemini;
pub mod settings_store;

pub use gemini::GeminiAdapter;
pub use settings_store::{FileSettingsStore, MemorySettingsStore};
