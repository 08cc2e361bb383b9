pub mod domain;
pub mod interpret;
pub mod ports;
pub mod prompts;
pub mod reasoning;
pub mod settings;
pub mod transport;
pub mod tutor;
pub mod youtube;

pub use domain::{
    AnalysisResult, Blueprint, ChatMessage, Concept, CredentialSource, DiagramResult,
    ModelOption, ReasoningEntry, ReasoningKind, Role, SettingsSnapshot, VideoReference,
};
pub use ports::{
    GenerativeModelService, PortError, PortResult, SettingsStore, CREDENTIAL_MISSING_MESSAGE,
};
pub use settings::{ConfigResolver, AVAILABLE_MODELS, DEFAULT_MODEL};
pub use tutor::{SessionEvent, SessionState, TutorSession};
