#![forbid(unsafe_code)]

pub mod api;
pub mod http;
pub mod memory;

pub use api::{
    ApiError, ChatMessage, ChatRole, EnrollmentApi, ProgressAck, ProgressUpdate, RoleplayApi,
    RoleplayFeedback,
};
pub use http::{BackendConfig, HttpBackend};
pub use memory::InMemoryBackend;
