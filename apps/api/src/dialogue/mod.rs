//! Guided career dialogues: stage table, sessions, prompt assembly, and the
//! controller that moves a session from one stage to the next.

pub mod assembler;
pub mod controller;
pub mod handlers;
pub mod message_log;
pub mod prompts;
pub mod session;
pub mod stages;

pub use controller::StageController;
pub use session::SessionStore;
