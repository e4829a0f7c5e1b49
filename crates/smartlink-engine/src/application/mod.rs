//! Application layer: the pacing loop, collaborator traits, and the wizard
//! orchestration. Depends only on traits — no sockets, no file system.

pub mod collaborators;
pub mod register;
pub mod wizard;
