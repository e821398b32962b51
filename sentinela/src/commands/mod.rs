// sentinela/src/commands/mod.rs

pub mod init;
pub mod validate;
