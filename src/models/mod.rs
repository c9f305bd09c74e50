pub mod chat;
pub mod generation;
pub mod push;
