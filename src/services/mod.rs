pub mod chat;
pub mod poller;
pub mod push;
pub mod video;
