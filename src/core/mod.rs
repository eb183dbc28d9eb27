pub mod chat;
pub mod chat_client;
pub mod config;
pub mod conversation;
pub mod message;
pub mod storage;
pub mod store;
