pub mod commands;
pub mod config;
pub mod gemini;
pub mod http_server;
pub mod media;
pub mod persona;
pub mod random;
pub mod reference_info;
pub mod reply;
pub mod sentiment;
pub mod telegram;
