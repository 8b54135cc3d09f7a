pub mod cli;
pub mod config;
pub mod etapi;
pub mod mcp;
