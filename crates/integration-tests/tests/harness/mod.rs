#![allow(dead_code)]

pub mod config;
pub mod mock_assemblyai;
pub mod server;
