pub mod audit;
pub mod clock;
pub mod codec;
pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod notifier;
pub mod params;
pub mod services;
pub mod state;
pub mod storage;
pub mod validation;
