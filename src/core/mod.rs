//! Core composition pipeline — factory, prototype, composite, builder, shared config.

pub mod builder;
pub mod composite;
pub mod config_store;
pub mod error;
pub mod factory;
pub mod hasher;
pub mod output;
pub mod parser;
pub mod prototype;
pub mod types;
