pub mod advisor;
pub mod catalogue;
pub mod config;
pub mod error;
pub mod lenders;
pub mod matching;
pub mod reference;
pub mod telemetry;
