pub mod canvas;
pub mod config;
pub mod errors;
pub mod intake;
pub mod sanitize;
pub mod storage;
pub mod validate;
