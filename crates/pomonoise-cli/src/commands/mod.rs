pub mod config;
pub mod log;
pub mod noise;
pub mod run;
