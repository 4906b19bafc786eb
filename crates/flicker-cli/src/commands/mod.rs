pub mod analyze;
pub mod config;
pub mod datasets;
pub mod info;
pub mod run;
pub mod synth;
