pub mod analysis;
pub mod consts;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod report;
pub mod repository;
pub mod stack;
pub mod synthetic;
