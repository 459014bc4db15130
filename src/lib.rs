pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod model;
pub mod remote;
pub mod report;
pub mod repos;
pub mod util;
