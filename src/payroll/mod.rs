pub mod calculator;
pub mod workflow;
