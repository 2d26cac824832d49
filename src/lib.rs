pub mod baseline;
pub mod chart;
pub mod compare;
pub mod duration;
pub mod engine;
pub mod extract;
pub mod metrics;
pub mod tee;
