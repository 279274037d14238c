pub mod calibration;
pub mod canonical;
pub mod config;
pub mod geometry;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod pose;
pub mod risk;
pub mod scene;
pub mod sequence;
