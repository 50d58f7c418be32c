// Domain layer - Pure models with no I/O
pub mod aggregation;
pub mod chart;
pub mod classification;
pub mod dashboard;
pub mod measurement;
pub mod stream;
pub mod view;
