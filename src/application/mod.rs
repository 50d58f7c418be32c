// Application layer - Use cases over the measurement table
pub mod aggregation_engine;
pub mod chart_binder;
pub mod chart_catalog;
pub mod dashboard_service;
pub mod measurement_repository;
pub mod session_service;
pub mod streaming_service;
