pub mod configurator;
pub mod model;
pub mod pagination;
pub mod shared;
pub mod steps;
pub mod telemetry;
pub mod wizard;
