pub mod analytics;
pub mod bond;
pub mod duration;
pub mod pricing;
pub mod schedule;
pub mod yields;
