pub mod duration;
pub mod parallel;
