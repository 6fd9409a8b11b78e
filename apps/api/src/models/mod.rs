pub mod cv;
pub mod report;
pub mod session;
