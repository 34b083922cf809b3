pub mod check;
pub mod diff_runner;
pub mod parser;
pub mod reconcile;
pub mod report;
