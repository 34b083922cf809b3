pub mod change;
pub mod post;
pub mod revision;
pub mod trigger;
