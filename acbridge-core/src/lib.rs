#[macro_use]
extern crate log;

pub mod ac;
pub mod actuator;
pub mod climate;
pub mod dispatch;
pub mod report;
pub mod store;
