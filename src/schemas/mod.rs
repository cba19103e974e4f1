pub mod assistant;
pub mod common;
pub mod conversation;
pub mod goal;
pub mod inquiry;
pub mod notification;
pub mod schedule;
pub mod user;

pub use common::*;
