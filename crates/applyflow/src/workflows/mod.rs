pub mod catalog;
pub mod journey;
