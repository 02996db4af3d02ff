//! Feature modules

pub mod unit_converter;
