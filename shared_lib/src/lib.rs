pub mod env_utils;
pub mod structs;
