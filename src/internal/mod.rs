// Internal module for shared error types

pub mod error;
