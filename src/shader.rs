pub mod arguments;
pub mod backend;
pub mod builtin;
pub mod cache;
pub mod program;
pub mod scaler;
