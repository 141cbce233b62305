pub mod timeparse;

pub use timeparse::*;
