pub mod builtin;
pub mod compiler;
pub mod console;
pub mod dictionary;
pub mod host;
pub mod inner;
pub mod persistence;
