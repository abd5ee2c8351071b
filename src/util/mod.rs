// Utility Module

pub mod file_ops;

pub use file_ops::{load_private_key, load_public_key, save_key, FileError, KeyEncoding};
