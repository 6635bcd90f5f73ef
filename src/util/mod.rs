// Utility Module
// File-level entry points used by the command-line front end

pub mod file_ops;

pub use file_ops::{decrypt_file, encrypt_file, generate_key_files, KeyFiles};
