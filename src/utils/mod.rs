//! Cross-platform utilities for file operations and platform detection.

pub mod fs;
pub mod platform;

pub use fs::{
    atomic_write, copy_dir, ensure_dir, ensure_parent_dir, expand_target_path,
    normalize_path_for_storage, remove_dir_all,
};
pub use platform::{ensure_git_available, get_git_command, is_git_installed};
