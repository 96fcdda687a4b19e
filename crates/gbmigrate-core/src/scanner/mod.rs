mod walk;

pub use walk::{collect_candidate_files, matches_extension};
