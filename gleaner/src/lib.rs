pub mod commands;
pub mod handlers;

pub use handlers::{
    ScanSettings, default_dump_dir, expand_path, init_logging, load_registry, verbosity_level,
};
