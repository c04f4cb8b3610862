pub mod config_loader;

pub use config_loader::{
    load_from_file, load_from_file_sync, LoadConfigError, RouterConfigLoader, RouterConfigLoaderSync,
};
