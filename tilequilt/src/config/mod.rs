//! Configuration file support for tilequilt.
//!
//! The library itself is driven by [`QuiltConfig`](crate::quilt::QuiltConfig);
//! this module loads the optional `config.ini` that front ends use to fill it.
//!
//! # Example
//!
//! ```no_run
//! use tilequilt::config::{config_file_path, ConfigFile};
//!
//! let file = ConfigFile::load_from(&config_file_path())?;
//! let quilt = file.to_quilt_config();
//! assert_eq!(quilt.archives, file.quilt.panels);
//! # Ok::<(), tilequilt::config::ConfigFileError>(())
//! ```

mod defaults;
mod file;
mod parser;
mod settings;

pub use defaults::{default_panels, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_PANELS};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{ConfigFile, LoggingSettings, QuiltSettings};
