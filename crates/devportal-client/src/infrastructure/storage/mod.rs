//! Storage infrastructure: the tool's configuration file.
//!
//! The `config` sub-module reads the TOML file from the platform config
//! directory and fills in defaults for anything the file leaves out.  The
//! tool never writes the file; users edit it by hand.

pub mod config;
