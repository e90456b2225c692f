//! Command-line front end for `fcs-io`.

pub mod cli;
pub mod commands;
pub mod describe;
pub mod error;
pub mod io;
pub mod logging;
pub mod tsv;
