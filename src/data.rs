mod config_file;
mod filesystem_access;
mod labels;
mod time_calc;

pub use config_file::*;
pub use filesystem_access::FsAccess;
pub use labels::{load_labels, parse_names_metadata};
pub use time_calc::TimeCalc;
