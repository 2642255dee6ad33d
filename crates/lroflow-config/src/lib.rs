pub mod error;
pub mod labels;
pub mod settings;

pub use error::*;
pub use labels::{SYSTEM_LABELS_ENV, parse_system_labels, system_labels};
pub use settings::{
    CONFIG_PATH_ENV, EndpointSettings, POLL_INTERVAL_ENV, PollSettings, Settings,
    find_settings_file,
};
