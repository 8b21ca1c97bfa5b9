pub mod commands;
pub mod handlers;

pub use commands::{CLAP_STYLING, command_argument_builder};
pub use handlers::{
    expand_path, format_progress_line, proxy_config_from_args, scan_settings_from_args,
};
