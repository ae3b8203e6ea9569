pub mod block;
pub mod host;
pub mod parser;

pub use block::host_block_lines;
pub use host::Host;
pub use parser::{default_config_path, parse_hosts, ConfigError, ConfigStore};
