//! `cfg`: the resolved configuration as JSON, each value with its source.
//!
//! ```json
//! {
//!   "players": { "value": 4, "source": "default" },
//!   "seed": { "value": 7, "source": "env" },
//!   ...
//! }
//! ```

use crate::config;
use crate::error::CliError;
use std::io::Write;

pub fn handle_cfg_command(out: &mut dyn Write) -> Result<(), CliError> {
    let config::ConfigResolved { config, sources } = config::load_with_sources()?;
    let values = serde_json::to_value(&config).map_err(std::io::Error::other)?;
    let mut display = serde_json::Map::new();
    if let serde_json::Value::Object(fields) = values {
        for (key, value) in fields {
            let source = sources.get(&key);
            display.insert(
                key,
                serde_json::json!({
                    "value": value,
                    "source": source,
                }),
            );
        }
    }
    let json_str = serde_json::to_string_pretty(&serde_json::Value::Object(display))
        .map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}
