use std::env;

use crate::config::parse_flag;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl OutputConfig {
    pub fn from_env() -> Self {
        let format = match env::var("ROLLUP_OUTPUT_FORMAT").ok().as_deref() {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Text,
        };
        let pretty = env::var("ROLLUP_OUTPUT_PRETTY").map(|v| parse_flag(&v)).unwrap_or(false);
        OutputConfig { format, pretty }
    }
}
