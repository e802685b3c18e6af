use flacseek_stream::StreamBuilder;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub stream: StreamConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamConfig {
    /// Target number of points in a synthesized seek table (0 disables synthesis)
    #[serde(default = "default_seek_table_size")]
    pub seek_table_size: usize,

    /// Keep decoded metadata blocks instead of skipping them
    #[serde(default = "default_retain_metadata")]
    pub retain_metadata: bool,
}

impl StreamConfig {
    /// Session builder carrying these settings.
    pub fn builder(&self) -> StreamBuilder {
        StreamBuilder::new()
            .retain_metadata(self.retain_metadata)
            .seek_table_size(self.seek_table_size)
    }
}

fn default_seek_table_size() -> usize {
    flacseek_stream::seek::DEFAULT_TARGET_SIZE
}

fn default_retain_metadata() -> bool {
    true
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            seek_table_size: default_seek_table_size(),
            retain_metadata: default_retain_metadata(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default tracing filter, used when RUST_LOG is unset
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "flacseek=info,flacseek_stream=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}
