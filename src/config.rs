use clap::Args;

use crate::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PORT};

/// Listener settings for `imgconv serve`.
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Port to listen on
    #[arg(long, env = "IMGCONV_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Largest accepted upload, in bytes
    #[arg(long, env = "IMGCONV_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}
