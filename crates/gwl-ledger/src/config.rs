use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Root namespace of every ledger key in the metadata store.
    pub root_prefix: String,
    /// Sub-namespace holding bucket records.
    pub bucket_prefix: String,
    /// Sub-namespace holding multipart upload records.
    pub multipart_prefix: String,
    /// Deadline for each content backend call. `0` disables it.
    pub backend_timeout_ms: u64,
    /// Write the bucket record back after `remove_object`.
    pub persist_removals: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            root_prefix: "ledgerRoot".into(),
            bucket_prefix: "b".into(),
            multipart_prefix: "p".into(),
            backend_timeout_ms: 30_000,
            persist_removals: true,
        }
    }
}

impl LedgerConfig {
    /// Parse a configuration from TOML. Missing fields take their defaults.
    pub fn from_toml_str(s: &str) -> LedgerResult<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| LedgerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LedgerResult<()> {
        for (field, value) in [
            ("root_prefix", &self.root_prefix),
            ("bucket_prefix", &self.bucket_prefix),
            ("multipart_prefix", &self.multipart_prefix),
        ] {
            if value.trim_matches('/').is_empty() {
                return Err(LedgerError::InvalidConfig(format!("{field} must not be empty")));
            }
        }
        if self.bucket_prefix.trim_matches('/') == self.multipart_prefix.trim_matches('/') {
            return Err(LedgerError::InvalidConfig(
                "bucket_prefix and multipart_prefix must differ".into(),
            ));
        }
        Ok(())
    }

    pub fn backend_timeout(&self) -> Option<Duration> {
        (self.backend_timeout_ms > 0).then(|| Duration::from_millis(self.backend_timeout_ms))
    }
}
