//! Pool configuration types

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for a resource pool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoolConfig {
    /// Maximum number of live resources (`None` = unbounded)
    pub limit: Option<usize>,
    /// Number of acquisitions allowed to scan or construct at once
    /// (`None` = `limit`, or 1 when unbounded)
    pub concurrency: Option<usize>,
    /// Upper bound for a whole `acquire`, waits included (`None` = wait forever)
    #[cfg_attr(feature = "serde", serde(with = "duration_ms"))]
    pub acquire_timeout: Option<Duration>,
}

impl PoolConfig {
    /// Configuration with a resource limit and default concurrency.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// The construction concurrency this configuration resolves to.
    #[must_use]
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.or(self.limit).unwrap_or(1)
    }

    /// Validate pool configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.limit == Some(0) {
            return Err(Error::configuration("limit must be greater than 0"));
        }
        if self.concurrency == Some(0) {
            return Err(Error::configuration("concurrency must be greater than 0"));
        }
        if self.acquire_timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(Error::configuration(
                "acquire_timeout must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
