//! Load generator configuration.
//!
//! Read from `eventq-loadgen.yaml` in the working directory. The `queue`
//! section is passed straight to [`EventQueue::with_config`].
//!
//! [`EventQueue::with_config`]: eventq_queue::EventQueue::with_config

use std::path::Path;

use serde::Deserialize;

use eventq_queue::{ConfigError, QueueConfig};

use crate::error::LoadgenError;

/// Workload shape for one load generator run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoadgenConfig {
    /// Number of producer threads. Each owns one emitter.
    #[serde(default = "default_producers")]
    pub producers: usize,

    /// Number of consumer threads polling the queue.
    #[serde(default = "default_consumers")]
    pub consumers: usize,

    /// Events pushed by each producer.
    #[serde(default = "default_events_per_producer")]
    pub events_per_producer: usize,

    /// Names of the resources events refer to.
    #[serde(default = "default_resources")]
    pub resources: Vec<String>,

    /// Queue construction parameters.
    #[serde(default)]
    pub queue: QueueConfig,
}

impl LoadgenConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Reject workloads that cannot make progress.
    ///
    /// # Errors
    ///
    /// Returns [`LoadgenError::InvalidConfig`] describing the first problem.
    pub fn validate(&self) -> Result<(), LoadgenError> {
        if self.producers == 0 {
            return Err(LoadgenError::InvalidConfig("producers must be at least 1"));
        }
        if self.consumers == 0 {
            return Err(LoadgenError::InvalidConfig("consumers must be at least 1"));
        }
        if self.resources.is_empty() {
            return Err(LoadgenError::InvalidConfig("at least one resource is required"));
        }
        Ok(())
    }
}

impl Default for LoadgenConfig {
    fn default() -> Self {
        Self {
            producers: default_producers(),
            consumers: default_consumers(),
            events_per_producer: default_events_per_producer(),
            resources: default_resources(),
            queue: QueueConfig::default(),
        }
    }
}

const fn default_producers() -> usize {
    4
}

const fn default_consumers() -> usize {
    2
}

const fn default_events_per_producer() -> usize {
    1000
}

fn default_resources() -> Vec<String> {
    vec!["water".to_owned(), "fuel".to_owned(), "ore".to_owned()]
}
