//! Configuration module
//!
//! Handles loading and merging configuration from files, environment
//! variables and command-line flags.

mod env;
mod file;

pub use env::{print_env_help, EnvConfig};
pub use file::ConfigFile;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::allocator::AllocationPolicy;
use crate::suite::INFRA_NAMESPACE;

/// GatewayClass used when nothing else is configured
pub const DEFAULT_GATEWAY_CLASS: &str = "gateway-conformance";

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// GatewayClasses available to the suite, in allocation order
    pub gateway_classes: Vec<String>,

    /// How GatewayClasses are shared between parallel tests
    pub policy: AllocationPolicy,

    /// Number of parallel workers, defaults to one per declared test
    pub workers: Option<usize>,

    /// Namespace holding the shared infrastructure
    pub namespace: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway_classes: vec![DEFAULT_GATEWAY_CLASS.to_string()],
            policy: AllocationPolicy::Single,
            workers: None,
            namespace: INFRA_NAMESPACE.to_string(),
        }
    }
}

impl AppConfig {
    /// Apply environment overrides
    pub fn with_env(mut self, env: &EnvConfig) -> Self {
        if let Some(classes) = &env.gateway_classes {
            self.gateway_classes = classes.clone();
        }
        if let Some(policy) = env.policy {
            self.policy = policy;
        }
        if let Some(workers) = env.workers {
            self.workers = Some(workers);
        }
        if let Some(namespace) = &env.namespace {
            self.namespace = namespace.clone();
        }
        self
    }

    /// Apply command-line overrides
    pub fn with_overrides(
        mut self,
        gateway_classes: &[String],
        policy: Option<AllocationPolicy>,
        workers: Option<usize>,
    ) -> Self {
        if !gateway_classes.is_empty() {
            self.gateway_classes = gateway_classes.to_vec();
        }
        if let Some(policy) = policy {
            self.policy = policy;
        }
        if let Some(workers) = workers {
            self.workers = Some(workers);
        }
        self
    }

    /// Check that the allocator can be built from this configuration
    pub fn validate(&self) -> Result<()> {
        if self.gateway_classes.is_empty() {
            anyhow::bail!("At least one GatewayClass must be configured");
        }
        if let Some(gc) = self.gateway_classes.iter().find(|gc| gc.trim().is_empty()) {
            anyhow::bail!("Invalid GatewayClass name: {:?}", gc);
        }
        if self.policy == AllocationPolicy::Single && self.gateway_classes.len() != 1 {
            anyhow::bail!(
                "Policy 'single' takes exactly one GatewayClass, got {}. Use policy 'pool' for several",
                self.gateway_classes.len()
            );
        }
        if self.workers == Some(0) {
            anyhow::bail!("Number of workers must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.gateway_classes, vec![DEFAULT_GATEWAY_CLASS]);
        assert_eq!(config.policy, AllocationPolicy::Single);
        assert_eq!(config.namespace, "gateway-conformance-infra");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let pool = AppConfig {
            gateway_classes: vec!["a".to_string(), "b".to_string()],
            policy: AllocationPolicy::Pool,
            ..Default::default()
        };
        assert!(pool.validate().is_ok());

        let single_with_two = AppConfig {
            policy: AllocationPolicy::Single,
            ..pool.clone()
        };
        assert!(single_with_two.validate().is_err());

        let empty = AppConfig {
            gateway_classes: Vec::new(),
            ..pool.clone()
        };
        assert!(empty.validate().is_err());

        let blank = AppConfig {
            gateway_classes: vec![" ".to_string()],
            ..pool.clone()
        };
        assert!(blank.validate().is_err());

        let no_workers = AppConfig {
            workers: Some(0),
            ..pool
        };
        assert!(no_workers.validate().is_err());
    }

    #[test]
    fn test_precedence() {
        let env = EnvConfig {
            gateway_classes: Some(vec!["env-a".to_string(), "env-b".to_string()]),
            policy: Some(AllocationPolicy::Pool),
            workers: Some(2),
            ..Default::default()
        };

        let config = AppConfig::default().with_env(&env);
        assert_eq!(config.gateway_classes, vec!["env-a", "env-b"]);
        assert_eq!(config.workers, Some(2));

        let config = config.with_overrides(&["cli".to_string()], Some(AllocationPolicy::Single), None);
        assert_eq!(config.gateway_classes, vec!["cli"]);
        assert_eq!(config.policy, AllocationPolicy::Single);
        assert_eq!(config.workers, Some(2));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("policy: pool\n").unwrap();
        assert_eq!(config.policy, AllocationPolicy::Pool);
        assert_eq!(config.gateway_classes, vec![DEFAULT_GATEWAY_CLASS]);
    }
}
