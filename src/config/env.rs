//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use crate::allocator::AllocationPolicy;

/// Environment variable prefix
const ENV_PREFIX: &str = "GATEWAY_CONFORMANCE";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// GatewayClasses from GATEWAY_CONFORMANCE_GATEWAY_CLASSES (comma separated)
    pub gateway_classes: Option<Vec<String>>,
    /// Policy from GATEWAY_CONFORMANCE_POLICY
    pub policy: Option<AllocationPolicy>,
    /// Workers from GATEWAY_CONFORMANCE_WORKERS
    pub workers: Option<usize>,
    /// Namespace from GATEWAY_CONFORMANCE_NAMESPACE
    pub namespace: Option<String>,
    /// Config file from GATEWAY_CONFORMANCE_CONFIG
    pub config_file: Option<PathBuf>,
}

impl EnvConfig {
    /// Load configuration from environment variables, rejecting values that do not parse
    pub fn load() -> Result<Self> {
        let policy = get_env("POLICY")
            .map(|v| {
                AllocationPolicy::from_str(&v).ok_or_else(|| {
                    anyhow::anyhow!("Invalid {ENV_PREFIX}_POLICY: {v:?} (expected single or pool)")
                })
            })
            .transpose()?;

        Ok(Self {
            gateway_classes: get_env("GATEWAY_CLASSES").map(|v| parse_list(&v)),
            policy,
            workers: get_env_parse("WORKERS")?,
            namespace: get_env("NAMESPACE"),
            config_file: get_env("CONFIG").map(PathBuf::from),
        })
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.gateway_classes.is_some()
            || self.policy.is_some()
            || self.workers.is_some()
            || self.namespace.is_some()
            || self.config_file.is_some()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_GATEWAY_CLASSES: {:?}", ENV_PREFIX, self.gateway_classes);
        println!("  {}_POLICY:          {:?}", ENV_PREFIX, self.policy);
        println!("  {}_WORKERS:         {:?}", ENV_PREFIX, self.workers);
        println!("  {}_NAMESPACE:       {:?}", ENV_PREFIX, self.namespace);
        println!("  {}_CONFIG:          {:?}", ENV_PREFIX, self.config_file);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}"))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Get environment variable and parse to type
fn get_env_parse<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    get_env(name)
        .map(|v| {
            v.trim()
                .parse()
                .with_context(|| format!("Invalid {ENV_PREFIX}_{name}: {v:?}"))
        })
        .transpose()
}

/// Split a comma separated list, dropping blanks
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Builder for setting environment variables (useful for testing)
#[cfg(test)]
pub struct EnvBuilder {
    vars: Vec<(String, String)>,
}

#[cfg(test)]
impl EnvBuilder {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    pub fn gateway_classes(mut self, classes: &[&str]) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_GATEWAY_CLASSES"), classes.join(",")));
        self
    }

    pub fn policy(mut self, policy: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_POLICY"), policy.into()));
        self
    }

    pub fn workers(mut self, workers: impl ToString) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_WORKERS"), workers.to_string()));
        self
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let previous: Vec<_> = self
            .vars
            .iter()
            .map(|(k, _)| (k.clone(), env::var(k).ok()))
            .collect();

        for (key, value) in self.vars {
            env::set_var(key, value);
        }

        EnvGuard { previous }
    }
}

/// Guard that restores environment variables on drop
#[cfg(test)]
pub struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

#[cfg(test)]
impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

/// Print all GATEWAY_CONFORMANCE environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_GATEWAY_CLASSES  Comma separated GatewayClasses to allocate from");
    println!("  {ENV_PREFIX}_POLICY           Allocation policy (single, pool)");
    println!("  {ENV_PREFIX}_WORKERS          Number of parallel workers");
    println!("  {ENV_PREFIX}_NAMESPACE        Namespace of the shared infrastructure");
    println!("  {ENV_PREFIX}_CONFIG           Path to configuration file");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_GATEWAY_CLASSES=eg-1,eg-2,eg-3");
    println!("  export {ENV_PREFIX}_POLICY=pool");
    println!("  gateway-conformance allocate --workers 3");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests below mutate the same process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(config.gateway_classes.is_none());
        assert!(config.policy.is_none());
        assert!(!config.has_any());
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("a, b,,c "), vec!["a", "b", "c"]);
        assert!(parse_list(" , ").is_empty());
    }

    #[test]
    fn test_env_builder() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let _guard = EnvBuilder::new()
            .gateway_classes(&["eg-1", "eg-2"])
            .policy("pool")
            .workers(2)
            .apply_scoped();

        let config = EnvConfig::load().unwrap();
        assert_eq!(
            config.gateway_classes,
            Some(vec!["eg-1".to_string(), "eg-2".to_string()])
        );
        assert_eq!(config.policy, Some(AllocationPolicy::Pool));
        assert_eq!(config.workers, Some(2));
        assert!(config.has_any());
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let _guard = EnvBuilder::new()
            .gateway_classes(&["a", "b"])
            .policy("bogus")
            .apply_scoped();

        let err = EnvConfig::load().unwrap_err();
        assert!(err.to_string().contains("GATEWAY_CONFORMANCE_POLICY"));
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn test_invalid_workers_is_rejected() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let _guard = EnvBuilder::new().workers("many").apply_scoped();

        let err = EnvConfig::load().unwrap_err();
        assert!(err.to_string().contains("GATEWAY_CONFORMANCE_WORKERS"));
    }
}
