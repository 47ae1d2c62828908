//! Pool configuration.

use std::time::Duration;

use crate::error::PoolError;

/// Configuration for a connection pool.
///
/// Built through [`PoolConfig::builder`], which validates the settings;
/// a `PoolConfig` cannot change once built.
///
/// # Example
///
/// ```rust,ignore
/// let config = PoolConfig::builder()
///     .min_pool_size(2)
///     .max_pool_size(8)
///     .validate_on_check_out(true)
///     .expiration_time(Duration::from_secs(300))
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    min_pool_size: usize,
    max_pool_size: usize,
    validate_on_check_in: bool,
    validate_on_check_out: bool,
    validate_periodically: bool,
    validate_period: Duration,
    prune_period: Duration,
    expiration_time: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_pool_size: 3,
            max_pool_size: 10,
            validate_on_check_in: false,
            validate_on_check_out: false,
            validate_periodically: false,
            validate_period: Duration::from_secs(30 * 60),
            prune_period: Duration::from_secs(5 * 60),
            expiration_time: Duration::from_secs(10 * 60),
        }
    }
}

impl PoolConfig {
    /// Create a builder starting from the default configuration.
    #[must_use]
    pub fn builder() -> PoolConfigBuilder {
        PoolConfigBuilder {
            config: Self::default(),
        }
    }

    /// Size the pool is filled to and pruned down to.
    #[must_use]
    pub fn min_pool_size(&self) -> usize {
        self.min_pool_size
    }

    /// Upper bound on pool size; soft-limit pools may exceed it.
    #[must_use]
    pub fn max_pool_size(&self) -> usize {
        self.max_pool_size
    }

    /// Whether connections are validated when checked in.
    #[must_use]
    pub fn validate_on_check_in(&self) -> bool {
        self.validate_on_check_in
    }

    /// Whether connections are validated when checked out.
    #[must_use]
    pub fn validate_on_check_out(&self) -> bool {
        self.validate_on_check_out
    }

    /// Whether idle connections are validated by the background task.
    #[must_use]
    pub fn validate_periodically(&self) -> bool {
        self.validate_periodically
    }

    /// Period of the background validate task.
    #[must_use]
    pub fn validate_period(&self) -> Duration {
        self.validate_period
    }

    /// Period of the background prune task.
    #[must_use]
    pub fn prune_period(&self) -> Duration {
        self.prune_period
    }

    /// Age after which an idle connection may be pruned.
    #[must_use]
    pub fn expiration_time(&self) -> Duration {
        self.expiration_time
    }

    fn validate(&self) -> Result<(), PoolError> {
        if self.max_pool_size == 0 {
            return Err(PoolError::Config(
                "max_pool_size must be greater than 0".into(),
            ));
        }

        if self.min_pool_size > self.max_pool_size {
            return Err(PoolError::Config(format!(
                "min_pool_size ({}) cannot exceed max_pool_size ({})",
                self.min_pool_size, self.max_pool_size
            )));
        }

        if self.validate_period.is_zero() {
            return Err(PoolError::Config("validate_period must be non-zero".into()));
        }

        if self.prune_period.is_zero() {
            return Err(PoolError::Config("prune_period must be non-zero".into()));
        }

        Ok(())
    }
}

/// Builder for [`PoolConfig`].
#[derive(Debug, Clone)]
pub struct PoolConfigBuilder {
    config: PoolConfig,
}

impl PoolConfigBuilder {
    /// Set the minimum pool size.
    #[must_use]
    pub fn min_pool_size(mut self, size: usize) -> Self {
        self.config.min_pool_size = size;
        self
    }

    /// Set the maximum pool size.
    #[must_use]
    pub fn max_pool_size(mut self, size: usize) -> Self {
        self.config.max_pool_size = size;
        self
    }

    /// Validate connections on check-in.
    #[must_use]
    pub fn validate_on_check_in(mut self, enabled: bool) -> Self {
        self.config.validate_on_check_in = enabled;
        self
    }

    /// Validate connections on check-out.
    #[must_use]
    pub fn validate_on_check_out(mut self, enabled: bool) -> Self {
        self.config.validate_on_check_out = enabled;
        self
    }

    /// Validate idle connections in the background.
    #[must_use]
    pub fn validate_periodically(mut self, enabled: bool) -> Self {
        self.config.validate_periodically = enabled;
        self
    }

    /// Set the background validate period.
    #[must_use]
    pub fn validate_period(mut self, period: Duration) -> Self {
        self.config.validate_period = period;
        self
    }

    /// Set the background prune period.
    #[must_use]
    pub fn prune_period(mut self, period: Duration) -> Self {
        self.config.prune_period = period;
        self
    }

    /// Set the idle connection expiration time.
    #[must_use]
    pub fn expiration_time(mut self, time: Duration) -> Self {
        self.config.expiration_time = time;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<PoolConfig, PoolError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.min_pool_size(), 3);
        assert_eq!(config.max_pool_size(), 10);
        assert!(!config.validate_on_check_in());
        assert!(!config.validate_on_check_out());
        assert!(!config.validate_periodically());
        assert_eq!(config.validate_period(), Duration::from_secs(1800));
        assert_eq!(config.prune_period(), Duration::from_secs(300));
        assert_eq!(config.expiration_time(), Duration::from_secs(600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_fluent() {
        let config = PoolConfig::builder()
            .min_pool_size(5)
            .max_pool_size(50)
            .validate_on_check_out(true)
            .expiration_time(Duration::ZERO)
            .build()
            .unwrap();

        assert_eq!(config.min_pool_size(), 5);
        assert_eq!(config.max_pool_size(), 50);
        assert!(config.validate_on_check_out());
        assert_eq!(config.expiration_time(), Duration::ZERO);
    }

    #[test]
    fn test_invalid_sizes_rejected() {
        assert!(PoolConfig::builder().max_pool_size(0).build().is_err());
        assert!(
            PoolConfig::builder()
                .min_pool_size(6)
                .max_pool_size(5)
                .build()
                .is_err()
        );
        assert!(
            PoolConfig::builder()
                .min_pool_size(0)
                .max_pool_size(1)
                .build()
                .is_ok()
        );
    }

    #[test]
    fn test_zero_periods_rejected() {
        assert!(
            PoolConfig::builder()
                .prune_period(Duration::ZERO)
                .build()
                .is_err()
        );
        assert!(
            PoolConfig::builder()
                .validate_period(Duration::ZERO)
                .build()
                .is_err()
        );
    }
}
