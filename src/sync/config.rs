use crate::sync::ConfigError;

/// Controls when and by how much a growable queue enlarges its storage.
///
/// Before every insertion the queue computes its utilization
/// (`len / capacity`, using the values before the new item is added). When
/// the utilization is at or above the threshold, the capacity is multiplied
/// by the growth factor.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GrowthPolicy {
    threshold: f64,
    factor: f64,
}

impl GrowthPolicy {
    /// The default utilization at which a queue grows.
    pub const DEFAULT_THRESHOLD: f64 = 0.8;
    /// The default capacity multiplier.
    pub const DEFAULT_FACTOR: f64 = 1.5;

    /// Creates a policy that grows by `factor` once utilization reaches
    /// `threshold`.
    ///
    /// The threshold must lie strictly between 0 and 1 and the factor must be
    /// greater than 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use conveyor::sync::{ConfigError, GrowthPolicy};
    /// assert!(GrowthPolicy::new(0.5, 2.0).is_ok());
    /// assert_eq!(
    ///     Err(ConfigError::ThresholdOutOfRange(1.0)),
    ///     GrowthPolicy::new(1.0, 2.0)
    /// );
    /// ```
    pub fn new(threshold: f64, factor: f64) -> Result<Self, ConfigError> {
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(ConfigError::ThresholdOutOfRange(threshold));
        }
        if !(factor > 1.0) {
            return Err(ConfigError::FactorTooSmall(factor));
        }
        Ok(Self { threshold, factor })
    }

    /// Returns the utilization threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns the capacity multiplier.
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Returns true if a queue holding `len` items in `capacity` slots must
    /// grow before accepting another item.
    pub fn should_grow(&self, len: usize, capacity: usize) -> bool {
        len as f64 / capacity as f64 >= self.threshold
    }

    /// Returns the capacity to grow to from `capacity`.
    ///
    /// The product is truncated toward zero. The result is always larger
    /// than `capacity` unless `capacity` is already `usize::MAX`.
    ///
    /// # Examples
    ///
    /// ```
    /// use conveyor::sync::GrowthPolicy;
    /// let policy = GrowthPolicy::new(0.8, 1.5).unwrap();
    /// assert_eq!(7, policy.next_capacity(5));
    /// assert_eq!(2, policy.next_capacity(1));
    /// ```
    pub fn next_capacity(&self, capacity: usize) -> usize {
        // Float to int casts saturate, so huge products clamp to usize::MAX.
        let grown = (capacity as f64 * self.factor) as usize;
        grown.max(capacity.saturating_add(1))
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
            factor: Self::DEFAULT_FACTOR,
        }
    }
}

/// Construction parameters for a [`BlockingQueue`](crate::sync::BlockingQueue).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct QueueConfig {
    /// The initial number of slots.
    pub capacity: usize,
    /// The growth policy, or `None` for a fixed-capacity queue.
    pub growth: Option<GrowthPolicy>,
}

impl QueueConfig {
    /// The capacity used when none is given.
    pub const DEFAULT_CAPACITY: usize = 10;

    /// Sets the initial capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Makes the queue growable under `policy`.
    pub fn with_growth(mut self, policy: GrowthPolicy) -> Self {
        self.growth = Some(policy);
        self
    }

    /// Checks that the configuration describes a usable queue.
    ///
    /// A [`GrowthPolicy`] can only be built valid, so only the capacity is
    /// checked here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: Self::DEFAULT_CAPACITY,
            growth: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_bounds_are_exclusive() {
        assert!(matches!(
            GrowthPolicy::new(0.0, 2.0),
            Err(ConfigError::ThresholdOutOfRange(_))
        ));
        assert!(matches!(
            GrowthPolicy::new(1.0, 2.0),
            Err(ConfigError::ThresholdOutOfRange(_))
        ));
        assert!(matches!(
            GrowthPolicy::new(f64::NAN, 2.0),
            Err(ConfigError::ThresholdOutOfRange(_))
        ));
        assert!(GrowthPolicy::new(0.01, 2.0).is_ok());
        assert!(GrowthPolicy::new(0.99, 2.0).is_ok());
    }

    #[test]
    fn factor_must_increase_capacity() {
        assert_eq!(
            Err(ConfigError::FactorTooSmall(1.0)),
            GrowthPolicy::new(0.5, 1.0)
        );
        assert!(matches!(
            GrowthPolicy::new(0.5, f64::NAN),
            Err(ConfigError::FactorTooSmall(_))
        ));
        assert!(GrowthPolicy::new(0.5, 1.01).is_ok());
    }

    #[test]
    fn threshold_is_inclusive() {
        let policy = GrowthPolicy::new(0.5, 2.0).unwrap();
        assert!(!policy.should_grow(0, 2));
        assert!(policy.should_grow(1, 2));
        let policy = GrowthPolicy::default();
        assert!(!policy.should_grow(3, 5));
        assert!(policy.should_grow(4, 5));
    }

    #[test]
    fn growth_is_strict_even_when_truncation_stalls() {
        let policy = GrowthPolicy::new(0.5, 1.1).unwrap();
        // 3 * 1.1 truncates to 3.
        assert_eq!(4, policy.next_capacity(3));
        assert_eq!(22, policy.next_capacity(20));
        assert_eq!(usize::MAX, policy.next_capacity(usize::MAX));
    }

    #[test]
    fn default_config_is_bounded() {
        let config = QueueConfig::default();
        assert_eq!(10, config.capacity);
        assert_eq!(None, config.growth);
        assert_eq!(Ok(()), config.validate());
        assert_eq!(
            Err(ConfigError::ZeroCapacity),
            config.with_capacity(0).validate()
        );
    }
}
