//! Collision-free employee number generation.
//!
//! Employee numbers are drawn uniformly from a configured digit range and
//! rendered zero-padded to a fixed width. The pool tracks every value issued
//! in the current run; the value space is finite, so draws are bounded both
//! by a pre-flight capacity check and by an explicit retry limit.

use std::collections::HashSet;

use rand::Rng;

use crate::error::{ConfigError, RosterError};

/// Default number of consecutive colliding draws tolerated per identifier.
pub const DEFAULT_IDENTIFIER_RETRY_LIMIT: usize = 1_000_000;

/// Largest supported number of significant digits (fits in `u64`).
const MAX_SIGNIFICANT_DIGITS: u32 = 18;

/// Digit bounds and output width for generated employee numbers.
///
/// # Example
///
/// ```
/// use synthetic_roster::IdentifierBounds;
///
/// let bounds = IdentifierBounds::new(6, 8, 10).expect("valid bounds");
/// assert_eq!(bounds.lower(), 100_000);
/// assert_eq!(bounds.upper(), 99_999_999);
/// assert_eq!(bounds.format(123_456), "0000123456");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierBounds {
    min_significant_digits: u32,
    max_significant_digits: u32,
    total_width: usize,
    lower: u64,
    upper: u64,
}

impl IdentifierBounds {
    /// Validates and creates identifier bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidIdentifierBounds`] unless
    /// `1 <= min <= max <= width` and `max <= 18`.
    pub fn new(
        min_significant_digits: u32,
        max_significant_digits: u32,
        total_width: usize,
    ) -> Result<Self, ConfigError> {
        let invalid = |reason| ConfigError::InvalidIdentifierBounds {
            min: min_significant_digits,
            max: max_significant_digits,
            width: total_width,
            reason,
        };

        if min_significant_digits == 0 {
            return Err(invalid("minimum digits must be at least 1"));
        }
        if min_significant_digits > max_significant_digits {
            return Err(invalid("minimum digits exceed maximum digits"));
        }
        if max_significant_digits > MAX_SIGNIFICANT_DIGITS {
            return Err(invalid("maximum digits exceed 18"));
        }
        let max_digits = usize::try_from(max_significant_digits)
            .map_err(|_| invalid("maximum digits exceed 18"))?;
        if max_digits > total_width {
            return Err(invalid("maximum digits exceed output width"));
        }

        Ok(Self {
            min_significant_digits,
            max_significant_digits,
            total_width,
            lower: 10_u64.pow(min_significant_digits - 1),
            upper: 10_u64.pow(max_significant_digits) - 1,
        })
    }

    /// Returns the minimum number of significant digits.
    #[must_use]
    pub const fn min_significant_digits(&self) -> u32 {
        self.min_significant_digits
    }

    /// Returns the maximum number of significant digits.
    #[must_use]
    pub const fn max_significant_digits(&self) -> u32 {
        self.max_significant_digits
    }

    /// Returns the zero-padded output width.
    #[must_use]
    pub const fn total_width(&self) -> usize {
        self.total_width
    }

    /// Smallest value that can be drawn.
    #[must_use]
    pub const fn lower(&self) -> u64 {
        self.lower
    }

    /// Largest value that can be drawn.
    #[must_use]
    pub const fn upper(&self) -> u64 {
        self.upper
    }

    /// Number of distinct values in the range.
    #[must_use]
    pub const fn capacity(&self) -> u64 {
        self.upper - self.lower + 1
    }

    /// Returns `true` if `value` lies inside the drawable range.
    #[must_use]
    pub const fn contains(&self, value: u64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Renders a value zero-padded to the output width.
    #[must_use]
    pub fn format(&self, value: u64) -> String {
        format!("{value:0width$}", width = self.total_width)
    }
}

/// Per-run pool of issued employee numbers.
#[derive(Debug, Clone)]
pub struct IdentifierPool {
    bounds: IdentifierBounds,
    retry_limit: usize,
    issued: HashSet<u64>,
}

impl IdentifierPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new(bounds: IdentifierBounds, retry_limit: usize) -> Self {
        Self {
            bounds,
            retry_limit,
            issued: HashSet::new(),
        }
    }

    /// Returns the pool's bounds.
    #[must_use]
    pub const fn bounds(&self) -> &IdentifierBounds {
        &self.bounds
    }

    /// Number of values issued or reserved so far.
    #[must_use]
    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }

    /// Number of values that can still be issued.
    #[must_use]
    pub fn available(&self) -> u64 {
        let issued = u64::try_from(self.issued.len()).unwrap_or(u64::MAX);
        self.bounds.capacity().saturating_sub(issued)
    }

    /// Marks a literal employee number as taken so it is never generated.
    ///
    /// Only exact renderings of in-range values (digits, output width) can
    /// collide with generated numbers; anything else is ignored. Returns
    /// `true` if the value was newly reserved.
    pub fn reserve(&mut self, literal: &str) -> bool {
        if literal.len() != self.bounds.total_width()
            || !literal.bytes().all(|b| b.is_ascii_digit())
        {
            return false;
        }
        match literal.parse::<u64>() {
            Ok(value) if self.bounds.contains(value) => self.issued.insert(value),
            _ => false,
        }
    }

    /// Verifies that `requested` more values can be issued.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::IdentifierSpaceExhausted`] if the remaining
    /// space is smaller than the request.
    pub fn ensure_capacity(&self, requested: u64) -> Result<(), RosterError> {
        let available = self.available();
        if requested > available {
            return Err(RosterError::IdentifierSpaceExhausted {
                requested,
                available,
            });
        }
        Ok(())
    }

    /// Draws a fresh employee number.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::IdentifierSpaceExhausted`] when every value in
    /// the range has been issued, or
    /// [`RosterError::IdentifierRetryLimitReached`] when `retry_limit`
    /// consecutive draws all collide.
    pub fn next<R: Rng>(&mut self, rng: &mut R) -> Result<String, RosterError> {
        self.ensure_capacity(1)?;

        for _ in 0..self.retry_limit {
            let value = rng.random_range(self.bounds.lower()..=self.bounds.upper());
            if self.issued.insert(value) {
                return Ok(self.bounds.format(value));
            }
        }

        Err(RosterError::IdentifierRetryLimitReached {
            attempts: self.retry_limit,
            issued: self.issued.len(),
        })
    }
}
