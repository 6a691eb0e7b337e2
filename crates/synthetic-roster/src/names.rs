//! Collision-free full name generation.
//!
//! Names are composed as `"Surname FirstName Patronymic"` from
//! gender-specific corpora. The generator remembers every name issued in the
//! run and retries on collision up to a bound; past the bound it appends a
//! counter suffix, which always terminates but yields a name that is unique
//! only by suffix.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default number of attempts to find an unused name before suffixing.
pub const DEFAULT_NAME_RETRY_LIMIT: usize = 10_000;

/// Grammatical gender used to pick a name corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male corpus.
    Male,
    /// Female corpus.
    Female,
}

impl Gender {
    /// Lowercase label used in diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

/// Name parts available for one gender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameCorpus {
    first_names: Vec<String>,
    surnames: Vec<String>,
    patronymics: Vec<String>,
}

impl NameCorpus {
    /// Creates a corpus from its three part lists.
    #[must_use]
    pub const fn new(
        first_names: Vec<String>,
        surnames: Vec<String>,
        patronymics: Vec<String>,
    ) -> Self {
        Self {
            first_names,
            surnames,
            patronymics,
        }
    }

    /// Number of distinct full names the corpus can compose.
    #[must_use]
    pub fn combinations(&self) -> usize {
        self.surnames
            .len()
            .saturating_mul(self.first_names.len())
            .saturating_mul(self.patronymics.len())
    }

    fn validate(&self, gender: Gender) -> Result<(), ConfigError> {
        let parts = [
            ("first names", &self.first_names),
            ("surnames", &self.surnames),
            ("patronymics", &self.patronymics),
        ];
        for (part, entries) in parts {
            if entries.iter().all(|entry| entry.trim().is_empty()) {
                return Err(ConfigError::EmptyNameCorpus {
                    gender: gender.label(),
                    part,
                });
            }
        }
        Ok(())
    }

    fn compose<R: Rng>(&self, rng: &mut R) -> String {
        let surname = self.surnames.choose(rng).map_or("", String::as_str);
        let first_name = self.first_names.choose(rng).map_or("", String::as_str);
        let patronymic = self.patronymics.choose(rng).map_or("", String::as_str);
        format!("{surname} {first_name} {patronymic}")
    }
}

/// Male and female name corpora, validated to be non-empty.
///
/// # Example
///
/// ```
/// use synthetic_roster::{NameCorpora, NameCorpus};
///
/// let corpus = |first: &str, last: &str, middle: &str| {
///     NameCorpus::new(vec![first.to_owned()], vec![last.to_owned()], vec![middle.to_owned()])
/// };
/// let corpora = NameCorpora::new(
///     corpus("Ivan", "Petrov", "Ivanovich"),
///     corpus("Anna", "Petrova", "Ivanovna"),
/// )
/// .expect("valid corpora");
///
/// assert_eq!(corpora.male().combinations(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameCorpora {
    male: NameCorpus,
    female: NameCorpus,
}

impl NameCorpora {
    /// Validates and creates the corpora.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyNameCorpus`] if any part list of either
    /// gender has no usable entries.
    pub fn new(male: NameCorpus, female: NameCorpus) -> Result<Self, ConfigError> {
        male.validate(Gender::Male)?;
        female.validate(Gender::Female)?;
        Ok(Self { male, female })
    }

    /// Returns the male corpus.
    #[must_use]
    pub const fn male(&self) -> &NameCorpus {
        &self.male
    }

    /// Returns the female corpus.
    #[must_use]
    pub const fn female(&self) -> &NameCorpus {
        &self.female
    }

    /// Returns the corpus for `gender`.
    #[must_use]
    pub const fn for_gender(&self, gender: Gender) -> &NameCorpus {
        match gender {
            Gender::Male => &self.male,
            Gender::Female => &self.female,
        }
    }
}

/// A name issued by [`NameGenerator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedName {
    /// The issued full name.
    pub full_name: String,
    /// Set to the number of colliding attempts when the name needed a
    /// counter suffix to become unique.
    pub suffixed_after: Option<usize>,
}

/// Per-run generator of unique full names.
#[derive(Debug, Clone)]
pub struct NameGenerator<'a> {
    corpora: &'a NameCorpora,
    retry_limit: usize,
    issued: HashSet<String>,
}

impl<'a> NameGenerator<'a> {
    /// Creates a generator with no names issued.
    #[must_use]
    pub fn new(corpora: &'a NameCorpora, retry_limit: usize) -> Self {
        Self {
            corpora,
            retry_limit: retry_limit.max(1),
            issued: HashSet::new(),
        }
    }

    /// Number of names issued so far.
    #[must_use]
    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }

    /// Issues a name from the `gender` corpus that has not been issued yet.
    pub fn next<R: Rng>(&mut self, rng: &mut R, gender: Gender) -> GeneratedName {
        let corpus = self.corpora.for_gender(gender);
        let mut candidate = String::new();

        for _ in 0..self.retry_limit {
            candidate = corpus.compose(rng);
            if !self.issued.contains(&candidate) {
                self.issued.insert(candidate.clone());
                return GeneratedName {
                    full_name: candidate,
                    suffixed_after: None,
                };
            }
        }

        let mut counter = self.issued.len();
        loop {
            let suffixed = format!("{candidate} {counter}");
            if self.issued.insert(suffixed.clone()) {
                return GeneratedName {
                    full_name: suffixed,
                    suffixed_after: Some(self.retry_limit),
                };
            }
            counter += 1;
        }
    }
}
