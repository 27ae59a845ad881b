//! Bounded random sampling with index and key deduplication.
//!
//! The [`Sampler`] draws a fixed-size [`Sample`] from a corpus of
//! [`Record`]s by rejection sampling over the index space:
//!
//! 1. Draw a uniform index in `0..n` from the caller's [`IndexSource`].
//! 2. Reject it if the index was already accepted.
//! 3. Reject it if the record lacks the required field.
//! 4. With deduplication enabled, reject it if the record's key was already accepted.
//! 5. Otherwise append the record.
//!
//! The loop is bounded in two ways. Before drawing, the eligible pool
//! (distinct keys, when deduplicating) is counted and a pool smaller than the
//! target fails with [`SampleError::InsufficientPool`]. While drawing, at most
//! [`SampleSpec::max_attempts`] indices are consumed before failing with
//! [`SampleError::AttemptsExhausted`].
//!
//! # Determinism
//!
//! Every accept/reject decision depends only on prior selections and the
//! drawn index, so the same corpus, spec, and seed always produce the same
//! sample in the same order:
//!
//! ```rust
//! use mtg_sampler_core::{seeded_rng, Record, SampleSpec, Sampler};
//!
//! let corpus: Vec<Record> = (0..20)
//!     .map(|i| Record::new().with("name", format!("card {i}")).with("multiverseid", i))
//!     .collect();
//! let sampler = Sampler::new(SampleSpec::new(5, "multiverseid").with_dedup("name"));
//!
//! let a = sampler.sample(&corpus, &mut seeded_rng(7)).unwrap();
//! let b = sampler.sample(&corpus, &mut seeded_rng(7)).unwrap();
//! assert_eq!(a.indices(), b.indices());
//! assert_eq!(a.len(), 5);
//! ```

use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::record::Record;

/// Default draw budget for one sampling run.
pub const DEFAULT_MAX_ATTEMPTS: u64 = 10_000_000;

/// Errors returned by [`Sampler::sample`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    #[error("eligible pool has {available} record(s) but {required} were requested")]
    InsufficientPool { required: usize, available: usize },
    #[error("gave up after {attempts} draws with {accepted} of {required} records selected")]
    AttemptsExhausted {
        attempts: u64,
        accepted: usize,
        required: usize,
    },
    #[error("invalid sample spec: {0}")]
    InvalidSpec(String),
}

/// A source of uniformly distributed indices.
///
/// Every [`rand::Rng`] is an `IndexSource`; tests can supply a scripted
/// sequence instead. Implementations must return a value in `0..len`.
pub trait IndexSource {
    fn next_index(&mut self, len: usize) -> usize;
}

impl<R: Rng + ?Sized> IndexSource for R {
    fn next_index(&mut self, len: usize) -> usize {
        // Draw in u64 so a seed picks the same indices on 32- and 64-bit targets.
        self.gen_range(0..len as u64) as usize
    }
}

/// The portable seeded generator used by the CLI.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// What to sample and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSpec {
    /// Target number of records.
    pub size: usize,
    /// A record is eligible only if this field is present and non-null.
    pub require_field: String,
    /// When set, no two sampled records share a value of this field.
    pub dedup_field: Option<String>,
    /// Maximum number of indices drawn before giving up.
    pub max_attempts: u64,
}

impl SampleSpec {
    pub fn new(size: usize, require_field: impl Into<String>) -> Self {
        Self {
            size,
            require_field: require_field.into(),
            dedup_field: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_dedup(mut self, field: impl Into<String>) -> Self {
        self.dedup_field = Some(field.into());
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    fn validate(&self) -> Result<(), SampleError> {
        if self.require_field.is_empty() {
            return Err(SampleError::InvalidSpec(
                "require_field must not be empty".to_string(),
            ));
        }
        if matches!(self.dedup_field.as_deref(), Some("")) {
            return Err(SampleError::InvalidSpec(
                "dedup_field must not be empty".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(SampleError::InvalidSpec(
                "max_attempts must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Counters for discarded draws during one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rejections {
    pub duplicate_index: u64,
    pub ineligible: u64,
    pub duplicate_key: u64,
}

impl Rejections {
    pub fn total(&self) -> u64 {
        self.duplicate_index + self.ineligible + self.duplicate_key
    }
}

/// The sampler's output: records in selection order plus their corpus indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    indices: Vec<usize>,
    records: Vec<Record>,
    attempts: u64,
    rejections: Rejections,
}

impl Sample {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Corpus index of each sampled record, in selection order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Number of indices drawn to build this sample.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn rejections(&self) -> Rejections {
        self.rejections
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Record)> {
        self.indices.iter().copied().zip(self.records.iter())
    }
}

/// Per-run bookkeeping, discarded once the sample is returned.
struct SelectionState {
    chosen_indices: HashSet<usize>,
    chosen_keys: HashSet<String>,
    sample: Sample,
}

impl SelectionState {
    fn with_capacity(size: usize) -> Self {
        Self {
            chosen_indices: HashSet::with_capacity(size),
            chosen_keys: HashSet::with_capacity(size),
            sample: Sample {
                indices: Vec::with_capacity(size),
                records: Vec::with_capacity(size),
                ..Sample::default()
            },
        }
    }

    fn accepted(&self) -> usize {
        self.sample.records.len()
    }

    fn accept(&mut self, index: usize, record: &Record, key: Option<String>) {
        self.chosen_indices.insert(index);
        if let Some(key) = key {
            self.chosen_keys.insert(key);
        }
        self.sample.indices.push(index);
        self.sample.records.push(record.clone());
    }
}

/// Draws bounded, deduplicated samples from a corpus.
#[derive(Debug, Clone)]
pub struct Sampler {
    spec: SampleSpec,
}

impl Sampler {
    pub fn new(spec: SampleSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &SampleSpec {
        &self.spec
    }

    /// Whether `record` can ever be selected under this spec.
    ///
    /// When deduplicating, a record without a key is ineligible: it cannot be
    /// shown to be distinct from the others.
    pub fn is_eligible(&self, record: &Record) -> bool {
        if !record.has_field(&self.spec.require_field) {
            return false;
        }
        match &self.spec.dedup_field {
            Some(field) => record.key_of(field).is_some(),
            None => true,
        }
    }

    /// Size of the largest sample this corpus can satisfy.
    ///
    /// Counts eligible records, or distinct keys among them when deduplicating.
    pub fn pool_size(&self, corpus: &[Record]) -> usize {
        match &self.spec.dedup_field {
            Some(field) => corpus
                .iter()
                .filter(|r| r.has_field(&self.spec.require_field))
                .filter_map(|r| r.key_of(field))
                .collect::<HashSet<_>>()
                .len(),
            None => corpus.iter().filter(|r| self.is_eligible(r)).count(),
        }
    }

    /// Draw a sample of exactly `spec.size` records.
    ///
    /// The corpus is never modified. `source` is only consulted when the
    /// target size is non-zero and the pool is large enough.
    pub fn sample<S>(&self, corpus: &[Record], source: &mut S) -> Result<Sample, SampleError>
    where
        S: IndexSource + ?Sized,
    {
        self.spec.validate()?;

        let required = self.spec.size;
        if required == 0 {
            return Ok(Sample::default());
        }

        let available = self.pool_size(corpus);
        if available < required {
            return Err(SampleError::InsufficientPool {
                required,
                available,
            });
        }

        let n = corpus.len();
        let mut state = SelectionState::with_capacity(required);
        let mut attempts: u64 = 0;
        let mut rejections = Rejections::default();

        while state.accepted() < required {
            if attempts >= self.spec.max_attempts {
                return Err(SampleError::AttemptsExhausted {
                    attempts,
                    accepted: state.accepted(),
                    required,
                });
            }
            attempts += 1;

            let index = source.next_index(n);
            if state.chosen_indices.contains(&index) {
                rejections.duplicate_index += 1;
                continue;
            }

            let record = match corpus.get(index) {
                Some(r) if r.has_field(&self.spec.require_field) => r,
                _ => {
                    rejections.ineligible += 1;
                    continue;
                }
            };

            let key = match &self.spec.dedup_field {
                Some(field) => match record.key_of(field) {
                    Some(key) if state.chosen_keys.contains(&key) => {
                        rejections.duplicate_key += 1;
                        continue;
                    }
                    Some(key) => Some(key),
                    None => {
                        rejections.ineligible += 1;
                        continue;
                    }
                },
                None => None,
            };

            state.accept(index, record, key);
        }

        let mut sample = state.sample;
        sample.attempts = attempts;
        sample.rejections = rejections;
        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a fixed index sequence, cycling when it runs out.
    struct ScriptedDraws {
        draws: Vec<usize>,
        pos: usize,
        calls: usize,
    }

    impl ScriptedDraws {
        fn new(draws: Vec<usize>) -> Self {
            Self {
                draws,
                pos: 0,
                calls: 0,
            }
        }
    }

    impl IndexSource for ScriptedDraws {
        fn next_index(&mut self, _len: usize) -> usize {
            let index = self.draws[self.pos % self.draws.len()];
            self.pos += 1;
            self.calls += 1;
            index
        }
    }

    fn card(name: &str, multiverseid: Option<u64>) -> Record {
        let r = Record::new().with("name", name);
        match multiverseid {
            Some(id) => r.with("multiverseid", id),
            None => r,
        }
    }

    /// Indices {0,2,4} carry `multiverseid` with names A, B, A.
    fn five_card_corpus() -> Vec<Record> {
        vec![
            card("A", Some(100)),
            card("X", None),
            card("B", Some(102)),
            card("Y", None),
            card("A", Some(104)),
        ]
    }

    fn synthetic_corpus(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| {
                // Every third card lacks the identifier; names repeat every 7.
                let id = if i % 3 == 0 { None } else { Some(i as u64) };
                card(&format!("card-{}", i % 7), id)
            })
            .collect()
    }

    #[test]
    fn test_scripted_draws_with_name_dedup() {
        let corpus = five_card_corpus();
        let sampler = Sampler::new(SampleSpec::new(2, "multiverseid").with_dedup("name"));
        let mut draws = ScriptedDraws::new(vec![0, 2, 4, 0]);

        let sample = sampler.sample(&corpus, &mut draws).unwrap();
        assert_eq!(sample.indices(), &[0, 2]);
        assert_eq!(sample.records()[0], corpus[0]);
        assert_eq!(sample.records()[1], corpus[2]);
        assert_eq!(draws.calls, 2);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let corpus = five_card_corpus();
        let sampler = Sampler::new(SampleSpec::new(2, "multiverseid").with_dedup("name"));
        let mut draws = ScriptedDraws::new(vec![0, 4, 1, 0, 2]);

        let sample = sampler.sample(&corpus, &mut draws).unwrap();
        assert_eq!(sample.indices(), &[0, 2]);
        assert_eq!(
            sample.rejections(),
            Rejections {
                duplicate_index: 1,
                ineligible: 1,
                duplicate_key: 1,
            }
        );
        assert_eq!(sample.attempts(), 5);
    }

    #[test]
    fn test_insufficient_distinct_names() {
        let corpus = five_card_corpus();
        let sampler = Sampler::new(SampleSpec::new(3, "multiverseid").with_dedup("name"));
        let mut draws = ScriptedDraws::new(vec![0, 2, 4, 0]);

        let err = sampler.sample(&corpus, &mut draws).unwrap_err();
        assert_eq!(
            err,
            SampleError::InsufficientPool {
                required: 3,
                available: 2
            }
        );
        assert_eq!(draws.calls, 0, "feasibility is checked before drawing");
    }

    #[test]
    fn test_without_dedup_same_name_allowed() {
        let corpus = five_card_corpus();
        let sampler = Sampler::new(SampleSpec::new(3, "multiverseid"));
        assert_eq!(sampler.pool_size(&corpus), 3);

        let mut draws = ScriptedDraws::new(vec![4, 3, 0, 2]);
        let sample = sampler.sample(&corpus, &mut draws).unwrap();
        assert_eq!(sample.indices(), &[4, 0, 2]);
        assert_eq!(sample.records()[0].name(), sample.records()[1].name());
    }

    #[test]
    fn test_empty_corpus() {
        let sampler = Sampler::new(SampleSpec::new(1, "multiverseid"));
        let err = sampler.sample(&[], &mut seeded_rng(1)).unwrap_err();
        assert_eq!(
            err,
            SampleError::InsufficientPool {
                required: 1,
                available: 0
            }
        );
    }

    #[test]
    fn test_zero_size_draws_nothing() {
        let sampler = Sampler::new(SampleSpec::new(0, "multiverseid"));
        let mut draws = ScriptedDraws::new(vec![0]);
        let sample = sampler.sample(&five_card_corpus(), &mut draws).unwrap();
        assert!(sample.is_empty());
        assert_eq!(draws.calls, 0);
    }

    #[test]
    fn test_attempt_budget_exhausted() {
        let corpus = five_card_corpus();
        let sampler = Sampler::new(
            SampleSpec::new(2, "multiverseid")
                .with_dedup("name")
                .with_max_attempts(10),
        );
        let mut draws = ScriptedDraws::new(vec![0]);

        let err = sampler.sample(&corpus, &mut draws).unwrap_err();
        assert_eq!(
            err,
            SampleError::AttemptsExhausted {
                attempts: 10,
                accepted: 1,
                required: 2
            }
        );
        assert_eq!(draws.calls, 10);
    }

    #[test]
    fn test_invalid_spec() {
        let corpus = five_card_corpus();
        let mut rng = seeded_rng(1);

        let err = Sampler::new(SampleSpec::new(1, ""))
            .sample(&corpus, &mut rng)
            .unwrap_err();
        assert!(matches!(err, SampleError::InvalidSpec(_)));

        let err = Sampler::new(SampleSpec::new(1, "multiverseid").with_dedup(""))
            .sample(&corpus, &mut rng)
            .unwrap_err();
        assert!(matches!(err, SampleError::InvalidSpec(_)));

        let err = Sampler::new(SampleSpec::new(1, "multiverseid").with_max_attempts(0))
            .sample(&corpus, &mut rng)
            .unwrap_err();
        assert!(matches!(err, SampleError::InvalidSpec(_)));
    }

    #[test]
    fn test_keyless_record_ineligible_under_dedup() {
        let corpus = vec![
            Record::new().with("multiverseid", 1),
            card("A", Some(2)),
        ];
        let sampler = Sampler::new(SampleSpec::new(1, "multiverseid").with_dedup("name"));
        assert!(!sampler.is_eligible(&corpus[0]));
        assert_eq!(sampler.pool_size(&corpus), 1);

        let mut draws = ScriptedDraws::new(vec![0, 1]);
        let sample = sampler.sample(&corpus, &mut draws).unwrap();
        assert_eq!(sample.indices(), &[1]);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let corpus = synthetic_corpus(200);
        let sampler = Sampler::new(SampleSpec::new(7, "multiverseid").with_dedup("name"));

        let a = sampler.sample(&corpus, &mut seeded_rng(42)).unwrap();
        let b = sampler.sample(&corpus, &mut seeded_rng(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rng_draws_are_word_size_independent() {
        // Indices come from a u64 range, never from a usize one.
        let mut rng = seeded_rng(5);
        let mut reference = seeded_rng(5);
        for len in [1usize, 7, 1000, 62_295, 3] {
            assert_eq!(rng.next_index(len) as u64, reference.gen_range(0..len as u64));
        }
    }

    #[test]
    fn test_invariants_hold_across_seeds() {
        let corpus = synthetic_corpus(300);
        let sampler = Sampler::new(SampleSpec::new(7, "multiverseid").with_dedup("name"));
        let no_dedup = Sampler::new(SampleSpec::new(150, "multiverseid"));

        for seed in 0..50 {
            let sample = sampler.sample(&corpus, &mut seeded_rng(seed)).unwrap();
            assert_eq!(sample.len(), 7);

            let indices: HashSet<_> = sample.indices().iter().collect();
            assert_eq!(indices.len(), 7, "duplicate index for seed {}", seed);
            let names: HashSet<_> = sample.records().iter().map(|r| r.name()).collect();
            assert_eq!(names.len(), 7, "duplicate name for seed {}", seed);

            for (index, record) in sample.iter() {
                assert!(record.has_field("multiverseid"));
                assert_eq!(&corpus[index], record);
            }

            let big = no_dedup.sample(&corpus, &mut seeded_rng(seed)).unwrap();
            let indices: HashSet<_> = big.indices().iter().collect();
            assert_eq!(indices.len(), 150);
            assert!(big.records().iter().all(|r| r.has_field("multiverseid")));
        }
    }

    #[test]
    fn test_full_pool_is_reachable() {
        let corpus = synthetic_corpus(60);
        let sampler = Sampler::new(SampleSpec::new(40, "multiverseid"));
        assert_eq!(sampler.pool_size(&corpus), 40);

        let sample = sampler.sample(&corpus, &mut seeded_rng(3)).unwrap();
        let mut indices = sample.indices().to_vec();
        indices.sort_unstable();
        let expected: Vec<usize> = (0..60).filter(|i| i % 3 != 0).collect();
        assert_eq!(indices, expected);
    }

    #[test]
    fn test_corpus_untouched() {
        let corpus = synthetic_corpus(50);
        let before = corpus.clone();
        let sampler = Sampler::new(SampleSpec::new(5, "multiverseid").with_dedup("name"));
        sampler.sample(&corpus, &mut seeded_rng(9)).unwrap();
        assert_eq!(corpus, before);
    }
}
