//! Text embeddings and similarity scoring.
//!
//! [`LexicalEmbedder`] is a deterministic stand-in for a model endpoint: content
//! tokens are hashed into a fixed number of buckets and the vector is L2
//! normalized, so cosine similarity of two embeddings lands in `0.0..=1.0`.
//! [`CachedEmbedder`] memoizes any embedder by exact input text.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use sha2::{Digest, Sha256};

pub const DEFAULT_DIMENSIONS: usize = 512;

const STOP_WORDS: &[&str] = &[
    "a", "about", "am", "an", "and", "any", "are", "as", "at", "be", "by", "can", "do", "does",
    "for", "from", "have", "how", "i", "if", "in", "into", "is", "it", "its", "me", "my", "of",
    "on", "or", "our", "should", "so", "that", "the", "their", "there", "this", "to", "us", "we",
    "what", "when", "where", "which", "who", "why", "will", "with", "you", "your",
];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EmbeddingError {
    #[error("cannot embed empty text")]
    EmptyInput,
    #[error("embedding model unavailable: {0}")]
    Unavailable(String),
    #[error("embedding has {found} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },
}

/// Embedding function. Calls may block (a model round trip), so async callers
/// should run them on a blocking thread.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
    fn dimensions(&self) -> usize;
}

impl<E: Embedder + ?Sized> Embedder for Arc<E> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        (**self).embed(text)
    }

    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }
}

/// Feature-hashed bag of content words.
#[derive(Debug, Clone)]
pub struct LexicalEmbedder {
    dimensions: usize,
}

impl Default for LexicalEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

impl LexicalEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn bucket(&self, token: &str) -> usize {
        let digest = Sha256::digest(token.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        (u64::from_le_bytes(bytes) % self.dimensions as u64) as usize
    }
}

impl Embedder for LexicalEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let mut counts: BTreeMap<usize, f32> = BTreeMap::new();
        for token in content_tokens(text) {
            *counts.entry(self.bucket(&token)).or_insert(0.0) += 1.0;
        }

        let mut vector = vec![0.0; self.dimensions];
        for (bucket, count) in counts {
            vector[bucket] = count;
        }
        normalize(&mut vector);
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Lowercased alphanumeric tokens with stop words removed and a plural `s` trimmed.
pub fn content_tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
        .filter(|token| !STOP_WORDS.contains(&token.as_str()))
        .map(|token| {
            if token.len() > 3 && token.ends_with('s') && !token.ends_with("ss") {
                token[..token.len() - 1].to_string()
            } else {
                token
            }
        })
        .collect()
}

fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}

/// Cosine similarity clamped to `0.0..=1.0`; zero-length or zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0_f32, 0.0_f32, 0.0_f32);
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a <= f32::EPSILON || norm_b <= f32::EPSILON {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}

/// Memoizes embeddings keyed by exact text. Failures are never cached.
pub struct CachedEmbedder<E> {
    inner: E,
    capacity: usize,
    cache: RwLock<HashMap<String, Vec<f32>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<E: Embedder> CachedEmbedder<E> {
    pub fn new(inner: E, capacity: usize) -> Self {
        Self {
            inner,
            capacity,
            cache: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.cache.read().expect("embedding cache poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: Embedder> Embedder for CachedEmbedder<E> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if let Some(vector) = self
            .cache
            .read()
            .expect("embedding cache poisoned")
            .get(text)
        {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(vector.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let vector = self.inner.embed(text)?;
        if vector.len() != self.inner.dimensions() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.inner.dimensions(),
                found: vector.len(),
            });
        }

        if self.capacity > 0 {
            let mut cache = self.cache.write().expect("embedding cache poisoned");
            // Flushed wholesale once full.
            if cache.len() >= self.capacity {
                cache.clear();
            }
            cache.insert(text.to_string(), vector.clone());
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingEmbedder {
        calls: AtomicU64,
    }

    impl Embedder for CountingEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            LexicalEmbedder::new(16).embed(text)
        }

        fn dimensions(&self) -> usize {
            16
        }
    }

    #[test]
    fn identical_text_embeds_to_unit_similarity() {
        let embedder = LexicalEmbedder::default();
        let a = embedder.embed("How do I renew my DEA license?").expect("embeds");
        let b = embedder.embed("How do I renew my DEA license?").expect("embeds");
        assert_eq!(a, b);
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn stop_words_and_plurals_are_ignored() {
        assert_eq!(
            content_tokens("What are the DEA requirements?"),
            vec!["dea".to_string(), "requirement".to_string()]
        );
        assert_eq!(content_tokens("Is this a class?"), vec!["class".to_string()]);
    }

    #[test]
    fn empty_text_is_an_error() {
        assert_eq!(
            LexicalEmbedder::default().embed("   "),
            Err(EmbeddingError::EmptyInput)
        );
    }

    #[test]
    fn stop_word_only_text_scores_zero() {
        let embedder = LexicalEmbedder::default();
        let empty = embedder.embed("what is the").expect("embeds");
        let other = embedder.embed("DEA registration").expect("embeds");
        assert_eq!(cosine_similarity(&empty, &other), 0.0);
    }

    #[test]
    fn cache_memoizes_by_exact_text() {
        let cached = CachedEmbedder::new(
            CountingEmbedder {
                calls: AtomicU64::new(0),
            },
            8,
        );
        cached.embed("Schedule II ordering").expect("embeds");
        cached.embed("Schedule II ordering").expect("embeds");
        cached.embed("schedule ii ordering").expect("embeds");

        assert_eq!(cached.inner.calls.load(Ordering::Relaxed), 2);
        assert_eq!(cached.hits(), 1);
        assert_eq!(cached.misses(), 2);
        assert_eq!(cached.len(), 2);
    }

    #[test]
    fn cache_does_not_store_failures() {
        let cached = CachedEmbedder::new(LexicalEmbedder::default(), 8);
        assert!(cached.embed("").is_err());
        assert!(cached.is_empty());
    }
}
