//! Deterministic feature-hashing embedder for offline runs and tests.

use super::Embedder;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Offline embedder built from word and character-trigram hashes.
///
/// Vectors are content-dependent and unit-normalized, so texts sharing
/// vocabulary score high under cosine similarity. Not semantically aware.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn hash(bytes: &[u8], seed: u64) -> u64 {
        bytes
            .iter()
            .fold(seed, |acc, b| acc.wrapping_mul(0x100000001b3).wrapping_add(*b as u64))
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];
        let lower = text.to_lowercase();

        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            let word_dim =
                (Self::hash(word.as_bytes(), 0xcbf29ce484222325) as usize) % self.dimensions;
            embedding[word_dim] += *freq as f32;

            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                let dim = (Self::hash(trigram.as_bytes(), 37) as usize) % self.dimensions;
                embedding[dim] += (*freq as f32).sqrt() * 0.5;
            }
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
