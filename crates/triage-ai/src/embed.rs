//! Embedding backends.
//!
//! [`HashEmbedder`] is the always-available default: a lexical bag-of-words
//! projection with no model files. The ONNX sentence-transformer backend sits
//! behind the `onnx` feature.

/// Turns texts into fixed-width vectors.
pub trait Embed {
    /// Embedding dimensionality.
    fn dim(&self) -> usize;

    /// Embed a batch of texts, one vector per input, in input order.
    fn embed_batch(&mut self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>>;

    fn model_name(&self) -> &str;
}

impl<T: Embed + ?Sized> Embed for Box<T> {
    fn dim(&self) -> usize {
        (**self).dim()
    }

    fn embed_batch(&mut self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        (**self).embed_batch(texts)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// FNV-1a offset basis (64-bit).
const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
/// FNV-1a prime (64-bit).
const FNV_PRIME: u64 = 0x0100_0000_01b3;
/// Tokens shorter than this are dropped.
const MIN_TOKEN_LEN: usize = 2;

pub const DEFAULT_HASH_DIM: usize = 384;

/// Deterministic hashed bag-of-words embedder.
///
/// Each lowercased token hashes to one dimension with a sign taken from the
/// hash's high bit; the result is L2-normalized. Captures lexical overlap only.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    /// A zero `dim` is bumped to 1.
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dim];
        for token in tokenize(text) {
            let hash = fnv1a_hash(token.as_bytes());
            let index = (hash % self.dim as u64) as usize;
            let sign = if hash >> 63 == 1 { 1.0 } else { -1.0 };
            v[index] += sign;
        }
        normalize(&mut v);
        v
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIM)
    }
}

impl Embed for HashEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch(&mut self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    fn model_name(&self) -> &str {
        "fnv1a-hash"
    }
}

fn fnv1a_hash(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .map(str::to_lowercase)
}

/// Dot product; equals cosine similarity for unit vectors.
pub fn cosine_sim(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// L2-normalize a vector in place. Zero vectors are left as they are.
pub fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
