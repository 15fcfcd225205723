//! Transformer input packing and output pooling, independent of any runtime.

use crate::embed::normalize;

/// Row-major `[rows, seq_len]` model inputs, zero-padded on the right.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct TokenBatch {
    pub rows: usize,
    pub seq_len: usize,
    pub input_ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
    pub token_type_ids: Vec<i64>,
}

impl TokenBatch {
    pub fn with_seq_len(seq_len: usize) -> Self {
        Self {
            seq_len,
            ..Self::default()
        }
    }

    /// Append one tokenized text. Values past `seq_len` are dropped.
    pub fn push_row(&mut self, ids: &[u32], mask: &[u32], type_ids: &[u32]) {
        let seq_len = self.seq_len;
        for (column, values) in [
            (&mut self.input_ids, ids),
            (&mut self.attention_mask, mask),
            (&mut self.token_type_ids, type_ids),
        ] {
            let end = column.len() + seq_len;
            column.extend(values.iter().take(seq_len).map(|&v| i64::from(v)));
            column.resize(end, 0);
        }
        self.rows += 1;
    }

    pub fn shape(&self) -> [i64; 2] {
        [self.rows as i64, self.seq_len as i64]
    }
}

/// Masked mean of each row's token vectors, L2-normalized.
///
/// `hidden` is `[rows, hidden_len, dim]` and `mask` is `[rows, mask_len]`.
/// A model may return fewer positions than it was given, so only the first
/// `min(hidden_len, mask_len)` tokens of a row are pooled. Rows with no
/// attended token come back as zero vectors.
pub(crate) fn mean_pool(
    hidden: &[f32],
    hidden_len: usize,
    dim: usize,
    mask: &[i64],
    mask_len: usize,
    rows: usize,
) -> Vec<Vec<f32>> {
    if hidden_len == 0 || mask_len == 0 || dim == 0 {
        return vec![vec![0.0; dim]; rows];
    }
    mask.chunks(mask_len)
        .zip(hidden.chunks(hidden_len * dim))
        .take(rows)
        .map(|(row_mask, row_hidden)| {
            let mut pooled = vec![0.0f32; dim];
            let mut weight = 0.0f32;
            for (&m, token) in row_mask.iter().zip(row_hidden.chunks(dim)) {
                if m <= 0 {
                    continue;
                }
                let m = m as f32;
                for (p, &x) in pooled.iter_mut().zip(token) {
                    *p += x * m;
                }
                weight += m;
            }
            if weight > 0.0 {
                pooled.iter_mut().for_each(|p| *p /= weight);
            }
            normalize(&mut pooled);
            pooled
        })
        .collect()
}
