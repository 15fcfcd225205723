//! ONNX Runtime sentence embeddings (all-MiniLM-L6-v2, mean-pooled).
//!
//! The model directory must contain `model.onnx` and `tokenizer.json`.

use std::path::Path;

use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::info;

use crate::embed::Embed;
use crate::pooling::{TokenBatch, mean_pool};

/// Token limit per document (MiniLM was trained at 256).
const MAX_TOKENS: usize = 256;

pub struct OnnxEmbedder {
    session: Session,
    tokenizer: Tokenizer,
    dim: usize,
}

impl OnnxEmbedder {
    /// Load an embedding model from a directory containing `model.onnx` and `tokenizer.json`.
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        anyhow::ensure!(model_path.exists(), "model.onnx not found in {model_dir:?}");
        anyhow::ensure!(
            tokenizer_path.exists(),
            "tokenizer.json not found in {model_dir:?}"
        );

        let session = Session::builder()?.commit_from_file(&model_path)?;
        let dim = infer_dim(session.outputs()[0].dtype()).unwrap_or(384);

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;
        // Pad every input in a batch to the longest one.
        tokenizer.with_padding(Some(tokenizers::PaddingParams::default()));

        info!(dim, model = %model_path.display(), "loaded embedding model");
        Ok(Self {
            session,
            tokenizer,
            dim,
        })
    }
}

impl Embed for OnnxEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn model_name(&self) -> &str {
        "all-MiniLM-L6-v2"
    }

    fn embed_batch(&mut self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;
        let seq_len = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0);
        let mut batch = TokenBatch::with_seq_len(seq_len);
        for encoding in &encodings {
            batch.push_row(
                encoding.get_ids(),
                encoding.get_attention_mask(),
                encoding.get_type_ids(),
            );
        }

        let shape = batch.shape();
        let ids = Tensor::from_array((shape, batch.input_ids.into_boxed_slice()))?;
        let mask = Tensor::from_array((shape, batch.attention_mask.clone().into_boxed_slice()))?;
        let types = Tensor::from_array((shape, batch.token_type_ids.into_boxed_slice()))?;
        let outputs = self.session.run(ort::inputs![
            "input_ids" => ids,
            "attention_mask" => mask,
            "token_type_ids" => types,
        ])?;

        // [rows, positions, dim]; positions may be fewer than seq_len.
        let (output_shape, hidden) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        anyhow::ensure!(
            dims.len() == 3 && dims[0] as usize == batch.rows && dims[2] as usize == self.dim,
            "unexpected output shape: {dims:?}, expected [{}, {seq_len}, {}]",
            batch.rows,
            self.dim
        );

        Ok(mean_pool(
            hidden,
            dims[1] as usize,
            self.dim,
            &batch.attention_mask,
            seq_len,
            batch.rows,
        ))
    }
}

/// Last dimension of the model's output tensor, when static.
fn infer_dim(output_type: &ort::value::ValueType) -> Option<usize> {
    match output_type {
        ort::value::ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}
