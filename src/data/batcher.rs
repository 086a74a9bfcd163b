// ============================================================
// Layer 4 — Seq2Seq Batcher
// ============================================================
// Turns a handful of Examples from ONE bucket into padded
// tensors the model can consume.
//
// For a bucket with limits (S, T) and batch size N:
//
//   encoder_inputs  [N, S]     source padded with PAD, then reversed
//   decoder_inputs  [N, T+1]   GO + target, padded with PAD
//   targets         [N, T+1]   decoder_inputs shifted left by one
//   target_weights  [N, T+1]   1.0 for real targets, 0.0 for padding
//
// Reversing the source puts its first words right next to the
// decoder, which shortens the path gradients have to travel.
// Every example in a bucket is padded to the same shape, so
// one bucket = one fixed tensor shape.
//
// Step 1 (PaddedBatch::from_examples) is plain Rust and unit
// tested; Step 2 (to_tensors) only stacks the flat buffers the
// same way the rest of the data layer does:
//   [s1_t1, s1_t2, ..., sN_tT] → reshape → [N, T]
//
// Reference: Sutskever et al. (2014), Burn Book §4 (Batcher)

use burn::prelude::*;

use crate::data::tokenizer::{GO_ID, PAD_ID};
use crate::domain::example::{BucketSpec, Example};

/// Host-side padded batch, shape-checked against its bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct PaddedBatch {
    pub batch_size:     usize,
    pub encoder_len:    usize,
    pub decoder_len:    usize,
    pub encoder_inputs: Vec<u32>,
    pub decoder_inputs: Vec<u32>,
    pub targets:        Vec<u32>,
    pub target_weights: Vec<f32>,
}

impl PaddedBatch {
    pub fn from_examples(examples: &[&Example], bucket: BucketSpec) -> Self {
        let batch_size  = examples.len();
        let encoder_len = bucket.max_source_len;
        let decoder_len = bucket.max_target_len + 1;

        let mut encoder_inputs = Vec::with_capacity(batch_size * encoder_len);
        let mut decoder_inputs = Vec::with_capacity(batch_size * decoder_len);
        let mut targets        = Vec::with_capacity(batch_size * decoder_len);
        let mut target_weights = Vec::with_capacity(batch_size * decoder_len);

        for ex in examples {
            // Encoder: pad to S, then reverse the whole row
            let mut enc: Vec<u32> = ex.source.iter().copied().take(encoder_len).collect();
            enc.resize(encoder_len, PAD_ID);
            enc.reverse();
            encoder_inputs.extend(enc);

            // Decoder: GO + target, padded to T + 1
            let mut dec = Vec::with_capacity(decoder_len);
            dec.push(GO_ID);
            dec.extend(ex.target.iter().copied().take(decoder_len - 1));
            dec.resize(decoder_len, PAD_ID);

            for t in 0..decoder_len {
                let target = dec.get(t + 1).copied().unwrap_or(PAD_ID);
                targets.push(target);
                let real = t + 1 < decoder_len && target != PAD_ID;
                target_weights.push(if real { 1.0 } else { 0.0 });
            }
            decoder_inputs.extend(dec);
        }

        Self {
            batch_size,
            encoder_len,
            decoder_len,
            encoder_inputs,
            decoder_inputs,
            targets,
            target_weights,
        }
    }

    /// Stack the flat buffers into tensors on `device`.
    pub fn to_tensors<B: Backend>(&self, device: &B::Device) -> Seq2SeqBatch<B> {
        let ints = |v: &[u32], len: usize| {
            let flat: Vec<i32> = v.iter().map(|&x| x as i32).collect();
            Tensor::<B, 1, Int>::from_ints(flat.as_slice(), device)
                .reshape([self.batch_size, len])
        };

        Seq2SeqBatch {
            encoder_inputs: ints(&self.encoder_inputs, self.encoder_len),
            decoder_inputs: ints(&self.decoder_inputs, self.decoder_len),
            targets:        ints(&self.targets, self.decoder_len),
            target_weights: Tensor::<B, 1>::from_floats(self.target_weights.as_slice(), device)
                .reshape([self.batch_size, self.decoder_len]),
        }
    }
}

/// A batch ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct Seq2SeqBatch<B: Backend> {
    /// [batch, source_len]
    pub encoder_inputs: Tensor<B, 2, Int>,
    /// [batch, target_len + 1]
    pub decoder_inputs: Tensor<B, 2, Int>,
    /// [batch, target_len + 1]
    pub targets: Tensor<B, 2, Int>,
    /// [batch, target_len + 1]
    pub target_weights: Tensor<B, 2>,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tokenizer::EOS_ID;

    #[test]
    fn test_padding_reversal_and_weights() {
        let ex = Example::new(vec![7, 8], vec![5, EOS_ID]);
        let batch = PaddedBatch::from_examples(&[&ex], BucketSpec::new(3, 3));

        assert_eq!(batch.encoder_inputs, vec![PAD_ID, 8, 7]);
        assert_eq!(batch.decoder_inputs, vec![GO_ID, 5, EOS_ID, PAD_ID]);
        assert_eq!(batch.targets, vec![5, EOS_ID, PAD_ID, PAD_ID]);
        assert_eq!(batch.target_weights, vec![1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_full_length_target_keeps_all_weights() {
        let ex = Example::new(vec![1], vec![4, 5, EOS_ID]);
        let batch = PaddedBatch::from_examples(&[&ex, &ex], BucketSpec::new(1, 3));

        assert_eq!(batch.decoder_len, 4);
        assert_eq!(batch.targets.len(), 8);
        assert_eq!(&batch.target_weights[..4], &[1.0, 1.0, 1.0, 0.0]);
        assert_eq!(batch.target_weights[..4], batch.target_weights[4..]);
    }
}
