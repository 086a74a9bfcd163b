// ============================================================
// Layer 5 — Seq2Seq Attention Model (Burn)
// ============================================================
// A compact encoder/decoder with dot-product attention:
//
//   source ids ─ embedding ─ LSTM encoder ─┐ outputs [b, S, h]
//                                          │ final state
//   GO+target ─ embedding ─ LSTM decoder ◄─┘
//                               │ [b, T, h]
//                 scores = dec · encᵀ       [b, T, S]
//                 context = softmax · enc   [b, T, h]
//                 tanh(W [dec; context])    [b, T, h]
//                 output projection         [b, T, vocab]
//
// Loss is cross-entropy weighted by the batch's target
// weights, so padded positions contribute nothing.
//
// Reference: Luong et al. (2015) Effective Approaches to
//            Attention-based Neural Machine Translation
//            Burn Book §3 (Building Blocks)

use burn::{
    nn::{Embedding, EmbeddingConfig, Linear, LinearConfig, Lstm, LstmConfig},
    prelude::*,
    tensor::activation::{log_softmax, softmax, tanh},
};

use crate::data::batcher::Seq2SeqBatch;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct Seq2SeqConfig {
    pub vocab_size: usize,
    pub embed_dim:  usize,
    pub hidden_dim: usize,
}

impl Seq2SeqConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Seq2SeqAttention<B> {
        Seq2SeqAttention {
            encoder_embedding: EmbeddingConfig::new(self.vocab_size, self.embed_dim).init(device),
            decoder_embedding: EmbeddingConfig::new(self.vocab_size, self.embed_dim).init(device),
            encoder:           LstmConfig::new(self.embed_dim, self.hidden_dim, true).init(device),
            decoder:           LstmConfig::new(self.embed_dim, self.hidden_dim, true).init(device),
            attention_proj:    LinearConfig::new(2 * self.hidden_dim, self.hidden_dim).init(device),
            output:            LinearConfig::new(self.hidden_dim, self.vocab_size).init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct Seq2SeqAttention<B: Backend> {
    pub encoder_embedding: Embedding<B>,
    pub decoder_embedding: Embedding<B>,
    pub encoder:           Lstm<B>,
    pub decoder:           Lstm<B>,
    pub attention_proj:    Linear<B>,
    pub output:            Linear<B>,
}

impl<B: Backend> Seq2SeqAttention<B> {
    /// encoder_inputs: [b, S], decoder_inputs: [b, T] → logits [b, T, vocab]
    pub fn forward(
        &self,
        encoder_inputs: Tensor<B, 2, Int>,
        decoder_inputs: Tensor<B, 2, Int>,
    ) -> Tensor<B, 3> {
        let enc_emb = self.encoder_embedding.forward(encoder_inputs);
        let (enc_out, enc_state) = self.encoder.forward(enc_emb, None);

        let dec_emb = self.decoder_embedding.forward(decoder_inputs);
        let (dec_out, _) = self.decoder.forward(dec_emb, Some(enc_state));

        let scores  = dec_out.clone().matmul(enc_out.clone().swap_dims(1, 2));
        let context = softmax(scores, 2).matmul(enc_out);

        let attended = tanh(self.attention_proj.forward(Tensor::cat(vec![dec_out, context], 2)));
        self.output.forward(attended)
    }

    /// Mean negative log-likelihood over positions with non-zero weight.
    pub fn forward_loss(&self, batch: Seq2SeqBatch<B>) -> Tensor<B, 1> {
        let logits = self.forward(batch.encoder_inputs, batch.decoder_inputs);
        let [batch_size, steps, vocab] = logits.dims();
        let n = batch_size * steps;

        let log_probs = log_softmax(logits.reshape([n, vocab]), 1);
        let picked = log_probs
            .gather(1, batch.targets.reshape([n, 1]))
            .reshape([n]);

        let weights = batch.target_weights.reshape([n]);
        let total = weights.clone().sum().clamp_min(1.0);
        (picked * weights).sum().neg() / total
    }
}
