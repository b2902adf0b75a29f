use std::fs::File;

use candle_core::quantized::gguf_file;
use candle_core::{Device, Tensor};
use candle_transformers::generation::{LogitsProcessor, Sampling};
use candle_transformers::models::quantized_llama::ModelWeights;
use eyre::{Result, bail, eyre};
use hf_hub::api::sync::Api;
use log::{debug, info};
use tokenizers::Tokenizer;

const TOP_K: usize = 50;
const TOP_P: f64 = 0.9;

/// Hard cap on prompt plus continuation, in tokens.
pub const MAX_SEQ_LEN: usize = 1024;

/// Where to find the pretrained weights and tokenizer.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model_repo: String,
    pub model_file: String,
    pub tokenizer_repo: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_repo: "TheBloke/TinyLlama-1.1B-Chat-v1.0-GGUF".to_string(),
            model_file: "tinyllama-1.1b-chat-v1.0.Q4_K_M.gguf".to_string(),
            tokenizer_repo: "TinyLlama/TinyLlama-1.1B-Chat-v1.0".to_string(),
        }
    }
}

/// Anything that maps a token tensor at a sequence position to next-token logits.
///
/// Exists so the sampling loop can be driven by a stub in tests.
trait TokenModel {
    fn forward(&mut self, input: &Tensor, index_pos: usize) -> candle_core::Result<Tensor>;
}

impl TokenModel for ModelWeights {
    fn forward(&mut self, input: &Tensor, index_pos: usize) -> candle_core::Result<Tensor> {
        ModelWeights::forward(self, input, index_pos)
    }
}

/// A loaded model, its tokenizer, and the device the weights live on.
///
/// Constructed once per process and reused for every generation.
pub struct ModelHandle {
    model: ModelWeights,
    tokenizer: Tokenizer,
    device: Device,
}

impl ModelHandle {
    /// Download (or reuse from the local Hub cache) and load the model.
    ///
    /// Blocking; run off the async runtime's core threads.
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let device = Device::cuda_if_available(0)?;
        info!("Loading {} ({}) on {device:?}", config.model_repo, config.model_file);

        let api = Api::new()?;
        let model_path = api.model(config.model_repo.clone()).get(&config.model_file)?;
        let tokenizer_path = api.model(config.tokenizer_repo.clone()).get("tokenizer.json")?;

        let tokenizer =
            Tokenizer::from_file(&tokenizer_path).map_err(|e| eyre!("failed to load tokenizer: {e}"))?;

        let mut file = File::open(&model_path)?;
        let content = gguf_file::Content::read(&mut file)?;
        let model = ModelWeights::from_gguf(content, &mut file, &device)?;

        debug!("Model loaded from {}", model_path.display());
        Ok(Self { model, tokenizer, device })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Sample one continuation of `prompt` and return only the generated text.
    ///
    /// Top-k/top-p sampling at the given temperature, seeded by `seed`. The
    /// prompt tokens are never decoded back, so no prefix stripping is needed.
    /// An empty string is a valid result when the first sampled token ends the
    /// sequence.
    pub fn generate(&mut self, prompt: &str, temperature: f64, seed: u64) -> Result<String> {
        let encoding = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| eyre!("failed to encode prompt: {e}"))?;
        let prompt_tokens = encoding.get_ids();

        if prompt_tokens.len() >= MAX_SEQ_LEN {
            bail!("prompt is {} tokens, over the {MAX_SEQ_LEN}-token window", prompt_tokens.len());
        }

        let eos_token = self
            .tokenizer
            .token_to_id("</s>")
            .or_else(|| self.tokenizer.token_to_id("<|endoftext|>"));

        debug!("Sampling from {} prompt tokens (temperature {temperature}, seed {seed})", prompt_tokens.len());

        let tokens = sample_tokens(&mut self.model, prompt_tokens, eos_token, temperature, seed, &self.device)?;
        debug!("Generated {} tokens", tokens.len());

        self.tokenizer
            .decode(&tokens, true)
            .map_err(|e| eyre!("failed to decode output: {e}"))
    }
}

/// Autoregressive sampling loop: one prompt pass, then token-by-token until
/// end-of-sequence or the window is full.
fn sample_tokens(
    model: &mut dyn TokenModel,
    prompt_tokens: &[u32],
    eos_token: Option<u32>,
    temperature: f64,
    seed: u64,
    device: &Device,
) -> Result<Vec<u32>> {
    let sampling = Sampling::TopKThenTopP {
        k: TOP_K,
        p: TOP_P,
        temperature,
    };
    let mut logits_processor = LogitsProcessor::from_sampling(seed, sampling);

    let input = Tensor::new(prompt_tokens, device)?.unsqueeze(0)?;
    let logits = model.forward(&input, 0)?.squeeze(0)?;
    let mut next = logits_processor.sample(&logits)?;

    let mut generated = Vec::new();
    while prompt_tokens.len() + generated.len() < MAX_SEQ_LEN {
        if Some(next) == eos_token {
            break;
        }
        generated.push(next);

        let input = Tensor::new(&[next], device)?.unsqueeze(0)?;
        let logits = model
            .forward(&input, prompt_tokens.len() + generated.len() - 1)?
            .squeeze(0)?;
        next = logits_processor.sample(&logits)?;
    }

    Ok(generated)
}
