use anyhow::Result;
use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};
use tokenizers::Tokenizer;

use crate::domain::example::LabeledExample;
use crate::domain::labels::LabelMap;

/// One tokenised, padded training sample: fixed-length token ids
/// plus the class id from the persisted label map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplaintSample {
    pub input_ids: Vec<u32>,
    pub class_id:  usize,
}

pub struct ComplaintDataset {
    samples: Vec<ComplaintSample>,
}

impl ComplaintDataset {
    pub fn new(samples: Vec<ComplaintSample>) -> Self {
        Self { samples }
    }

    /// Tokenise a partition: pad/truncate every summary to
    /// `max_seq_len` tokens (0 = [PAD]) and resolve its label id.
    pub fn from_examples(
        examples:    &[LabeledExample],
        tokenizer:   &Tokenizer,
        label_map:   &LabelMap,
        max_seq_len: usize,
    ) -> Result<Self> {
        let mut samples = Vec::with_capacity(examples.len());

        for example in examples {
            let encoding = tokenizer
                .encode(example.summary.as_str(), false)
                .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;

            let mut input_ids: Vec<u32> = encoding.get_ids().to_vec();
            input_ids.truncate(max_seq_len);
            while input_ids.len() < max_seq_len {
                input_ids.push(0);
            }

            let class_id = label_map.id_of(&example.label).ok_or_else(|| {
                anyhow::anyhow!("Label '{}' is not in the taxonomy", example.label)
            })?;

            samples.push(ComplaintSample { input_ids, class_id });
        }

        Ok(Self::new(samples))
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

impl Dataset<ComplaintSample> for ComplaintDataset {
    fn get(&self, index: usize) -> Option<ComplaintSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
