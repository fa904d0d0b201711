use serde::Deserialize;

use crate::{BuildError, BuildResult};

/// Weights used to estimate the emitted cost of a chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChunkSizeOptions {
  /// Fixed cost of emitting one more chunk.
  #[serde(default)]
  pub chunk_overhead: Option<f64>,
  /// Factor applied to the size of initial chunks.
  #[serde(default)]
  pub entry_chunk_multiplicator: Option<f64>,
}

impl ChunkSizeOptions {
  pub const DEFAULT_CHUNK_OVERHEAD: f64 = 10000.0;
  pub const DEFAULT_ENTRY_CHUNK_MULTIPLICATOR: f64 = 10.0;

  pub fn chunk_overhead(&self) -> f64 {
    self
      .chunk_overhead
      .unwrap_or(Self::DEFAULT_CHUNK_OVERHEAD)
  }

  pub fn entry_chunk_multiplicator(&self) -> f64 {
    self
      .entry_chunk_multiplicator
      .unwrap_or(Self::DEFAULT_ENTRY_CHUNK_MULTIPLICATOR)
  }
}

fn hash_digest_length_default() -> usize {
  20
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HashOptions {
  /// Length of `rendered_hash`, in hex characters.
  #[serde(default = "hash_digest_length_default")]
  pub hash_digest_length: usize,
}

impl Default for HashOptions {
  fn default() -> Self {
    Self {
      hash_digest_length: hash_digest_length_default(),
    }
  }
}

impl HashOptions {
  /// Hex length of a full xxh3-128 digest.
  pub const MAX_DIGEST_LENGTH: usize = 32;

  pub fn validate(&self) -> BuildResult<()> {
    if self.hash_digest_length == 0 || self.hash_digest_length > Self::MAX_DIGEST_LENGTH {
      return Err(BuildError::invalid_option_value(
        "hashDigestLength",
        self.hash_digest_length,
        "an integer between 1 and 32",
      ));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::{ChunkSizeOptions, HashOptions};

  #[test]
  fn size_options_fall_back_to_defaults() {
    let options = ChunkSizeOptions::default();
    assert_eq!(options.chunk_overhead(), 10000.0);
    assert_eq!(options.entry_chunk_multiplicator(), 10.0);

    let options = ChunkSizeOptions {
      chunk_overhead: Some(0.0),
      entry_chunk_multiplicator: None,
    };
    assert_eq!(options.chunk_overhead(), 0.0);
  }

  #[test]
  fn digest_length_is_bounded() {
    assert!(HashOptions::default().validate().is_ok());
    let err = HashOptions {
      hash_digest_length: 0,
    }
    .validate()
    .unwrap_err();
    assert_eq!(
      err.to_string(),
      r#""hashDigestLength" must be an integer between 1 and 32, received "0"."#
    );
  }

  #[test]
  fn options_deserialize_from_camel_case() {
    let options: ChunkSizeOptions =
      serde_json::from_str(r#"{ "chunkOverhead": 0, "entryChunkMultiplicator": 1 }"#).unwrap();
    assert_eq!(options.chunk_overhead(), 0.0);
    assert_eq!(options.entry_chunk_multiplicator(), 1.0);

    let options: HashOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(options, HashOptions::default());
    assert!(serde_json::from_str::<HashOptions>(r#"{ "hashDigest": 8 }"#).is_err());
  }
}
