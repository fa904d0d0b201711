use xxhash_rust::xxh3::Xxh3;

/// An incremental hash accumulator owned by the caller. Finalizing into a digest is up to the
/// owner.
pub trait HashSink {
  fn update(&mut self, bytes: &[u8]);

  fn update_str(&mut self, value: &str) {
    self.update(value.as_bytes());
  }
}

impl HashSink for Xxh3 {
  fn update(&mut self, bytes: &[u8]) {
    Xxh3::update(self, bytes);
  }
}

/// Records every byte fed into it, handy for asserting on hash input order.
impl HashSink for Vec<u8> {
  fn update(&mut self, bytes: &[u8]) {
    self.extend_from_slice(bytes);
  }
}
