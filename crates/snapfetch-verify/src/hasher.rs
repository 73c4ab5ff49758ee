use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use digest::Digest;

use crate::algorithm::ChecksumAlgorithm;

const READ_BUFFER: usize = 64 * 1024;

pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self) -> Vec<u8>;

    fn finalize_hex(self) -> String
    where
        Self: Sized,
    {
        hex::encode(self.finalize())
    }
}

/// Adapter for any RustCrypto [`Digest`].
pub struct DigestHasher<D: Digest + Send>(D);

impl<D: Digest + Send> DigestHasher<D> {
    pub fn new() -> Self { Self(D::new()) }
}

impl<D: Digest + Send> Default for DigestHasher<D> {
    fn default() -> Self { Self::new() }
}

impl<D: Digest + Send> Hasher for DigestHasher<D> {
    fn update(&mut self, data: &[u8]) { Digest::update(&mut self.0, data); }
    fn finalize(self) -> Vec<u8> { self.0.finalize().to_vec() }
}

/// Hasher selected at runtime from a [`ChecksumAlgorithm`].
pub enum AlgorithmHasher {
    Md5(DigestHasher<md5::Md5>),
    Sha1(DigestHasher<sha1::Sha1>),
    Sha256(DigestHasher<sha2::Sha256>),
    Sha512(DigestHasher<sha2::Sha512>),
    Blake3(Box<blake3::Hasher>),
}

impl AlgorithmHasher {
    pub fn new(algorithm: ChecksumAlgorithm) -> Self {
        match algorithm {
            ChecksumAlgorithm::Md5 => AlgorithmHasher::Md5(DigestHasher::new()),
            ChecksumAlgorithm::Sha1 => AlgorithmHasher::Sha1(DigestHasher::new()),
            ChecksumAlgorithm::Sha256 => AlgorithmHasher::Sha256(DigestHasher::new()),
            ChecksumAlgorithm::Sha512 => AlgorithmHasher::Sha512(DigestHasher::new()),
            ChecksumAlgorithm::Blake3 => AlgorithmHasher::Blake3(Box::new(blake3::Hasher::new())),
        }
    }
}

impl Hasher for AlgorithmHasher {
    fn update(&mut self, data: &[u8]) {
        match self {
            AlgorithmHasher::Md5(h) => h.update(data),
            AlgorithmHasher::Sha1(h) => h.update(data),
            AlgorithmHasher::Sha256(h) => h.update(data),
            AlgorithmHasher::Sha512(h) => h.update(data),
            AlgorithmHasher::Blake3(h) => {
                h.update(data);
            }
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            AlgorithmHasher::Md5(h) => h.finalize(),
            AlgorithmHasher::Sha1(h) => h.finalize(),
            AlgorithmHasher::Sha256(h) => h.finalize(),
            AlgorithmHasher::Sha512(h) => h.finalize(),
            AlgorithmHasher::Blake3(h) => h.finalize().as_bytes().to_vec(),
        }
    }
}

/// Streams a file through `algorithm` and returns the lowercase hex digest.
pub fn hash_file(path: impl AsRef<Path>, algorithm: ChecksumAlgorithm) -> io::Result<String> {
    let mut file = File::open(path.as_ref())?;
    let mut hasher = algorithm.hasher();
    let mut buffer = vec![0u8; READ_BUFFER];

    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hasher.finalize_hex())
}
