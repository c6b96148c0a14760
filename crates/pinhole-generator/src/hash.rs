use crate::Generator;
use pinhole_core::ShortCode;
use sha2::{Digest, Sha256};
use typed_builder::TypedBuilder;

pub const DEFAULT_CODE_LENGTH: usize = 8;
pub const MIN_CODE_LENGTH: usize = 6;
pub const MAX_CODE_LENGTH: usize = 16;

/// Number of digest bytes fed to the base58 encoder. Always encodes to at
/// least `MAX_CODE_LENGTH` characters.
const DIGEST_PREFIX_LEN: usize = 16;

/// Generates short codes by hashing the long URL together with a random nonce.
///
/// The candidate is the trailing `code_length` characters of the base58
/// encoding of a SHA-256 digest over `long_url || nonce`. The nonce is
/// re-rolled on every call, so retries after a collision yield fresh
/// candidates. At the default length of 8 the code space is 58^8 (about
/// 1.28e14).
#[derive(Debug, Clone, TypedBuilder)]
pub struct HashGenerator {
    #[builder(
        default = DEFAULT_CODE_LENGTH,
        setter(transform = |len: usize| len.clamp(MIN_CODE_LENGTH, MAX_CODE_LENGTH))
    )]
    code_length: usize,
}

impl Default for HashGenerator {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl HashGenerator {
    pub fn code_length(&self) -> usize {
        self.code_length
    }

    /// Derives the candidate for a given nonce. Deterministic.
    pub fn candidate(&self, long_url: &str, nonce: u128) -> ShortCode {
        let digest = Sha256::new()
            .chain_update(long_url.as_bytes())
            .chain_update(nonce.to_be_bytes())
            .finalize();

        let encoded = bs58::encode(&digest[..DIGEST_PREFIX_LEN]).into_string();
        // low-order digits are uniformly distributed, leading ones are not
        let code = &encoded[encoded.len() - self.code_length..];
        ShortCode::new_unchecked(code)
    }
}

impl Generator for HashGenerator {
    type Output = ShortCode;

    fn generate(&self, long_url: &str) -> Self::Output {
        self.candidate(long_url, rand::random::<u128>())
    }
}
