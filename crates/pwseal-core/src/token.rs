use std::time::{SystemTime, UNIX_EPOCH};

use aes::Aes128;
use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use data_encoding::BASE64URL;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use crate::key::KeyMaterial;
use crate::rng::{RngError, SecureRandom, random_bytes};

const TOKEN_VERSION: u8 = 0x80;
const TIMESTAMP_LEN: usize = 8;
const IV_LEN: usize = 16;
const BLOCK_LEN: usize = 16;
const TAG_LEN: usize = 32;
const HEADER_LEN: usize = 1 + TIMESTAMP_LEN + IV_LEN;
const MIN_TOKEN_LEN: usize = HEADER_LEN + BLOCK_LEN + TAG_LEN;

/// Tokens stamped this many seconds into the future are still accepted,
/// to tolerate clock drift between the encoding and decoding hosts.
pub const MAX_CLOCK_SKEW_SECONDS: u64 = 60;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;
type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token")]
    MalformedToken,
    #[error("token signature mismatch")]
    InvalidSignature,
    #[error("unsupported token version: {0:#04x}")]
    UnsupportedVersion(u8),
    #[error("token expired")]
    TokenExpired,
    #[error("token timestamp is in the future")]
    TokenNotYetValid,
    #[error("token decryption failed")]
    DecryptionFailed,
    #[error("invalid token padding")]
    InvalidPadding,
    #[error(transparent)]
    Entropy(#[from] RngError),
}

/// Seal `plaintext` into an authenticated token stamped with the current
/// wall clock.
pub fn encode_token(
    plaintext: &[u8],
    key: &KeyMaterial,
    rng: &mut dyn SecureRandom,
) -> Result<String, TokenError> {
    encode_token_at(plaintext, key, unix_seconds_now(), rng)
}

/// Seal `plaintext` into an authenticated token stamped `issued_at` (unix
/// seconds).
///
/// Wire layout before encoding: version byte `0x80`, 8-byte big-endian
/// timestamp, 16-byte IV, PKCS#7-padded AES-128-CBC ciphertext, then an
/// HMAC-SHA256 tag over everything preceding it. The whole sequence is
/// returned base64url encoded. The IV is drawn fresh from `rng` on every
/// call.
pub fn encode_token_at(
    plaintext: &[u8],
    key: &KeyMaterial,
    issued_at: u64,
    rng: &mut dyn SecureRandom,
) -> Result<String, TokenError> {
    let iv = random_bytes::<IV_LEN>(rng)?;
    let ciphertext = Aes128CbcEnc::new(key.encryption_key().into(), (&iv).into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut body = Vec::with_capacity(HEADER_LEN + ciphertext.len() + TAG_LEN);
    body.push(TOKEN_VERSION);
    body.extend_from_slice(&issued_at.to_be_bytes());
    body.extend_from_slice(&iv);
    body.extend_from_slice(&ciphertext);

    let mut mac = keyed_mac(key)?;
    mac.update(&body);
    body.extend_from_slice(&mac.finalize().into_bytes());

    Ok(BASE64URL.encode(&body))
}

/// Verify and open a token, ignoring its age.
pub fn decode_token(token: &str, key: &KeyMaterial) -> Result<Vec<u8>, TokenError> {
    decode_inner(token, key, None)
}

/// Verify and open a token, rejecting tokens older than `max_age_seconds`
/// relative to `now` (unix seconds) and tokens stamped further than
/// [`MAX_CLOCK_SKEW_SECONDS`] into the future.
pub fn decode_token_with_ttl(
    token: &str,
    key: &KeyMaterial,
    max_age_seconds: u64,
    now: u64,
) -> Result<Vec<u8>, TokenError> {
    decode_inner(token, key, Some(Ttl { max_age_seconds, now }))
}

#[must_use]
pub fn unix_seconds_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

struct Ttl {
    max_age_seconds: u64,
    now: u64,
}

struct ParsedToken<'a> {
    issued_at: u64,
    iv: [u8; IV_LEN],
    ciphertext: &'a [u8],
}

fn decode_inner(
    token: &str,
    key: &KeyMaterial,
    ttl: Option<Ttl>,
) -> Result<Vec<u8>, TokenError> {
    let decoded = BASE64URL
        .decode(token.as_bytes())
        .map_err(|_| TokenError::MalformedToken)?;
    if decoded.len() < MIN_TOKEN_LEN {
        return Err(TokenError::MalformedToken);
    }

    // The tag covers every preceding byte and is checked before any other
    // field is trusted; a failed tag never reaches the cipher.
    let (body, claimed_tag) = decoded.split_at(decoded.len() - TAG_LEN);
    let mut mac = keyed_mac(key)?;
    mac.update(body);
    mac.verify_slice(claimed_tag)
        .map_err(|_| TokenError::InvalidSignature)?;

    let parsed = parse_body(body)?;

    if let Some(ttl) = ttl {
        if ttl.now.saturating_sub(parsed.issued_at) > ttl.max_age_seconds {
            return Err(TokenError::TokenExpired);
        }
        if parsed.issued_at.saturating_sub(ttl.now) > MAX_CLOCK_SKEW_SECONDS {
            return Err(TokenError::TokenNotYetValid);
        }
    }

    if parsed.ciphertext.is_empty() || parsed.ciphertext.len() % BLOCK_LEN != 0 {
        return Err(TokenError::DecryptionFailed);
    }

    Aes128CbcDec::new(key.encryption_key().into(), (&parsed.iv).into())
        .decrypt_padded_vec_mut::<Pkcs7>(parsed.ciphertext)
        .map_err(|_| TokenError::InvalidPadding)
}

fn parse_body(body: &[u8]) -> Result<ParsedToken<'_>, TokenError> {
    if body.len() < HEADER_LEN {
        return Err(TokenError::MalformedToken);
    }

    let version = body[0];
    if version != TOKEN_VERSION {
        return Err(TokenError::UnsupportedVersion(version));
    }

    let mut timestamp = [0_u8; TIMESTAMP_LEN];
    timestamp.copy_from_slice(&body[1..1 + TIMESTAMP_LEN]);

    let mut iv = [0_u8; IV_LEN];
    iv.copy_from_slice(&body[1 + TIMESTAMP_LEN..HEADER_LEN]);

    Ok(ParsedToken {
        issued_at: u64::from_be_bytes(timestamp),
        iv,
        ciphertext: &body[HEADER_LEN..],
    })
}

fn keyed_mac(key: &KeyMaterial) -> Result<HmacSha256, TokenError> {
    HmacSha256::new_from_slice(key.signing_key()).map_err(|_| TokenError::InvalidSignature)
}
