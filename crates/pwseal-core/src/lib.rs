pub mod key;
pub mod password;
pub mod rng;
pub mod token;

pub const APP_NAME: &str = "pwseal";

pub use key::{KEY_LEN, KeyError, KeyMaterial};
pub use password::{DEFAULT_LENGTH, GeneratorConfig, generate_password, password_strength};
pub use rng::{OsEntropy, RngError, SecureRandom};
pub use token::{
    MAX_CLOCK_SKEW_SECONDS, TokenError, decode_token, decode_token_with_ttl, encode_token,
    encode_token_at, unix_seconds_now,
};
