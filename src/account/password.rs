use rand::Rng;
use sha2::{Digest, Sha256};

const SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;

/// One-way hash of a plaintext password: `sha256$<salt hex>$<digest hex>`
pub fn hash_password(plaintext: &str) -> String {
    let salt: [u8; SALT_LEN] = rand::rng().random();
    hash_with_salt(plaintext, &salt)
}

/// Checks a plaintext password against a stored hash
pub fn verify_password(plaintext: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(scheme), Some(salt_hex), Some(_)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if scheme != SCHEME {
        return false;
    }

    match decode_hex(salt_hex) {
        Some(salt) => hash_with_salt(plaintext, &salt) == stored,
        None => false,
    }
}

fn hash_with_salt(plaintext: &str, salt: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(plaintext.as_bytes());
    let digest = hasher.finalize();

    format!("{}${}${}", SCHEME, encode_hex(salt), encode_hex(&digest))
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok())
        .collect()
}
