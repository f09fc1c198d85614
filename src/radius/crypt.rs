use md5::{Digest, Md5};

/// Obfuscate a User-Password value (RFC 2865 §5.2).
///
/// The password is zero-padded to a multiple of 16 bytes and split into
/// blocks. Each block is XORed with `MD5(secret + prev)`, where `prev` is
/// the authenticator for the first block and the previous *ciphertext*
/// block after that, so the keystream chains on its own output.
///
/// An empty password produces zero blocks; the padding loop never runs for
/// length 0.
pub fn obfuscate_password(password: &str, authenticator: &[u8; 16], secret: &[u8]) -> Vec<u8> {
    let mut padded = password.as_bytes().to_vec();
    while padded.len() % 16 != 0 {
        padded.push(0);
    }

    let mut out = Vec::with_capacity(padded.len());
    let mut prev = *authenticator;
    for block in padded.chunks(16) {
        let key = keystream_block(secret, &prev);
        let mut cipher = [0u8; 16];
        for (i, (&plain, &k)) in block.iter().zip(key.iter()).enumerate() {
            cipher[i] = plain ^ k;
        }
        out.extend_from_slice(&cipher);
        prev = cipher;
    }
    out
}

/// Invert [`obfuscate_password`]. XOR against the same keystream recovers
/// the zero-padded password; trailing pad bytes are left in place.
pub fn recover_password(obfuscated: &[u8], authenticator: &[u8; 16], secret: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(obfuscated.len());
    let mut prev = *authenticator;
    for block in obfuscated.chunks_exact(16) {
        let key = keystream_block(secret, &prev);
        for (&cipher, &k) in block.iter().zip(key.iter()) {
            out.push(cipher ^ k);
        }
        prev.copy_from_slice(block);
    }
    out
}

fn keystream_block(secret: &[u8], prev: &[u8; 16]) -> [u8; 16] {
    let mut hasher = Md5::new();
    hasher.update(secret);
    hasher.update(prev);
    hasher.finalize().into()
}
