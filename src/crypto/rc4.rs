//! RC4 stream cipher.
//!
//! Only used to unwrap the session key, whose cipher key is the decimal user id.
//! The RustCrypto `rc4` crate fixes the key length at the type level, which does
//! not fit a key whose length depends on the account.

/// Keystream state after the key schedule.
struct Rc4 {
    s: [u8; 256],
    i: u8,
    j: u8,
}

impl Rc4 {
    fn new(key: &[u8]) -> Self {
        let mut s = [0u8; 256];
        for (i, b) in s.iter_mut().enumerate() {
            *b = i as u8;
        }
        let mut j = 0u8;
        for i in 0..256 {
            j = j.wrapping_add(s[i]).wrapping_add(key[i % key.len()]);
            s.swap(i, j as usize);
        }
        Self { s, i: 0, j: 0 }
    }

    fn apply(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            self.i = self.i.wrapping_add(1);
            self.j = self.j.wrapping_add(self.s[self.i as usize]);
            self.s.swap(self.i as usize, self.j as usize);
            let k = self.s[self.s[self.i as usize].wrapping_add(self.s[self.j as usize]) as usize];
            *byte ^= k;
        }
    }
}

/// XOR `data` with the RC4 keystream for `key`. Encryption and decryption are the same call.
///
/// An empty key yields `data` unchanged.
pub fn rc4_apply(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    if key.is_empty() {
        return out;
    }
    Rc4::new(key).apply(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        let out = rc4_apply(b"Key", b"Plaintext");
        assert_eq!(hex::encode(out), "bbf316e8d940af0ad3");
    }

    #[test]
    fn test_symmetric() {
        let data = b"session key material";
        let once = rc4_apply(b"123456", data);
        assert_ne!(once.as_slice(), data);
        assert_eq!(rc4_apply(b"123456", &once), data);
    }

    #[test]
    fn test_empty_key_is_identity() {
        assert_eq!(rc4_apply(b"", b"abc"), b"abc");
    }
}
