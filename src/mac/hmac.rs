use {
    crate::{hash::Hash, mac::Mac},
    docext::docext,
};

const OPAD: u8 = 0x5C;
const IPAD: u8 = 0x36;

/// A hash-based message authentication code, turning any [hash
/// function](crate::hash::Hash) into a [`Mac`].
///
/// The key is first padded with zeros if it is smaller than the hash's
/// internal block size. If the key is larger than the block size, it is
/// first hashed and then truncated/padded with zeros to exactly the block
/// size. The resulting value is $K'$.
///
/// The HMAC tag is computed as
///
/// $$
/// H\Big((K' \oplus opad) \parallel H\big((K' \oplus ipad) \parallel m
/// \big) \Big)
/// $$
///
/// where $m$ is the message, $H$ is the hash function, $opad$ (outer padding)
/// is a sequence of $\mathrm{5C}_{16}$ bytes equal in size to the internal
/// block of the hash function, and $ipad$ (inner padding) is a sequence of
/// $\mathrm{36}_{16}$ bytes. An _inner hash_ is computed over the
/// inner-padded key concatenated to the message; an _outer hash_ is then
/// computed over the outer-padded key concatenated to the inner hash. The
/// outer hash is the resulting tag.
///
/// This construction is resistant to length-extension attacks even when the
/// underlying hash isn't, because the attacker never sees the outer key.
#[docext]
pub struct Hmac {
    name: &'static str,
    tag_size: usize,
    outer_key: Vec<u8>,
    // Reused as both the inner and outer hash instance: once `finalize` is
    // called it resets to a fresh state (per the `Hash` contract), so it can
    // be primed with the outer-padded key without allocating a second
    // hasher.
    hasher: Box<dyn Hash>,
}

impl Hmac {
    pub fn new(hash: Box<dyn Hash>, key: &[u8]) -> Self {
        let mut hash = hash;
        let block_size = hash.block_size();
        let digest_size = hash.digest_size();

        let mut k = vec![0u8; block_size];
        if key.len() <= block_size {
            k[..key.len()].copy_from_slice(key);
        } else {
            let digest = hash.hash(key);
            let s = digest_size.min(block_size);
            k[..s].copy_from_slice(&digest[..s]);
        }

        let inner_key: Vec<u8> = k.iter().map(|b| b ^ IPAD).collect();
        let outer_key: Vec<u8> = k.iter().map(|b| b ^ OPAD).collect();
        hash.update(&inner_key);

        Self { name: hash.name(), tag_size: digest_size, outer_key, hasher: hash }
    }
}

impl Mac for Hmac {
    fn name(&self) -> &'static str {
        self.name
    }

    fn tag_size(&self) -> usize {
        self.tag_size
    }

    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    fn finalize(&mut self) -> Vec<u8> {
        let inner_digest = self.hasher.finalize();
        self.hasher.update(&self.outer_key);
        self.hasher.update(&inner_digest);
        self.hasher.finalize()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hash::Sha256;

    #[test]
    fn rfc4231_test_case_1() {
        // HMAC-SHA-256, 20-byte key of 0x0b, message "Hi There".
        let key = [0x0bu8; 20];
        let mut hmac = Hmac::new(Box::new(Sha256::new()), &key);
        let tag = hmac.mac(b"Hi There");
        assert_eq!(
            hex::encode(tag),
            "b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7"
        );
    }

    #[test]
    fn split_update_matches_one_shot() {
        let key = b"key material";
        let msg = b"The quick brown fox jumps over the lazy dog";
        let mut one_shot = Hmac::new(Box::new(Sha256::new()), key);
        let whole = one_shot.mac(msg);

        let mut split = Hmac::new(Box::new(Sha256::new()), key);
        split.update(&msg[..10]);
        split.update(&msg[10..]);
        assert_eq!(split.finalize(), whole);
    }
}
