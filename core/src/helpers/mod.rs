// Copyright (c) 2022-2023 The MobileCoin Foundation

use core::str::from_utf8;

use bitcoin_hashes::{hash160, sha256, sha512, Hash, HashEngine, Hmac, HmacEngine};
use emstr::{helpers::Fractional, EncodeStr};

/// Satoshi per whole coin unit
pub const SATOSHI_PER_UNIT: u64 = 100_000_000;

/// RIPEMD160(SHA256(data))
pub fn hash160(data: &[u8]) -> [u8; 20] {
    hash160::Hash::hash(data).to_byte_array()
}

/// SHA256(data)
pub fn sha256(data: &[u8]) -> [u8; 32] {
    sha256::Hash::hash(data).to_byte_array()
}

/// BIP340 tagged hash, `SHA256(SHA256(tag) || SHA256(tag) || data)`
pub fn tagged_hash(tag: &str, data: &[u8]) -> [u8; 32] {
    let tag = sha256::Hash::hash(tag.as_bytes());

    let mut e = sha256::Hash::engine();
    e.input(tag.as_byte_array());
    e.input(tag.as_byte_array());
    e.input(data);

    sha256::Hash::from_engine(e).to_byte_array()
}

/// HMAC-SHA512 over the concatenation of `parts`
pub fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> [u8; 64] {
    let mut e = HmacEngine::<sha512::Hash>::new(key);
    for p in parts {
        e.input(p);
    }

    Hmac::<sha512::Hash>::from_engine(e).to_byte_array()
}

/// Format a satoshi amount as a decimal coin value with unit,
/// trailing fractional zeros are trimmed
pub fn fmt_amount<'a>(satoshi: u64, unit: &str, buff: &'a mut [u8]) -> &'a str {
    let r = emstr::write!(
        &mut buff[..],
        Fractional::<i128>::new(satoshi as i128, SATOSHI_PER_UNIT as i128),
        ' ',
        unit
    );

    let n = match r {
        Ok(v) => v,
        Err(_) => return "ENCODE_ERR",
    };

    match from_utf8(&buff[..n]) {
        Ok(v) => v,
        Err(_) => "INVALID_UTF8",
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fmt_btc() {
        let tests = &[
            (1234567890, "12.3456789 LOL"),
            (0, "0 LOL"),
            (1, "0.00000001 LOL"),
            (10, "0.0000001 LOL"),
            (15, "0.00000015 LOL"),
            (370, "0.0000037 LOL"),
            (371, "0.00000371 LOL"),
            (40000000000, "400 LOL"),
            (400000000, "4 LOL"),
            (40000000, "0.4 LOL"),
            (5432345, "0.05432345 LOL"),
            (54323452708, "543.23452708 LOL"),
            (100000000, "1 LOL"),
            (1234567800000001, "12345678.00000001 LOL"),
            (u64::MAX, "184467440737.09551615 LOL"),
        ];

        for (v, s) in tests {
            let mut buff = [0u8; 32];

            let e = fmt_amount(*v, "LOL", &mut buff);

            assert_eq!(&e, s);
        }
    }

    #[test]
    fn hashes() {
        assert_eq!(
            hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            hex::encode(hash160(b"")),
            "b472a266d0bd89c13706a4132ccfb16f7c3b9fcb"
        );
    }

    #[test]
    fn tagged_hash_matches_manual() {
        let t = sha256(b"TapTweak");

        let mut preimage = [0u8; 64 + 3];
        preimage[..32].copy_from_slice(&t);
        preimage[32..64].copy_from_slice(&t);
        preimage[64..].copy_from_slice(b"abc");

        assert_eq!(tagged_hash("TapTweak", b"abc"), sha256(&preimage));
    }
}
