// Copyright (c) 2022-2023 The MobileCoin Foundation

use byteorder::{ByteOrder, LittleEndian};

use crate::{
    types::{Keypath, MAX_KEYPATH_LEN},
    ApduError,
};

/// Check a buffer contains at least `n` bytes from `index`
pub(crate) fn check_len(buff: &[u8], index: usize, n: usize) -> Result<(), ApduError> {
    match index.checked_add(n) {
        Some(end) if end <= buff.len() => Ok(()),
        _ => Err(ApduError::InvalidLength),
    }
}

/// encdec helper module for keypaths, encoded as a sequence of little-endian `u32`s
/// (the element count is carried in the enclosing header)
pub(crate) mod keypath {
    use super::*;

    pub fn enc(k: &[u32], buff: &mut [u8]) -> Result<usize, ApduError> {
        check_len(buff, 0, enc_len(k))?;

        for (i, v) in k.iter().enumerate() {
            LittleEndian::write_u32(&mut buff[i * 4..], *v);
        }

        Ok(enc_len(k))
    }

    pub fn enc_len(k: &[u32]) -> usize {
        k.len() * 4
    }

    pub fn dec(buff: &[u8], count: usize) -> Result<(Keypath, usize), ApduError> {
        if count > MAX_KEYPATH_LEN {
            return Err(ApduError::InvalidLength);
        }
        check_len(buff, 0, count * 4)?;

        let mut k = Keypath::new();
        for i in 0..count {
            // Capacity checked above
            let _ = k.push(LittleEndian::read_u32(&buff[i * 4..]));
        }

        Ok((k, count * 4))
    }
}

#[cfg(test)]
pub(crate) mod test {
    use core::fmt::Debug;

    use encdec::{DecodeOwned, Encode};

    use super::*;

    /// Helper for APDU encode / decode tests
    pub fn encode_decode_apdu<A>(buff: &mut [u8], apdu: &A) -> usize
    where
        A: Encode<Error = ApduError> + DecodeOwned<Output = A, Error = ApduError> + PartialEq + Debug,
    {
        // Encode APDU
        let n = apdu.encode(buff).expect("encode failed");

        // Check encoded length matches expected length
        let expected_n = apdu.encode_len().expect("get length failed");
        assert_eq!(n, expected_n, "encode length mismatch");

        // Decode APDU
        let (decoded, decoded_n) = A::decode_owned(&buff[..n]).expect("decode failed");

        // Check decoded object and length match
        assert_eq!(apdu, &decoded);
        assert_eq!(expected_n, decoded_n);

        // Truncated inputs must be rejected, not read past
        if n > 0 {
            assert!(A::decode_owned(&buff[..n - 1]).is_err());
        }

        n
    }

    #[test]
    fn keypath_bounds() {
        let mut buff = [0u8; 64];

        let n = keypath::enc(&[1, 2, 3], &mut buff).unwrap();
        assert_eq!(n, 12);

        let (k, m) = keypath::dec(&buff, 3).unwrap();
        assert_eq!(&k[..], &[1, 2, 3]);
        assert_eq!(m, 12);

        assert_eq!(
            keypath::dec(&buff, MAX_KEYPATH_LEN + 1),
            Err(ApduError::InvalidLength)
        );
        assert_eq!(keypath::dec(&buff[..8], 3), Err(ApduError::InvalidLength));
    }
}
