// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Address encoding for output payloads (base58check and bech32 / bech32m)

use alloc::{string::String, vec::Vec};

use bech32::{u5, ToBase32, Variant};

use crate::{
    apdu::types::OutputType,
    engine::Error,
    params::Params,
    script::{HASH160_LEN, SHA256_LEN},
};

/// Encode an output payload as an address for the provided coin
pub fn address_from_payload(
    params: &Params,
    output_type: OutputType,
    payload: &[u8],
) -> Result<String, Error> {
    match output_type {
        OutputType::P2pkh => base58_address(params.base58_version_p2pkh, HASH160_LEN, payload),
        OutputType::P2sh => base58_address(params.base58_version_p2sh, HASH160_LEN, payload),
        OutputType::P2wpkh => segwit_address(params.bech32_hrp, 0, HASH160_LEN, payload),
        OutputType::P2wsh => segwit_address(params.bech32_hrp, 0, SHA256_LEN, payload),
        OutputType::P2tr if params.taproot_support => {
            segwit_address(params.bech32_hrp, 1, SHA256_LEN, payload)
        }
        OutputType::P2tr | OutputType::Unknown => Err(Error::InvalidInput),
    }
}

fn base58_address(version: u8, len: usize, payload: &[u8]) -> Result<String, Error> {
    if payload.len() != len {
        return Err(Error::InvalidInput);
    }

    Ok(bs58::encode(payload).with_check_version(version).into_string())
}

fn segwit_address(
    hrp: &str,
    witness_version: u8,
    len: usize,
    program: &[u8],
) -> Result<String, Error> {
    if program.len() != len {
        return Err(Error::InvalidInput);
    }

    let mut data = Vec::with_capacity(1 + (program.len() * 8 + 4) / 5);
    data.push(u5::try_from_u8(witness_version).map_err(|_| Error::Unknown)?);
    data.extend_from_slice(&program.to_base32());

    // BIP350, v0 programs use bech32 and v1+ use bech32m
    let variant = match witness_version {
        0 => Variant::Bech32,
        _ => Variant::Bech32m,
    };

    bech32::encode(hrp, data, variant).map_err(|_| Error::Unknown)
}
