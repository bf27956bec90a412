// Copyright (c) 2022-2023 The MobileCoin Foundation

//! n-of-m `OP_CHECKMULTISIG` script construction
//!
//! Signer keys are derived from the account-level xpubs at `<change>/<address>`
//! and placed in the order given by the configuration, this order is part of
//! the wallet policy so keys are never sorted.

use heapless::Vec;

use crate::{
    apdu::types::{MultisigConfig, MultisigScriptType, OutputType, MAX_SIGNERS, MAX_VARINT_SIZE},
    engine::Error,
    helpers::{hash160, sha256},
    script::{
        opcodes::*, pkscript_from_payload, to_payload, write_compact_size, Payload, ScriptWriter,
        SighashScript,
    },
    xpub::XPub,
};

/// Required output capacity for multisig scripts, enough for
/// `OP_m (<33 byte key>) x 15 OP_15 OP_CHECKMULTISIG` (513 bytes)
pub const MULTISIG_SCRIPT_CAPACITY: usize = 517;

/// Check threshold and signer count bounds, `0 < threshold <= signer_count <= 15`
pub fn check_bounds(multisig: &MultisigConfig) -> Result<(), Error> {
    let n = multisig.signer_count();

    if n == 0 || n > MAX_SIGNERS {
        return Err(Error::InvalidInput);
    }
    if multisig.threshold == 0 || multisig.threshold as usize > n {
        return Err(Error::InvalidInput);
    }

    Ok(())
}

/// Build the multisig script at `<keypath_change>/<keypath_address>`,
/// returning the script length.
///
/// `out` must hold at least [`MULTISIG_SCRIPT_CAPACITY`] bytes.
#[cfg_attr(feature = "noinline", inline(never))]
pub fn pkscript_from_multisig(
    multisig: &MultisigConfig,
    keypath_change: u32,
    keypath_address: u32,
    out: &mut [u8],
) -> Result<usize, Error> {
    check_bounds(multisig)?;

    if out.len() < MULTISIG_SCRIPT_CAPACITY {
        return Err(Error::Unknown);
    }

    let mut w = ScriptWriter::new(out);

    w.op(OP_RESERVED + multisig.threshold as u8)?;

    for x in multisig.xpubs.iter() {
        let child = XPub::parse(x)?.derive(&[keypath_change, keypath_address])?;
        w.push(&child.public_key())?;
    }

    w.op(OP_RESERVED + multisig.signer_count() as u8)?;
    w.op(OP_CHECKMULTISIG)?;

    Ok(w.len())
}

/// Compute the output payload for a multisig configuration,
/// `SHA256(script)` for p2wsh, `HASH160(OP_0 <SHA256(script)>)` for p2wsh-p2sh
#[cfg_attr(feature = "noinline", inline(never))]
pub fn payload_from_multisig(
    multisig: &MultisigConfig,
    script_type: MultisigScriptType,
    keypath_change: u32,
    keypath_address: u32,
) -> Result<Payload, Error> {
    let mut script = [0u8; MULTISIG_SCRIPT_CAPACITY];
    let n = pkscript_from_multisig(multisig, keypath_change, keypath_address, &mut script)?;

    let script_hash = sha256(&script[..n]);

    match script_type {
        MultisigScriptType::P2wsh => to_payload(&script_hash),
        MultisigScriptType::P2wshP2sh => {
            let mut program = [0u8; 34];
            let n = pkscript_from_payload(false, OutputType::P2wsh, &script_hash, &mut program)?;

            to_payload(&hash160(&program[..n]))
        }
    }
}

/// Build the sighash script for a multisig input, the multisig script
/// prefixed with its compact-size length
pub fn sighash_script_from_multisig(
    multisig: &MultisigConfig,
    keypath_change: u32,
    keypath_address: u32,
) -> Result<SighashScript, Error> {
    let mut script = [0u8; MULTISIG_SCRIPT_CAPACITY];
    let n = pkscript_from_multisig(multisig, keypath_change, keypath_address, &mut script)?;

    let mut len = [0u8; MAX_VARINT_SIZE];
    let l = write_compact_size(n as u64, &mut len)?;

    let mut s = Vec::new();
    s.extend_from_slice(&len[..l])
        .map_err(|_| Error::Unknown)?;
    s.extend_from_slice(&script[..n])
        .map_err(|_| Error::Unknown)?;

    Ok(s)
}
