// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Protocol / APDU definitions for Bitcoin signing sessions
//!
//! This module provides the wire encodings for communication with the
//! Bitcoin signing engine, as well as the shared script configuration
//! types (coins, script types, multisig configurations) carried by them.
//!
//! Encodings are intended to be _roughly_ equivalent to packed c structures while maintaining
//! 32-bit field alignment for fixed headers to reduce the need for unaligned access on
//! constrained platforms. All field encodings are little-endian.
//!
//! A signing attempt is driven as:
//!
//! 1. [`SignInitReq`][sign_init::SignInitReq] with the coin and accepted script configurations
//! 2. [`SignInputReq`][sign_input::SignInputReq] for each transaction input, returning a
//!    [`SighashScriptResp`][sign_input::SighashScriptResp]
//! 3. [`SignOutputReq`][sign_output::SignOutputReq] for each change output, returning a
//!    [`PayloadResp`][sign_output::PayloadResp]
//! 4. [`SignResetReq`][result::SignResetReq] on completion or abort

#![no_std]

pub use ledger_proto::{ApduError, ApduReq, ApduStatic};

pub mod prelude;
pub mod result;
pub mod sign_init;
pub mod sign_input;
pub mod sign_output;
pub mod types;

mod helpers;

/// Bitcoin signing APDU Class
pub const BTC_APDU_CLA: u8 = 0xb7;

/// Bitcoin signing APDU instruction codes
#[derive(Copy, Clone, Debug, PartialEq, num_enum::TryFromPrimitive)]
#[repr(u8)]
pub enum Instruction {
    /// Initialise a signing session with accepted script configurations
    BtcSignInit = 0x60,

    /// Fetch the sighash script for a transaction input
    BtcSignInput = 0x61,

    /// Fetch the payload for a change output
    BtcSignOutput = 0x62,

    /// Reset the signing session
    BtcSignReset = 0x63,
}
