// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Bitcoin hardware wallet core
//!
//! This provides a common [Engine][engine] deriving output scripts and payloads
//! and driving signing sessions for execution on hardware wallets.
//!
//! Interactions with the [Engine][engine] are performed via [Event][engine::Event]s and [Output][engine::Output]s,
//! see [hww_btc_apdu] for APDU objects and wire encodings.
//!
//! ## Derivation
//!
//! Pure derivation functions carry no state and may be called directly:
//!
//! - [`payload_at_keypath`][script::payload_at_keypath] derives the payload for a
//!   single-key script type (p2pkh, p2wpkh, p2wpkh-p2sh, p2tr) via the keystore [Driver][engine::Driver]
//! - [`pkscript_from_payload`][script::pkscript_from_payload] places a payload into a locking script
//! - [`pkscript_from_multisig`][multisig::pkscript_from_multisig] and
//!   [`payload_from_multisig`][multisig::payload_from_multisig] build n-of-m multisig scripts
//!   and their p2wsh / p2wsh-p2sh payloads from account-level xpubs
//!
//! ## Signing sessions
//!
//! A signing attempt is a short-lived session holding the script configurations
//! accepted for one transaction.
//!
//! 1. Issue [`SignInitReq`][hww_btc_apdu::sign_init::SignInitReq] with the coin and
//!    script configurations, these are [validated][validate::validate_init] before being accepted
//! 2. For each input issue [`SignInputReq`][hww_btc_apdu::sign_input::SignInputReq] to fetch a
//!    [`SighashScriptResp`][hww_btc_apdu::sign_input::SighashScriptResp] containing the
//!    scriptCode for the signature digest
//! 3. For each change output issue [`SignOutputReq`][hww_btc_apdu::sign_output::SignOutputReq]
//!    to fetch a [`PayloadResp`][hww_btc_apdu::sign_output::PayloadResp], used to recompute and
//!    compare the change address
//! 4. Issue [`SignResetReq`][hww_btc_apdu::result::SignResetReq] on completion or abort
//!
//! Any failure resets the session, after which queries fail until a new session is started.
//!

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub use hww_btc_apdu::{self as apdu};

pub mod engine;

pub mod helpers;

pub mod multisig;

pub mod params;

pub mod script;

pub mod validate;

pub mod xpub;

#[cfg(feature = "alloc")]
pub mod address;

pub use apdu::types::{
    BtcCoin, MultisigConfig, MultisigScriptType, OutputType, ScriptConfig,
    ScriptConfigWithKeypath, SimpleType,
};
