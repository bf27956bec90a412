//! Prelude to simplify downstream use of APDU objects
//!

pub use crate::{
    result::{ResultCode, ResultResp, SessionState, SignResetReq},
    sign_init::SignInitReq,
    sign_input::{SighashScriptResp, SignInputReq},
    sign_output::{PayloadResp, SignOutputReq},
    types::{
        BtcCoin, Keypath, MultisigConfig, MultisigScriptType, OutputType, ScriptConfig,
        ScriptConfigWithKeypath, SerializedXpub, SimpleType, HARDENED,
    },
    ApduError, ApduStatic, Instruction, BTC_APDU_CLA,
};
