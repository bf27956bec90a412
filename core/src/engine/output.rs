// Copyright (c) 2022-2023 The MobileCoin Foundation

use encdec::Encode;

use crate::{
    apdu::{self, result::ResultCode, result::SessionState, ApduError},
    script::{Payload, SighashScript},
};

/// [`Engine`][super::Engine] outputs (in response to events), typically encoded to response [APDUs][crate::apdu]
#[derive(Clone, PartialEq, Debug)]
pub enum Output {
    /// Session state
    State { state: SessionState },

    /// Sighash script for a transaction input
    SighashScript(SighashScript),

    /// Payload for a change output
    Payload(Payload),
}

impl Output {
    /// Encode an [`Output`] object to a response APDU
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        match self {
            Output::State { state } => {
                apdu::result::ResultResp::new(ResultCode::Ok, *state).encode(buff)
            }
            Output::SighashScript(s) => apdu::sign_input::SighashScriptResp::new(s)?.encode(buff),
            Output::Payload(p) => apdu::sign_output::PayloadResp::new(p)?.encode(buff),
        }
    }
}
