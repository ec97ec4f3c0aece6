//! Ordered signing of versioned transactions
//!
//! Signers are applied one at a time, in the order given, each filling its
//! own slot among the message's required signers. The transaction is only
//! returned once every slot holds a signature.

use crate::compat::get_required_signers;
use crate::tx_builder::errors::TransactionBuilderError;
use solana_sdk::{
    message::VersionedMessage,
    signature::{Signature, Signer},
    transaction::VersionedTransaction,
};

/// Sign `message` with `signers`, in order, and require full authorization
///
/// # Errors
///
/// - `Signing` if a signer is not a required signer of the message, if the
///   signer itself fails, or if a required signature is left empty
pub fn sign_in_order(
    message: VersionedMessage,
    signers: &[&dyn Signer],
) -> Result<VersionedTransaction, TransactionBuilderError> {
    let required = get_required_signers(&message).to_vec();
    let mut signatures = vec![Signature::default(); required.len()];
    let message_bytes = message.serialize();

    for signer in signers {
        let pubkey = signer
            .try_pubkey()
            .map_err(|e| TransactionBuilderError::Signing(e.to_string()))?;
        let slot = required.iter().position(|key| *key == pubkey).ok_or_else(|| {
            TransactionBuilderError::Signing(format!("{} is not a required signer", pubkey))
        })?;
        signatures[slot] = signer
            .try_sign_message(&message_bytes)
            .map_err(|e| TransactionBuilderError::Signing(e.to_string()))?;
    }

    if let Some(idx) = signatures.iter().position(|s| *s == Signature::default()) {
        return Err(TransactionBuilderError::Signing(format!(
            "missing signature for {}",
            required[idx]
        )));
    }

    Ok(VersionedTransaction {
        signatures,
        message,
    })
}
