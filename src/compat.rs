//! Version-agnostic access to `VersionedMessage` internals
//!
//! Legacy and v0 messages expose the header and the static account keys
//! through different structs. Signing and the landing checks only need those
//! two pieces, so they go through the helpers here instead of matching on the
//! message version at every call site.
//!
//! ```rust,no_run
//! use solana_sdk::transaction::VersionedTransaction;
//! use tx_lander::compat;
//!
//! fn describe(tx: &VersionedTransaction) {
//!     let signers = compat::get_required_signers(&tx.message);
//!     println!(
//!         "{} required signatures, fee payer {:?}",
//!         compat::get_num_required_signatures(&tx.message),
//!         signers.first()
//!     );
//! }
//! ```

use solana_sdk::{
    message::{MessageHeader, VersionedMessage},
    pubkey::Pubkey,
};

/// Message header for either message version
#[inline]
#[must_use]
pub fn get_message_header(message: &VersionedMessage) -> &MessageHeader {
    match message {
        VersionedMessage::Legacy(legacy_msg) => &legacy_msg.header,
        VersionedMessage::V0(v0_msg) => &v0_msg.header,
    }
}

/// Account keys embedded in the message
///
/// For v0 messages this excludes addresses loaded from lookup tables. The
/// landing transaction never uses lookup tables, so this is every key.
#[inline]
#[must_use]
pub fn get_static_account_keys(message: &VersionedMessage) -> &[Pubkey] {
    match message {
        VersionedMessage::Legacy(legacy_msg) => &legacy_msg.account_keys,
        VersionedMessage::V0(v0_msg) => &v0_msg.account_keys,
    }
}

/// Keys whose signatures the message requires, fee payer first
///
/// The slice index of a key is the index of its slot in
/// `VersionedTransaction::signatures`.
#[inline]
#[must_use]
pub fn get_required_signers(message: &VersionedMessage) -> &[Pubkey] {
    let header = get_message_header(message);
    let account_keys = get_static_account_keys(message);
    let num_signers = header.num_required_signatures as usize;

    &account_keys[..num_signers.min(account_keys.len())]
}

#[inline]
#[must_use]
pub fn get_num_required_signatures(message: &VersionedMessage) -> u8 {
    get_message_header(message).num_required_signatures
}
