//! Embedded schema set used when no node is available.
//!
//! These definitions must stay field-for-field identical to what a node
//! publishes through `app:getSchema`; the offline and online paths are
//! expected to produce byte-identical transactions.

use crate::codec::{DataType, Field, Schema};
use crate::config::*;

use super::{AssetSchema, SchemaSet};

fn schema(id: &str, fields: Vec<Field>) -> Schema {
    Schema::new_unchecked(id, fields)
}

/// The transaction envelope.
pub fn transaction_schema() -> Schema {
    schema(
        "txcraft/transaction",
        vec![
            Field::scalar("moduleID", 1, DataType::Uint32),
            Field::scalar("assetID", 2, DataType::Uint32),
            Field::scalar("nonce", 3, DataType::Uint64),
            Field::scalar("fee", 4, DataType::Uint64),
            Field::scalar("senderPublicKey", 5, DataType::Bytes).fixed_length(PUBLIC_KEY_LENGTH),
            Field::scalar("asset", 6, DataType::Bytes),
            Field::array("signatures", 7, DataType::Bytes),
        ],
    )
}

pub fn account_schema() -> Schema {
    let token = schema(
        "txcraft/account.token",
        vec![Field::scalar("balance", 1, DataType::Uint64)],
    );
    let sequence = schema(
        "txcraft/account.sequence",
        vec![Field::scalar("nonce", 1, DataType::Uint64)],
    );
    let keys = schema(
        "txcraft/account.keys",
        vec![
            Field::scalar("numberOfSignatures", 1, DataType::Uint32),
            Field::array("mandatoryKeys", 2, DataType::Bytes).fixed_item_length(PUBLIC_KEY_LENGTH),
            Field::array("optionalKeys", 3, DataType::Bytes).fixed_item_length(PUBLIC_KEY_LENGTH),
        ],
    );
    let delegate = schema(
        "txcraft/account.dpos.delegate",
        vec![
            Field::scalar("username", 1, DataType::String),
            Field::array("pomHeights", 2, DataType::Uint32),
            Field::scalar("consecutiveMissedBlocks", 3, DataType::Uint32),
            Field::scalar("lastForgedHeight", 4, DataType::Uint32),
            Field::scalar("isBanned", 5, DataType::Boolean),
            Field::scalar("totalVotesReceived", 6, DataType::Uint64),
        ],
    );
    let sent_vote = schema(
        "txcraft/account.dpos.sentVotes",
        vec![
            Field::scalar("delegateAddress", 1, DataType::Bytes),
            Field::scalar("amount", 2, DataType::Uint64),
        ],
    );
    let unlocking = schema(
        "txcraft/account.dpos.unlocking",
        vec![
            Field::scalar("delegateAddress", 1, DataType::Bytes),
            Field::scalar("amount", 2, DataType::Uint64),
            Field::scalar("unvoteHeight", 3, DataType::Uint32),
        ],
    );
    let dpos = schema(
        "txcraft/account.dpos",
        vec![
            Field::object("delegate", 1, delegate),
            Field::object_array("sentVotes", 2, sent_vote),
            Field::object_array("unlocking", 3, unlocking),
        ],
    );
    schema(
        "txcraft/account",
        vec![
            Field::scalar("address", 1, DataType::Bytes).fixed_length(ADDRESS_LENGTH),
            Field::object("token", 2, token),
            Field::object("sequence", 3, sequence),
            Field::object("keys", 4, keys),
            Field::object("dpos", 5, dpos),
        ],
    )
}

pub fn token_transfer_schema() -> Schema {
    let mut data = Field::scalar("data", 3, DataType::String);
    data.max_length = Some(64);
    schema(
        "txcraft/token/transfer",
        vec![
            Field::scalar("amount", 1, DataType::Uint64),
            Field::scalar("recipientAddress", 2, DataType::Bytes).fixed_length(ADDRESS_LENGTH),
            data,
        ],
    )
}

pub fn keys_register_schema() -> Schema {
    let key_list = |name: &str, field_number: u32| {
        Field::array(name, field_number, DataType::Bytes)
            .fixed_item_length(PUBLIC_KEY_LENGTH)
            .item_count(Some(0), Some(MAX_KEYS_COUNT))
    };
    schema(
        "txcraft/keys/register",
        vec![
            Field::scalar("numberOfSignatures", 1, DataType::Uint32),
            key_list("mandatoryKeys", 2),
            key_list("optionalKeys", 3),
        ],
    )
}

pub fn dpos_register_delegate_schema() -> Schema {
    let mut username = Field::scalar("username", 1, DataType::String);
    username.min_length = Some(1);
    username.max_length = Some(20);
    schema("txcraft/dpos/registerDelegate", vec![username])
}

pub fn dpos_vote_schema() -> Schema {
    let vote = schema(
        "txcraft/dpos/vote.votes",
        vec![
            Field::scalar("delegateAddress", 1, DataType::Bytes).fixed_length(ADDRESS_LENGTH),
            Field::scalar("amount", 2, DataType::Sint64),
        ],
    );
    schema("txcraft/dpos/vote", vec![Field::object_array("votes", 1, vote)])
}

pub fn dpos_unlock_schema() -> Schema {
    let unlock = schema(
        "txcraft/dpos/unlock.unlockObjects",
        vec![
            Field::scalar("delegateAddress", 1, DataType::Bytes).fixed_length(ADDRESS_LENGTH),
            Field::scalar("amount", 2, DataType::Uint64),
            Field::scalar("unvoteHeight", 3, DataType::Uint32),
        ],
    );
    schema(
        "txcraft/dpos/unlock",
        vec![Field::object_array("unlockObjects", 1, unlock)],
    )
}

pub fn legacy_reclaim_schema() -> Schema {
    schema(
        "txcraft/legacyAccount/reclaim",
        vec![Field::scalar("amount", 1, DataType::Uint64)],
    )
}

/// Chain-state record of legacy addresses archived at genesis. Not a
/// transaction asset, so it is not part of the schema set.
pub fn unregistered_addresses_schema() -> Schema {
    let entry = schema(
        "txcraft/legacyAccount/unregisteredAddresses.unregisteredAddresses",
        vec![
            Field::scalar("address", 1, DataType::Bytes),
            Field::scalar("balance", 2, DataType::Uint64),
        ],
    );
    schema(
        "txcraft/legacyAccount/unregisteredAddresses",
        vec![Field::object_array("unregisteredAddresses", 1, entry)],
    )
}

/// The complete embedded schema set.
pub fn builtin_schema_set() -> SchemaSet {
    let asset = |module_id, asset_id, schema| AssetSchema {
        module_id,
        asset_id,
        schema,
    };
    SchemaSet {
        transaction: transaction_schema(),
        account: account_schema(),
        assets: vec![
            asset(TOKEN_MODULE_ID, TOKEN_TRANSFER_ASSET_ID, token_transfer_schema()),
            asset(KEYS_MODULE_ID, KEYS_REGISTER_ASSET_ID, keys_register_schema()),
            asset(
                DPOS_MODULE_ID,
                DPOS_REGISTER_DELEGATE_ASSET_ID,
                dpos_register_delegate_schema(),
            ),
            asset(DPOS_MODULE_ID, DPOS_VOTE_ASSET_ID, dpos_vote_schema()),
            asset(DPOS_MODULE_ID, DPOS_UNLOCK_ASSET_ID, dpos_unlock_schema()),
            asset(
                LEGACY_ACCOUNT_MODULE_ID,
                LEGACY_RECLAIM_ASSET_ID,
                legacy_reclaim_schema(),
            ),
        ],
    }
}
