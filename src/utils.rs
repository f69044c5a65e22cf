//! Identifier generation for items and movements

use bech32::Bech32m;
use uuid7::uuid7;

pub const ITEM_HRP: &str = "item_";
pub const MOVEMENT_HRP: &str = "mov_";

// construct a unique, time-ordered id then encode using bech32
pub fn new_uuid_to_bech32(hrp: &str) -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}

pub fn new_item_id() -> anyhow::Result<String> {
    new_uuid_to_bech32(ITEM_HRP)
}

pub fn new_movement_id() -> anyhow::Result<String> {
    new_uuid_to_bech32(MOVEMENT_HRP)
}
