//! Article contract ABI
//!
//! Call and event types are declared with `sol!`; quantities are alloy
//! `U256` values.

use alloy_core::sol;
use alloy_core::sol_types::{SolCall, SolEvent};
use alloy_primitives::utils::format_units;
use alloy_primitives::{hex, keccak256, B256, U256};

use crate::error::BlockchainError;

sol! {
    function mintArticle(string contentId);

    event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);
}

/// Default mint call signature
pub const DEFAULT_MINT_SIGNATURE: &str = <mintArticleCall as SolCall>::SIGNATURE;

/// Calldata for a mint function taking the content id as its one `string`
///
/// The selector is derived from `signature`, so deployments exposing the
/// same argument under another name still work.
pub fn mint_calldata(signature: &str, content_id: &str) -> Vec<u8> {
    let call = mintArticleCall {
        contentId: content_id.to_string(),
    };
    let mut data = keccak256(signature.as_bytes())[..4].to_vec();
    call.abi_encode_raw(&mut data);
    data
}

pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode_prefixed(bytes)
}

/// Parse a `0x`-prefixed hex quantity
pub fn parse_quantity(value: &str) -> Option<U256> {
    let value = value.trim();
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))?;
    if digits.is_empty() {
        return Some(U256::ZERO);
    }
    U256::from_str_radix(digits, 16).ok()
}

/// Token id carried by an ERC-721 `Transfer` log
///
/// ERC-20 transfers share the topic hash but index only two arguments, so a
/// log with other than four topics is not a mint.
pub fn transfer_token_id(topics: &[String], data: &str) -> Option<U256> {
    if topics.len() != 4 {
        return None;
    }
    let topics = topics
        .iter()
        .map(|topic| topic.parse::<B256>())
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    if topics[0] != Transfer::SIGNATURE_HASH {
        return None;
    }
    let data = hex::decode(data).ok()?;
    Transfer::decode_raw_log(topics, &data)
        .ok()
        .map(|event| event.tokenId)
}

/// Render an amount in the smallest unit with `decimals` places (`1.5`, `0.0`)
///
/// Fails when `decimals` exceeds what a `U256` can scale by.
pub fn format_balance(amount: U256, decimals: u8) -> Result<String, BlockchainError> {
    if decimals == 0 {
        return Ok(amount.to_string());
    }
    let formatted = format_units(amount, decimals)
        .map_err(|e| BlockchainError::Parse(format!("{} decimals: {}", decimals, e)))?;

    Ok(match formatted.split_once('.') {
        Some((whole, fraction)) => match fraction.trim_end_matches('0') {
            "" => format!("{}.0", whole),
            fraction => format!("{}.{}", whole, fraction),
        },
        None => formatted,
    })
}
