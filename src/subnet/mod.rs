//! IPv4/IPv6 subnet arithmetic
//!
//! Addresses are handled as plain integers (`u32` / `u128`); masking is a
//! bitwise AND with the prefix mask.

mod v4;
mod v6;

pub use v4::{subnet_v4, subnet_v4_cidr, AddressClass, SubnetV4};
pub use v6::{subnet_v6, subnet_v6_cidr, SubnetV6};

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};

/// Inclusive range of assignable addresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRange<T> {
    pub first: T,
    pub last: T,
}

/// Split "addr/prefix" text; a bare address is a single-host prefix
fn split_cidr(input: &str, max_prefix: u32) -> CalcResult<(&str, u32)> {
    let input = input.trim();
    match input.split_once('/') {
        Some((address, prefix)) => {
            let prefix: u32 = prefix.trim().parse().map_err(|_| {
                CalcError::malformed_address(input, format!("prefix '{}' is not a number", prefix))
            })?;
            check_prefix(prefix, max_prefix)?;
            Ok((address.trim(), prefix))
        }
        None => Ok((input, max_prefix)),
    }
}

fn check_prefix(prefix: u32, max_prefix: u32) -> CalcResult<()> {
    if prefix > max_prefix {
        return Err(CalcError::PrefixOutOfRange {
            prefix,
            max: max_prefix,
        });
    }
    Ok(())
}
