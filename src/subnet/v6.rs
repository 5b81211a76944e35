//! IPv6 subnet breakdown

use std::net::Ipv6Addr;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{check_prefix, split_cidr, AddressRange};
use crate::error::{CalcError, CalcResult};

/// 2^128 does not fit in a u128
const FULL_SPACE_COUNT: &str = "340282366920938463463374607431768211456";

/// Everything the subnet calculator shows for an IPv6 network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubnetV6 {
    pub address: Ipv6Addr,
    pub prefix_length: u32,
    pub cidr: String,
    pub network: Ipv6Addr,
    /// Fully expanded form of the address, eight 4-digit groups
    pub expanded: String,
    /// Network address through the last address of the prefix
    pub usable_range: AddressRange<Ipv6Addr>,
    /// 2^(128-prefix) as a decimal string
    pub address_count: String,
    /// Upper 64 bits of the network (routing prefix and subnet field)
    pub subnet_id: String,
    /// Lower 64 bits of the address
    pub interface_id: String,
}

fn prefix_mask(prefix_length: u32) -> u128 {
    if prefix_length == 0 {
        0
    } else {
        u128::MAX << (128 - prefix_length)
    }
}

fn address_count(prefix_length: u32) -> String {
    if prefix_length == 0 {
        FULL_SPACE_COUNT.to_string()
    } else {
        (1u128 << (128 - prefix_length)).to_string()
    }
}

fn hex_groups(bits: u64) -> String {
    (0..4)
        .rev()
        .map(|i| format!("{:04x}", (bits >> (i * 16)) & 0xffff))
        .collect::<Vec<_>>()
        .join(":")
}

fn expand(address: Ipv6Addr) -> String {
    address
        .segments()
        .iter()
        .map(|s| format!("{:04x}", s))
        .collect::<Vec<_>>()
        .join(":")
}

/// Break down an IPv6 address and prefix length
pub fn subnet_v6(address: Ipv6Addr, prefix_length: u32) -> CalcResult<SubnetV6> {
    check_prefix(prefix_length, 128)?;

    let mask = prefix_mask(prefix_length);
    let bits = u128::from(address);
    let network = bits & mask;
    let last = network | !mask;

    debug!("{}/{} -> network {}", address, prefix_length, Ipv6Addr::from(network));

    Ok(SubnetV6 {
        address,
        prefix_length,
        cidr: format!("{}/{}", Ipv6Addr::from(network), prefix_length),
        network: Ipv6Addr::from(network),
        expanded: expand(address),
        usable_range: AddressRange {
            first: Ipv6Addr::from(network),
            last: Ipv6Addr::from(last),
        },
        address_count: address_count(prefix_length),
        subnet_id: hex_groups((network >> 64) as u64),
        interface_id: hex_groups(bits as u64),
    })
}

/// Parse "addr/p" (or a bare address, treated as /128) and break it down
pub fn subnet_v6_cidr(input: &str) -> CalcResult<SubnetV6> {
    let (address, prefix_length) = split_cidr(input, 128)?;
    let address: Ipv6Addr = address
        .parse()
        .map_err(|_| CalcError::malformed_address(input, "not a valid IPv6 address"))?;
    subnet_v6(address, prefix_length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documentation_prefix() {
        let subnet = subnet_v6_cidr("2001:db8:abcd:12::1/64").unwrap();

        assert_eq!(subnet.network, "2001:db8:abcd:12::".parse::<Ipv6Addr>().unwrap());
        assert_eq!(subnet.cidr, "2001:db8:abcd:12::/64");
        assert_eq!(
            subnet.usable_range.last,
            "2001:db8:abcd:12:ffff:ffff:ffff:ffff".parse::<Ipv6Addr>().unwrap()
        );
        assert_eq!(subnet.address_count, "18446744073709551616");
        assert_eq!(subnet.subnet_id, "2001:0db8:abcd:0012");
        assert_eq!(subnet.interface_id, "0000:0000:0000:0001");
        assert_eq!(
            subnet.expanded,
            "2001:0db8:abcd:0012:0000:0000:0000:0001"
        );
    }

    #[test]
    fn test_masking_inside_a_group() {
        let subnet = subnet_v6_cidr("2001:db8:abcd:12ff::1/52").unwrap();
        assert_eq!(subnet.network, "2001:db8:abcd:1000::".parse::<Ipv6Addr>().unwrap());
        assert_eq!(subnet.address_count, (1u128 << 76).to_string());
    }

    #[test]
    fn test_extreme_prefixes() {
        let all = subnet_v6(Ipv6Addr::LOCALHOST, 0).unwrap();
        assert_eq!(all.network, Ipv6Addr::UNSPECIFIED);
        assert_eq!(all.usable_range.last, Ipv6Addr::from(u128::MAX));
        assert_eq!(all.address_count, "340282366920938463463374607431768211456");

        let host = subnet_v6(Ipv6Addr::LOCALHOST, 128).unwrap();
        assert_eq!(host.network, Ipv6Addr::LOCALHOST);
        assert_eq!(host.usable_range.first, host.usable_range.last);
        assert_eq!(host.address_count, "1");
    }

    #[test]
    fn test_containment() {
        let address: Ipv6Addr = "fe80::1ff:fe23:4567:890a".parse().unwrap();
        for prefix in 0..=128 {
            let subnet = subnet_v6(address, prefix).unwrap();
            assert!(subnet.usable_range.first <= address && address <= subnet.usable_range.last);
        }
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            subnet_v6_cidr("2001:db8::g/64"),
            Err(CalcError::MalformedAddress { .. })
        ));
        assert!(matches!(
            subnet_v6_cidr("2001:db8::/129"),
            Err(CalcError::PrefixOutOfRange { prefix: 129, max: 128 })
        ));
        assert!(subnet_v6_cidr("192.168.1.1/24").is_err());
    }
}
