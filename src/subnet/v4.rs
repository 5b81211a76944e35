//! IPv4 subnet breakdown

use std::net::Ipv4Addr;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{check_prefix, split_cidr, AddressRange};
use crate::error::{CalcError, CalcResult};

/// Classful network class derived from the leading bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressClass {
    /// 0.0.0.0 - 127.255.255.255
    A,
    /// 128.0.0.0 - 191.255.255.255
    B,
    /// 192.0.0.0 - 223.255.255.255
    C,
    /// Multicast, 224.0.0.0 - 239.255.255.255
    D,
    /// Reserved, 240.0.0.0 - 255.255.255.255
    E,
}

impl AddressClass {
    pub fn of(address: Ipv4Addr) -> Self {
        match address.octets()[0] {
            0..=127 => AddressClass::A,
            128..=191 => AddressClass::B,
            192..=223 => AddressClass::C,
            224..=239 => AddressClass::D,
            _ => AddressClass::E,
        }
    }
}

/// Everything the subnet calculator shows for an IPv4 network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubnetV4 {
    pub address: Ipv4Addr,
    pub prefix_length: u32,
    /// Network in CIDR notation, e.g. 192.168.1.0/24
    pub cidr: String,
    pub network: Ipv4Addr,
    pub broadcast: Ipv4Addr,
    pub subnet_mask: Ipv4Addr,
    pub wildcard_mask: Ipv4Addr,
    /// First and last host address; `None` for /31 and /32
    pub usable_range: Option<AddressRange<Ipv4Addr>>,
    /// 2^(32-prefix) - 2, clamped at zero
    pub usable_host_count: u64,
    pub total_address_count: u64,
    pub address_class: AddressClass,
    /// Inside 10/8, 172.16/12 or 192.168/16
    pub is_private: bool,
}

fn prefix_mask(prefix_length: u32) -> u32 {
    // Shifting a u32 by 32 overflows
    if prefix_length == 0 {
        0
    } else {
        u32::MAX << (32 - prefix_length)
    }
}

/// Break down an IPv4 address and prefix length
pub fn subnet_v4(address: Ipv4Addr, prefix_length: u32) -> CalcResult<SubnetV4> {
    check_prefix(prefix_length, 32)?;

    let mask = prefix_mask(prefix_length);
    let bits = u32::from(address);
    let network = bits & mask;
    let broadcast = network | !mask;

    let total_address_count = 1u64 << (32 - prefix_length);
    let usable_host_count = total_address_count.saturating_sub(2);
    let usable_range = (usable_host_count > 0).then(|| AddressRange {
        first: Ipv4Addr::from(network + 1),
        last: Ipv4Addr::from(broadcast - 1),
    });

    debug!("{}/{} -> network {}", address, prefix_length, Ipv4Addr::from(network));

    Ok(SubnetV4 {
        address,
        prefix_length,
        cidr: format!("{}/{}", Ipv4Addr::from(network), prefix_length),
        network: Ipv4Addr::from(network),
        broadcast: Ipv4Addr::from(broadcast),
        subnet_mask: Ipv4Addr::from(mask),
        wildcard_mask: Ipv4Addr::from(!mask),
        usable_range,
        usable_host_count,
        total_address_count,
        address_class: AddressClass::of(address),
        is_private: address.is_private(),
    })
}

/// Parse "a.b.c.d/p" (or a bare address, treated as /32) and break it down
pub fn subnet_v4_cidr(input: &str) -> CalcResult<SubnetV4> {
    let (address, prefix_length) = split_cidr(input, 32)?;
    let address: Ipv4Addr = address
        .parse()
        .map_err(|_| CalcError::malformed_address(input, "not a dotted-quad IPv4 address"))?;
    subnet_v4(address, prefix_length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_c_reference() {
        let subnet = subnet_v4_cidr("192.168.1.1/24").unwrap();

        assert_eq!(subnet.network, Ipv4Addr::new(192, 168, 1, 0));
        assert_eq!(subnet.broadcast, Ipv4Addr::new(192, 168, 1, 255));
        assert_eq!(subnet.subnet_mask, Ipv4Addr::new(255, 255, 255, 0));
        assert_eq!(subnet.wildcard_mask, Ipv4Addr::new(0, 0, 0, 255));
        assert_eq!(subnet.usable_host_count, 254);
        assert_eq!(subnet.total_address_count, 256);
        assert_eq!(
            subnet.usable_range,
            Some(AddressRange {
                first: Ipv4Addr::new(192, 168, 1, 1),
                last: Ipv4Addr::new(192, 168, 1, 254),
            })
        );
        assert_eq!(subnet.address_class, AddressClass::C);
        assert!(subnet.is_private);
        assert_eq!(subnet.cidr, "192.168.1.0/24");
    }

    #[test]
    fn test_prefix_zero() {
        let subnet = subnet_v4(Ipv4Addr::new(8, 8, 8, 8), 0).unwrap();

        assert_eq!(subnet.network, Ipv4Addr::new(0, 0, 0, 0));
        assert_eq!(subnet.broadcast, Ipv4Addr::new(255, 255, 255, 255));
        assert_eq!(subnet.subnet_mask, Ipv4Addr::new(0, 0, 0, 0));
        assert_eq!(subnet.total_address_count, 1u64 << 32);
        assert_eq!(subnet.usable_host_count, (1u64 << 32) - 2);
        assert!(!subnet.is_private);
    }

    #[test]
    fn test_point_to_point_and_host_prefixes() {
        let p2p = subnet_v4_cidr("10.0.0.5/31").unwrap();
        assert_eq!(p2p.network, Ipv4Addr::new(10, 0, 0, 4));
        assert_eq!(p2p.broadcast, Ipv4Addr::new(10, 0, 0, 5));
        assert_eq!(p2p.usable_host_count, 0);
        assert!(p2p.usable_range.is_none());

        let host = subnet_v4_cidr("10.0.0.5").unwrap();
        assert_eq!(host.prefix_length, 32);
        assert_eq!(host.network, host.broadcast);
        assert_eq!(host.usable_host_count, 0);
    }

    #[test]
    fn test_containment_and_host_count() {
        let addresses = [
            Ipv4Addr::new(0, 0, 0, 0),
            Ipv4Addr::new(172, 20, 13, 77),
            Ipv4Addr::new(203, 0, 113, 200),
            Ipv4Addr::new(255, 255, 255, 255),
        ];
        for address in addresses {
            for prefix in 0..=32 {
                let subnet = subnet_v4(address, prefix).unwrap();
                assert!(subnet.network <= address && address <= subnet.broadcast);
                let expected = (2i64.pow(32 - prefix) - 2).max(0) as u64;
                assert_eq!(subnet.usable_host_count, expected);
            }
        }
    }

    #[test]
    fn test_address_classes() {
        assert_eq!(AddressClass::of(Ipv4Addr::new(10, 1, 2, 3)), AddressClass::A);
        assert_eq!(AddressClass::of(Ipv4Addr::new(172, 16, 0, 1)), AddressClass::B);
        assert_eq!(AddressClass::of(Ipv4Addr::new(224, 0, 0, 1)), AddressClass::D);
        assert_eq!(AddressClass::of(Ipv4Addr::new(250, 0, 0, 1)), AddressClass::E);
    }

    #[test]
    fn test_private_ranges() {
        assert!(subnet_v4_cidr("172.31.255.1/16").unwrap().is_private);
        assert!(!subnet_v4_cidr("172.32.0.1/16").unwrap().is_private);
        assert!(subnet_v4_cidr("10.200.0.1/8").unwrap().is_private);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            subnet_v4_cidr("192.168.1/24"),
            Err(CalcError::MalformedAddress { .. })
        ));
        assert!(matches!(
            subnet_v4_cidr("300.1.1.1/24"),
            Err(CalcError::MalformedAddress { .. })
        ));
        assert!(matches!(
            subnet_v4(Ipv4Addr::LOCALHOST, 40),
            Err(CalcError::PrefixOutOfRange { prefix: 40, max: 32 })
        ));
    }
}
