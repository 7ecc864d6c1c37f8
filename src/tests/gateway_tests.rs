use crate::nat::gateway::select_gateway;
use std::net::Ipv4Addr;

#[test]
fn test_select_gateway_first_address() {
    let candidates = [Ipv4Addr::new(192, 168, 1, 1), Ipv4Addr::new(10, 0, 0, 1)];
    assert_eq!(
        select_gateway(&candidates),
        Some(Ipv4Addr::new(192, 168, 1, 1))
    );
}

#[test]
fn test_select_gateway_skips_on_link_default() {
    let candidates = [Ipv4Addr::UNSPECIFIED, Ipv4Addr::new(10, 0, 0, 1)];
    assert_eq!(select_gateway(&candidates), Some(Ipv4Addr::new(10, 0, 0, 1)));
}

#[test]
fn test_select_gateway_none() {
    assert_eq!(select_gateway(&[]), None);
    assert_eq!(select_gateway(&[Ipv4Addr::UNSPECIFIED]), None);
}
