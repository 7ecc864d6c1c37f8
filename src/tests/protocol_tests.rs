use crate::nat::protocol::{
    build_external_address_request, build_natpmp_map_request, parse_external_address_response,
    parse_natpmp_map_response, NatPmpOpcode, NatPmpResultCode, NATPMP_VERSION,
};
use crate::nat::{IpProtocol, NatError};
use std::net::Ipv4Addr;

#[test]
fn test_natpmp_result_code_conversion() {
    assert_eq!(NatPmpResultCode::from_u16(0), Some(NatPmpResultCode::Success));
    assert_eq!(
        NatPmpResultCode::from_u16(1),
        Some(NatPmpResultCode::UnsupportedVersion)
    );
    assert_eq!(
        NatPmpResultCode::from_u16(2),
        Some(NatPmpResultCode::NotAuthorized)
    );
    assert_eq!(NatPmpResultCode::from_u16(999), None);
}

#[test]
fn test_natpmp_result_code_error_message() {
    assert_eq!(NatPmpResultCode::Success.to_error_message(), "Success");
    assert_eq!(
        NatPmpResultCode::NotAuthorized.to_error_message(),
        "Not authorized/refused"
    );
    assert_eq!(
        NatPmpResultCode::NetworkFailure.to_error_message(),
        "Network failure"
    );
}

#[test]
fn test_build_external_address_request() {
    assert_eq!(build_external_address_request(), vec![NATPMP_VERSION, 0]);
}

#[test]
fn test_build_natpmp_map_request_tcp() {
    let request = build_natpmp_map_request(8080, 50123, 3600, IpProtocol::TCP);

    assert_eq!(request.len(), 12, "NAT-PMP MAP request should be 12 bytes");
    assert_eq!(request[0], NATPMP_VERSION, "First byte should be NAT-PMP version (0)");
    assert_eq!(
        request[1],
        NatPmpOpcode::MapTcp as u8,
        "Second byte should be MAP TCP opcode (2)"
    );
    assert_eq!(&request[2..4], &[0, 0], "Reserved bytes should be 0");

    let internal_port = u16::from_be_bytes([request[4], request[5]]);
    assert_eq!(internal_port, 8080, "Internal port should match");

    let external_port = u16::from_be_bytes([request[6], request[7]]);
    assert_eq!(external_port, 50123, "Suggested external port should match");

    let lifetime = u32::from_be_bytes([request[8], request[9], request[10], request[11]]);
    assert_eq!(lifetime, 3600, "Lifetime should match requested value");
}

#[test]
fn test_build_natpmp_delete_request_udp() {
    let request = build_natpmp_map_request(5060, 41000, 0, IpProtocol::UDP);

    assert_eq!(
        request[1],
        NatPmpOpcode::MapUdp as u8,
        "Second byte should be MAP UDP opcode (1)"
    );
    assert_eq!(&request[8..12], &[0, 0, 0, 0], "Deletion uses a zero lifetime");
}

#[test]
fn test_natpmp_map_response_parsing() {
    // version(1) | opcode(1) | result_code(2) | epoch_time(4) | internal_port(2) | external_port(2) | lifetime(4)
    let mut response = Vec::with_capacity(16);
    response.push(NATPMP_VERSION);
    response.push(128 + NatPmpOpcode::MapTcp as u8);
    response.extend_from_slice(&0u16.to_be_bytes());
    response.extend_from_slice(&1234567u32.to_be_bytes());
    response.extend_from_slice(&8080u16.to_be_bytes());
    response.extend_from_slice(&50123u16.to_be_bytes());
    response.extend_from_slice(&3600u32.to_be_bytes());

    let parsed = parse_natpmp_map_response(&response, IpProtocol::TCP).unwrap();

    assert_eq!(parsed.epoch_secs, 1234567);
    assert_eq!(parsed.internal_port, 8080);
    assert_eq!(parsed.external_port, 50123);
    assert_eq!(parsed.lifetime_secs, 3600);
}

#[test]
fn test_natpmp_response_wrong_protocol_opcode() {
    let mut response = vec![0u8; 16];
    response[1] = 128 + NatPmpOpcode::MapUdp as u8;

    let result = parse_natpmp_map_response(&response, IpProtocol::TCP);

    match result {
        Err(NatError::InvalidResponse(msg)) => assert!(msg.contains("Unexpected opcode")),
        other => panic!("Expected opcode mismatch, got {:?}", other),
    }
}

#[test]
fn test_natpmp_response_invalid_version() {
    let mut response = vec![0u8; 16];
    response[0] = 99;
    response[1] = 130;

    let result = parse_natpmp_map_response(&response, IpProtocol::TCP);

    match result {
        Err(NatError::InvalidResponse(msg)) => assert!(msg.contains("Invalid version")),
        other => panic!("Expected invalid version, got {:?}", other),
    }
}

#[test]
fn test_natpmp_response_too_short() {
    let response = vec![0u8; 10];

    let result = parse_natpmp_map_response(&response, IpProtocol::TCP);

    match result {
        Err(NatError::InvalidResponse(msg)) => assert!(msg.contains("too short")),
        other => panic!("Expected short response error, got {:?}", other),
    }
}

#[test]
fn test_natpmp_response_error_code() {
    let mut response = Vec::with_capacity(16);
    response.push(NATPMP_VERSION);
    response.push(130);
    response.extend_from_slice(&3u16.to_be_bytes()); // network failure
    response.extend_from_slice(&[0u8; 12]);

    let result = parse_natpmp_map_response(&response, IpProtocol::TCP);

    match result {
        Err(err @ NatError::GatewayRejected(NatPmpResultCode::NetworkFailure)) => {
            assert_eq!(err.to_string(), "Gateway rejected request: Network failure");
        }
        other => panic!("Expected gateway rejection, got {:?}", other),
    }
}

#[test]
fn test_natpmp_response_unknown_result_code() {
    let mut response = vec![0u8; 16];
    response[1] = 130;
    response[2..4].copy_from_slice(&77u16.to_be_bytes());

    let result = parse_natpmp_map_response(&response, IpProtocol::TCP);

    assert!(matches!(result, Err(NatError::InvalidResponse(_))));
}

#[test]
fn test_external_address_response_parsing() {
    let response = [0, 128, 0, 0, 0, 0, 0x30, 0x39, 203, 0, 113, 10];

    let parsed = parse_external_address_response(&response).unwrap();

    assert_eq!(parsed.epoch_secs, 12345);
    assert_eq!(parsed.external_ip, Ipv4Addr::new(203, 0, 113, 10));
}

#[test]
fn test_external_address_response_rejects_map_opcode() {
    let response = [0, 129, 0, 0, 0, 0, 0, 0, 203, 0, 113, 10];

    assert!(parse_external_address_response(&response).is_err());
}

#[test]
fn test_ip_protocol_parsing_and_display() {
    assert_eq!("tcp".parse::<IpProtocol>().unwrap(), IpProtocol::TCP);
    assert_eq!("UDP".parse::<IpProtocol>().unwrap(), IpProtocol::UDP);
    match "sctp".parse::<IpProtocol>() {
        Err(err @ NatError::InvalidProtocol(_)) => {
            assert_eq!(err.to_string(), "Invalid protocol: sctp");
        }
        other => panic!("Expected invalid protocol, got {:?}", other),
    }
    assert_eq!(IpProtocol::TCP.to_string(), "tcp");
    assert_eq!(IpProtocol::UDP.to_string(), "udp");
}
