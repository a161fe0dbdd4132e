//! IPv4 and IPv6 addresses.

use std::net::IpAddr;

use crate::{CleanContext, PropertyType};

pub static IP: IpType = IpType;

#[derive(Debug, Clone, Copy)]
pub struct IpType;

impl PropertyType for IpType {
    fn name(&self) -> &'static str {
        "ip"
    }

    fn label(&self) -> &'static str {
        "IP-Address"
    }

    fn plural(&self) -> &'static str {
        "IP-Addresses"
    }

    fn group(&self) -> Option<&'static str> {
        Some("ips")
    }

    fn matchable(&self) -> bool {
        true
    }

    fn pivot(&self) -> bool {
        true
    }

    fn max_length(&self) -> usize {
        64
    }

    fn clean_text(&self, text: &str, _ctx: &CleanContext<'_>) -> Option<String> {
        text.trim().parse::<IpAddr>().ok().map(|ip| ip.to_string())
    }

    fn specificity(&self, _value: &str) -> f64 {
        0.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_normalizes_v6() {
        let ctx = CleanContext::default();
        assert_eq!(IP.clean("192.168.0.1", &ctx).as_deref(), Some("192.168.0.1"));
        assert_eq!(IP.clean("2001:0db8:0000::0001", &ctx).as_deref(), Some("2001:db8::1"));
        assert_eq!(IP.clean("300.1.1.1", &ctx), None);
    }
}
