use crate::ping_error::{ErrorKind, PingError};
use std::net::{IpAddr, Ipv4Addr};
use std::result::Result;

/// Resolves `hostname` to an IPv4 address.
///
/// Strings made only of digits and dots are taken as literals and never looked
/// up; everything else goes through the system resolver and the first IPv4
/// address wins.
pub fn resolve_host_v4(hostname: &str) -> Result<Ipv4Addr, PingError> {
    if hostname.is_empty() {
        return Err(not_found(hostname));
    }
    if is_dotted_decimal(hostname) {
        return hostname.parse::<Ipv4Addr>().map_err(|_| {
            PingError::new(
                ErrorKind::Resolution,
                format!("invalid IPv4 address '{hostname}'"),
            )
        });
    }

    let ips: Vec<IpAddr> = dns_lookup::lookup_host(hostname)
        .map_err(|e| PingError::new(ErrorKind::Resolution, format!("{hostname}: {e}")))?;
    ips.into_iter()
        .find_map(|ip| match ip {
            IpAddr::V4(ipv4) => Some(ipv4),
            IpAddr::V6(_) => None,
        })
        .ok_or_else(|| not_found(hostname))
}

fn is_dotted_decimal(hostname: &str) -> bool {
    hostname.chars().all(|c| c == '.' || c.is_ascii_digit())
}

fn not_found(hostname: &str) -> PingError {
    PingError::new(
        ErrorKind::Resolution,
        format!("could not resolve hostname '{hostname}' to IPv4"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_is_parsed() {
        assert_eq!(
            Ipv4Addr::new(93, 184, 216, 34),
            resolve_host_v4("93.184.216.34").unwrap()
        );
    }

    #[test]
    fn invalid_literal_is_not_looked_up() {
        let error = resolve_host_v4("999.1.1.1").unwrap_err();
        assert_eq!(ErrorKind::Resolution, error.kind);
        assert_eq!("invalid IPv4 address '999.1.1.1'", error.message);

        assert_eq!(ErrorKind::Resolution, resolve_host_v4("1.2.3").unwrap_err().kind);
    }

    #[test]
    fn empty_hostname() {
        assert_eq!(ErrorKind::Resolution, resolve_host_v4("").unwrap_err().kind);
    }

    #[test]
    fn dotted_decimal_detection() {
        assert!(is_dotted_decimal("127.0.0.1"));
        assert!(is_dotted_decimal("1.2.3"));
        assert!(!is_dotted_decimal("localhost"));
        assert!(!is_dotted_decimal("1e100.net"));
    }

    #[test]
    fn test_lookup_host() {
        let ip = resolve_host_v4("localhost").unwrap();

        assert_eq!(ip, Ipv4Addr::new(127, 0, 0, 1));
    }
}
