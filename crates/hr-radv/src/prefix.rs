//! Prefix Information entity (RFC 4861 §4.6.2).
//!
//! A [`Prefix`] is a shared handle: the caller keeps its own clone and the
//! instance's prefix list takes another one on successful insertion. The
//! entity goes away when the last handle is dropped.

use std::fmt;
use std::net::Ipv6Addr;
use std::sync::Arc;

use ipnet::Ipv6Net;
use parking_lot::RwLock;
use tracing::warn;

use crate::error::{RadvError, RadvResult};

pub const DEFAULT_PREFIX_LEN: u8 = 64;
pub const MIN_PREFIX_LEN: u8 = 3;
pub const MAX_PREFIX_LEN: u8 = 128;

// RFC 4861 §6.2.1 suggested values
pub const DEFAULT_PREFERRED_LIFETIME: u32 = 604_800;
pub const DEFAULT_VALID_LIFETIME: u32 = 2_592_000;

#[derive(Debug)]
struct PrefixOpt {
    address: Ipv6Addr,
    prefix_len: u8,
    onlink: bool,
    autoconf: bool,
    valid_lifetime: u32,
    preferred_lifetime: u32,
}

impl Default for PrefixOpt {
    fn default() -> Self {
        Self {
            address: Ipv6Addr::UNSPECIFIED,
            prefix_len: DEFAULT_PREFIX_LEN,
            onlink: true,
            autoconf: true,
            valid_lifetime: DEFAULT_VALID_LIFETIME,
            preferred_lifetime: DEFAULT_PREFERRED_LIFETIME,
        }
    }
}

/// A prefix to advertise.
#[derive(Debug, Clone)]
pub struct Prefix {
    opt: Arc<RwLock<PrefixOpt>>,
}

impl Prefix {
    /// New prefix `::/64`, on-link and autonomous, with default lifetimes.
    pub fn new() -> Self {
        Self {
            opt: Arc::new(RwLock::new(PrefixOpt::default())),
        }
    }

    /// Take another handle on the same prefix.
    pub fn retain(&self) -> Self {
        self.clone()
    }

    /// Give up this handle.
    pub fn release(self) {}

    /// Number of live handles, including this one.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.opt)
    }

    pub fn ptr_eq(&self, other: &Prefix) -> bool {
        Arc::ptr_eq(&self.opt, &other.opt)
    }

    pub fn set_prefix(&self, address: Ipv6Addr, prefix_len: u8) -> RadvResult<()> {
        if !(MIN_PREFIX_LEN..=MAX_PREFIX_LEN).contains(&prefix_len) {
            return Err(RadvError::InvalidArgument(format!(
                "prefix length {} outside {}..={}",
                prefix_len, MIN_PREFIX_LEN, MAX_PREFIX_LEN
            )));
        }

        if prefix_len > 64 {
            // unusual but allowed
            warn!("Unusual prefix length {} greater than 64", prefix_len);
        }

        let mut opt = self.opt.write();
        opt.address = address;
        opt.prefix_len = prefix_len;
        Ok(())
    }

    pub fn set_onlink(&self, onlink: bool) {
        self.opt.write().onlink = onlink;
    }

    pub fn set_address_autoconfiguration(&self, autoconf: bool) {
        self.opt.write().autoconf = autoconf;
    }

    /// No check against the preferred lifetime is made here.
    pub fn set_valid_lifetime(&self, secs: u32) {
        self.opt.write().valid_lifetime = secs;
    }

    pub fn set_preferred_lifetime(&self, secs: u32) {
        self.opt.write().preferred_lifetime = secs;
    }

    pub fn address(&self) -> Ipv6Addr {
        self.opt.read().address
    }

    pub fn prefix_len(&self) -> u8 {
        self.opt.read().prefix_len
    }

    /// Address and length as a network; host bits are kept as configured.
    pub fn network(&self) -> Ipv6Net {
        let opt = self.opt.read();
        // prefix_len is kept within 3..=128 by set_prefix
        Ipv6Net::new(opt.address, opt.prefix_len)
            .unwrap_or_else(|_| Ipv6Net::from(opt.address))
    }

    pub fn onlink(&self) -> bool {
        self.opt.read().onlink
    }

    pub fn address_autoconfiguration(&self) -> bool {
        self.opt.read().autoconf
    }

    pub fn valid_lifetime(&self) -> u32 {
        self.opt.read().valid_lifetime
    }

    pub fn preferred_lifetime(&self) -> u32 {
        self.opt.read().preferred_lifetime
    }

    pub fn valid_lifetime_be(&self) -> [u8; 4] {
        self.valid_lifetime().to_be_bytes()
    }

    pub fn preferred_lifetime_be(&self) -> [u8; 4] {
        self.preferred_lifetime().to_be_bytes()
    }

    /// Whether the two address ranges intersect. Prefixes either nest or are
    /// disjoint, so it is enough to test the shorter one against the other's
    /// address.
    pub fn overlaps(&self, other: &Prefix) -> bool {
        let (a, b) = (self.network(), other.network());
        if a.prefix_len() <= b.prefix_len() {
            a.contains(&b.addr())
        } else {
            b.contains(&a.addr())
        }
    }
}

impl Default for Prefix {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let opt = self.opt.read();
        write!(f, "{}/{}", opt.address, opt.prefix_len)
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use parking_lot::Mutex;

    use super::*;

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` with a subscriber writing into a buffer, return what it logged.
    fn captured_logs(f: impl FnOnce()) -> String {
        let buf = LogBuffer::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buf.0.lock().clone();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn prefix(s: &str) -> Prefix {
        let net: Ipv6Net = s.parse().unwrap();
        let p = Prefix::new();
        p.set_prefix(net.addr(), net.prefix_len()).unwrap();
        p
    }

    #[test]
    fn test_defaults() {
        let p = Prefix::new();
        assert_eq!(p.address(), Ipv6Addr::UNSPECIFIED);
        assert_eq!(p.prefix_len(), 64);
        assert!(p.onlink());
        assert!(p.address_autoconfiguration());
        assert_eq!(p.preferred_lifetime(), 604800);
        assert_eq!(p.valid_lifetime(), 2592000);
        assert_eq!(p.ref_count(), 1);
    }

    #[test]
    fn test_set_prefix_bounds() {
        let p = Prefix::new();
        let addr: Ipv6Addr = "2001:db8::".parse().unwrap();

        assert!(matches!(p.set_prefix(addr, 2), Err(RadvError::InvalidArgument(_))));
        assert!(matches!(p.set_prefix(addr, 129), Err(RadvError::InvalidArgument(_))));
        // rejected calls leave the prefix alone
        assert_eq!(p.address(), Ipv6Addr::UNSPECIFIED);
        assert_eq!(p.prefix_len(), 64);

        p.set_prefix(addr, 3).unwrap();
        assert_eq!(p.prefix_len(), 3);
        p.set_prefix(addr, 128).unwrap();
        assert_eq!(p.prefix_len(), 128);
        p.set_prefix(addr, 96).unwrap();
        assert_eq!(p.address(), addr);
        assert_eq!(p.to_string(), "2001:db8::/96");
    }

    #[test]
    fn test_long_prefix_logs_diagnostic() {
        let p = Prefix::new();
        let addr: Ipv6Addr = "2001:db8::".parse().unwrap();

        let logs = captured_logs(|| p.set_prefix(addr, 96).unwrap());
        assert!(logs.contains("Unusual prefix length 96 greater than 64"), "{logs}");
        assert_eq!(p.prefix_len(), 96);

        let logs = captured_logs(|| p.set_prefix(addr, 64).unwrap());
        assert!(!logs.contains("Unusual prefix length"), "{logs}");
    }

    #[test]
    fn test_flags_and_lifetimes() {
        let p = Prefix::new();
        p.set_onlink(false);
        p.set_address_autoconfiguration(false);
        assert!(!p.onlink());
        assert!(!p.address_autoconfiguration());

        // preferred > valid is accepted as is
        p.set_valid_lifetime(60);
        p.set_preferred_lifetime(3600);
        assert_eq!(p.valid_lifetime(), 60);
        assert_eq!(p.preferred_lifetime(), 3600);
        assert_eq!(p.valid_lifetime_be(), [0, 0, 0, 60]);
        assert_eq!(p.preferred_lifetime_be(), [0, 0, 0x0e, 0x10]);
    }

    #[test]
    fn test_retain_release() {
        let p = prefix("2001:db8::/64");
        let q = p.retain();
        assert_eq!(p.ref_count(), 2);
        assert!(p.ptr_eq(&q));

        q.set_onlink(false);
        assert!(!p.onlink());

        q.release();
        assert_eq!(p.ref_count(), 1);
        assert_eq!(p.to_string(), "2001:db8::/64");
    }

    #[test]
    fn test_overlaps() {
        let wide = prefix("2001:db8::/32");
        let narrow = prefix("2001:db8:1::/48");
        let other = prefix("2001:db9::/32");
        let sibling = prefix("2001:db8:2::/48");

        assert!(wide.overlaps(&narrow));
        assert!(narrow.overlaps(&wide));
        assert!(wide.overlaps(&wide));
        assert!(!wide.overlaps(&other));
        assert!(!narrow.overlaps(&sibling));
    }

    #[test]
    fn test_overlaps_ignores_host_bits() {
        let a = prefix("2001:db8:0:1::1/64");
        let b = prefix("2001:db8:0:1::/64");
        assert!(a.overlaps(&b));
    }
}
