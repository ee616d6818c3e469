//! Installation fingerprint sent with license requests.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::net::{Ipv4Addr, UdpSocket};

/// Identifies the installation a license is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Domain (or host name) the software runs under.
    pub domain: String,
    /// IP address of the installation.
    pub ip: String,
    /// Installation directory.
    pub directory: String,
}

impl Fingerprint {
    /// Creates a fingerprint from explicit values.
    pub fn new(
        domain: impl Into<String>,
        ip: impl Into<String>,
        directory: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            ip: ip.into(),
            directory: directory.into(),
        }
    }

    /// Derives a fingerprint from the current machine: host name, primary
    /// outbound IPv4 address, and working directory.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            domain: get_hostname(),
            ip: get_local_ip(),
            directory: env::current_dir()
                .map(|d| d.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

/// A license key together with the installation it is requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseRequest {
    /// The license key.
    pub license_key: String,
    /// The installation fingerprint.
    pub fingerprint: Fingerprint,
}

impl LicenseRequest {
    /// Creates a request.
    pub fn new(license_key: impl Into<String>, fingerprint: Fingerprint) -> Self {
        Self {
            license_key: license_key.into(),
            fingerprint,
        }
    }

    /// Builds the JSON body sent to the setup endpoint.
    #[must_use]
    pub fn setup_body(&self, check_interval_days: u32) -> Value {
        serde_json::json!({
            "license_key": self.license_key,
            "domain": self.fingerprint.domain,
            "ip": self.fingerprint.ip,
            "dir": self.fingerprint.directory,
            "check_interval": check_interval_days,
        })
    }
}

fn get_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "localhost".to_string())
}

/// Local address the OS would route external traffic from.
/// Connecting a UDP socket sends no packets.
fn get_local_ip() -> String {
    UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
        .and_then(|socket| {
            socket.connect((Ipv4Addr::new(192, 0, 2, 1), 9))?;
            socket.local_addr()
        })
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|_| Ipv4Addr::LOCALHOST.to_string())
}
