//! Trust providers and issuer dispatch
//!
//! Externally pre-signed bundles are verified against a pinned trust root.
//! Which root applies is decided by the organization name in the signing
//! certificate's issuer DN: the CI provider runs its own transparency
//! infrastructure, everything signed through the public-good instance uses
//! the general Sigstore root. Any other issuer is rejected outright.

use crate::error::{Error, Result};

/// Issuer organization of certificates minted by the GitHub Actions CA
pub const ISSUER_ORG_GITHUB: &str = "GitHub, Inc.";

/// Issuer organization marker of the Sigstore public-good instance
pub const ISSUER_ORG_PUBLIC_GOOD: &str = "sigstore.dev";

/// A known transparency-infrastructure provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrustProvider {
    /// GitHub's own Fulcio/timestamping infrastructure
    GitHubActions,
    /// The Sigstore public-good instance
    PublicGood,
}

impl TrustProvider {
    /// Select the provider for a certificate issuer organization
    pub fn for_issuer(organization: &str) -> Result<Self> {
        match organization {
            ISSUER_ORG_GITHUB => Ok(TrustProvider::GitHubActions),
            ISSUER_ORG_PUBLIC_GOOD => Ok(TrustProvider::PublicGood),
            other => Err(Error::UnsupportedIssuer(other.to_string())),
        }
    }

    /// Short name, used as the cache subdirectory
    pub fn name(&self) -> &'static str {
        match self {
            TrustProvider::GitHubActions => "github",
            TrustProvider::PublicGood => "sigstore-public-good",
        }
    }

    /// Mirror URL serving this provider's `trusted_root.json`
    pub fn mirror_url(&self) -> &'static str {
        match self {
            TrustProvider::GitHubActions => "https://tuf-repo.github.com/targets/trusted_root.json",
            TrustProvider::PublicGood => {
                "https://tuf-repo-cdn.sigstore.dev/targets/trusted_root.json"
            }
        }
    }
}

impl std::fmt::Display for TrustProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
