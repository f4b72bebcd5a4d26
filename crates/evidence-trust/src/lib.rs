//! Trust-root selection and loading for bundle verification
//!
//! Maps a signing certificate's issuer organization onto a transparency
//! provider, and loads that provider's trust root: the public-good root
//! ships embedded in the trust library, the CI provider's root is refreshed
//! from its mirror and cached on disk. A failed refresh is a hard error —
//! expired or unreachable trust roots never degrade to a stale copy.

pub mod cache;
pub mod error;
pub mod fetch;
pub mod provider;

pub use cache::TrustRootCache;
pub use error::{Error, Result};
pub use fetch::{HttpSource, TrustRootSource};
pub use provider::{TrustProvider, ISSUER_ORG_GITHUB, ISSUER_ORG_PUBLIC_GOOD};

use sigstore_verify::trust_root::TrustedRoot;

/// Resolves a provider to its loaded trust root
///
/// Verification tests substitute a recording double for this trait to
/// assert which provider's material a bundle selected.
pub trait TrustRootResolver {
    /// Load the trust root for `provider`
    fn resolve(&self, provider: TrustProvider) -> Result<TrustedRoot>;
}

/// Production resolver: embedded public-good root, mirror+cache for the CI
/// provider
pub struct DefaultResolver<S = HttpSource> {
    source: S,
    cache: TrustRootCache,
}

impl DefaultResolver<HttpSource> {
    /// Resolver with the HTTP source and the default cache location
    pub fn new() -> Result<Self> {
        Ok(Self {
            source: HttpSource::new()?,
            cache: TrustRootCache::default_location()?,
        })
    }
}

impl<S: TrustRootSource> DefaultResolver<S> {
    /// Resolver over an explicit source and cache, for tests and embedding
    pub fn with_source_and_cache(source: S, cache: TrustRootCache) -> Self {
        Self { source, cache }
    }
}

impl<S: TrustRootSource> TrustRootResolver for DefaultResolver<S> {
    fn resolve(&self, provider: TrustProvider) -> Result<TrustedRoot> {
        match provider {
            TrustProvider::PublicGood => TrustedRoot::production()
                .map_err(|e| Error::TrustRoot(format!("embedded public-good root: {}", e))),
            TrustProvider::GitHubActions => {
                let bytes = self.source.fetch(provider.mirror_url())?;
                self.cache.store(provider, &bytes)?;
                let json = std::str::from_utf8(&bytes)
                    .map_err(|e| Error::TrustRoot(format!("trust root is not UTF-8: {}", e)))?;
                TrustedRoot::from_json(json)
                    .map_err(|e| Error::TrustRoot(format!("trust root parse failed: {}", e)))
            }
        }
    }
}
