//! Static asset URL resolution. Only the learner configuration view uses it.

/// Host collaborator turning authored asset paths into public URLs.
pub trait AssetResolver: Send + Sync {
    /// Rewrite a portable `/static/...` path; other URLs pass through.
    fn expand(&self, url: &str) -> String;
    /// URL of a file bundled with this service (e.g. the default background).
    fn local_resource(&self, path: &str) -> String;
}

const STATIC_PREFIX: &str = "/static/";

/// Rewrites `/static/<file>` to `<base>/<file>`.
#[derive(Clone, Debug)]
pub struct StaticAssets {
    base: String,
}

impl StaticAssets {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self { base: base.trim_end_matches('/').to_string() }
    }
}

impl AssetResolver for StaticAssets {
    fn expand(&self, url: &str) -> String {
        match url.strip_prefix(STATIC_PREFIX) {
            Some(rest) => format!("{}/{}", self.base, rest),
            None => url.to_string(),
        }
    }

    fn local_resource(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_static_paths_only() {
        let assets = StaticAssets::new("https://cdn.example.org/c1/");
        assert_eq!(assets.expand("/static/dnd-test-image.png"), "https://cdn.example.org/c1/dnd-test-image.png");
        assert_eq!(assets.expand("http://example.org/a.png"), "http://example.org/a.png");
        assert_eq!(assets.expand(""), "");
    }

    #[test]
    fn test_local_resource() {
        let assets = StaticAssets::new("/static");
        assert_eq!(assets.local_resource("public/img/triangle.png"), "/static/public/img/triangle.png");
    }
}
