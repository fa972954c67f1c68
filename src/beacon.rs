//! Page-analytics bootstrap for hosted consoles.
//!
//! Hosted deployments historically pasted a tracker loader into their config
//! script. It is not configuration data, so it lives here as a separate,
//! opt-in collaborator: a host that wants it renders the snippet and appends
//! it to the page itself. Nothing in `catalog` references this module.

use std::fmt::Write as _;

/// Tracker endpoint and site id for a Matomo-style analytics beacon.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalyticsBeacon {
    tracker_base_url: String,
    site_id: String,
}

impl AnalyticsBeacon {
    /// `tracker_base_url` is the directory serving `matomo.php`/`matomo.js`;
    /// a trailing slash is added when missing.
    pub fn new(tracker_base_url: &str, site_id: &str) -> Self {
        let mut base = tracker_base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Self {
            tracker_base_url: base,
            site_id: site_id.trim().to_string(),
        }
    }

    pub fn tracker_base_url(&self) -> &str {
        &self.tracker_base_url
    }

    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    /// Render the bootstrap script: queue a page view and link tracking,
    /// point the tracker at the configured endpoint, then load the tracker
    /// asynchronously.
    pub fn render_script(&self) -> String {
        let url = js_string(&self.tracker_base_url);
        let site = js_string(&self.site_id);
        let mut out = String::new();
        let _ = writeln!(out, "var _paq = window._paq = window._paq || [];");
        let _ = writeln!(out, "_paq.push(['trackPageView']);");
        let _ = writeln!(out, "_paq.push(['enableLinkTracking']);");
        let _ = writeln!(out, "(function () {{");
        let _ = writeln!(out, "  var u = {url};");
        let _ = writeln!(out, "  _paq.push(['setTrackerUrl', u + 'matomo.php']);");
        let _ = writeln!(out, "  _paq.push(['setSiteId', {site}]);");
        let _ = writeln!(
            out,
            "  var d = document, g = d.createElement('script'), s = d.getElementsByTagName('script')[0];"
        );
        let _ = writeln!(out, "  g.type = 'text/javascript';");
        let _ = writeln!(out, "  g.async = true;");
        let _ = writeln!(out, "  g.src = u + 'matomo.js';");
        let _ = writeln!(out, "  s.parentNode.insertBefore(g, s);");
        let _ = writeln!(out, "}})();");
        out
    }
}

// JSON string literals are valid JavaScript string literals.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
