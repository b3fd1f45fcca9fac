use ::url::Url;

/// Returns the site identity of a host: lowercase, without a leading `www.`
///
/// # Examples
///
/// ```
/// use sumi_sift::url::site_key;
///
/// assert_eq!(site_key("WWW.Example.com"), "example.com");
/// assert_eq!(site_key("blog.example.com"), "blog.example.com");
/// ```
pub fn site_key(host: &str) -> String {
    let host = host.to_lowercase();
    match host.strip_prefix("www.") {
        Some(bare) => bare.to_string(),
        None => host,
    }
}

/// Checks whether two URLs belong to the same site
///
/// Hosts are compared through [`site_key`], so `www.example.com` and
/// `example.com` match while other subdomains do not. Ports must agree.
pub fn is_same_site(a: &Url, b: &Url) -> bool {
    match (a.host_str(), b.host_str()) {
        (Some(ha), Some(hb)) => {
            site_key(ha) == site_key(hb) && a.port_or_known_default() == b.port_or_known_default()
        }
        _ => false,
    }
}

/// Key under which per-host state (circuit, pacing) is tracked
pub fn host_key(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host.to_lowercase(), port),
        (Some(host), None) => host.to_lowercase(),
        _ => String::new(),
    }
}
