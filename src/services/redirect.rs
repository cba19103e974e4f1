use reqwest::Url;

/// Post-login redirect allow-list. Fails closed.
#[derive(Debug, Clone, Default)]
pub struct RedirectValidator {
    allowed_hosts: Vec<String>,
}

impl RedirectValidator {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed_hosts = hosts
            .into_iter()
            .map(|h| h.as_ref().trim().to_lowercase())
            .filter(|h| !h.is_empty())
            .collect();

        Self { allowed_hosts }
    }

    pub fn is_allowed(&self, url: Option<&str>) -> bool {
        let Some(raw) = url.map(str::trim).filter(|s| !s.is_empty()) else {
            return false;
        };

        let Ok(parsed) = Url::parse(raw) else {
            return false;
        };

        if !matches!(parsed.scheme(), "http" | "https") {
            return false;
        }

        match parsed.host_str() {
            Some(host) if !host.is_empty() => {
                let host = host.to_lowercase();
                self.allowed_hosts.iter().any(|allowed| *allowed == host)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> RedirectValidator {
        RedirectValidator::new(["localhost", " Dev.AiMinder.click ", ""])
    }

    #[test]
    fn test_allowed_hosts() {
        let v = validator();
        assert!(v.is_allowed(Some("http://localhost:3000/cb")));
        assert!(v.is_allowed(Some("https://dev.aiminder.click/home?tab=1")));
        assert!(v.is_allowed(Some("HTTPS://DEV.AIMINDER.CLICK")));
    }

    #[test]
    fn test_rejected_targets() {
        let v = validator();
        assert!(!v.is_allowed(Some("https://evil.com")));
        assert!(!v.is_allowed(None));
        assert!(!v.is_allowed(Some("")));
        assert!(!v.is_allowed(Some("   ")));
        assert!(!v.is_allowed(Some("javascript:alert(1)")));
        assert!(!v.is_allowed(Some("ftp://localhost/file")));
        assert!(!v.is_allowed(Some("/relative/path")));
        assert!(!v.is_allowed(Some("http://localhost.evil.com")));
    }

    #[test]
    fn test_empty_allow_list_rejects_everything() {
        let v = RedirectValidator::new(Vec::<String>::new());
        assert!(!v.is_allowed(Some("http://localhost:3000")));
    }
}
