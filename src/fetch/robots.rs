use std::collections::HashMap;
use std::sync::Mutex;

use reqwest::Client;
use url::Url;

/// Minimal robots.txt handling: only `User-agent` groups and `Disallow`
/// prefixes are honored. An unreachable or malformed robots.txt allows
/// everything, matching how the scrapers treated these signals originally.
#[derive(Debug, Clone, Default)]
pub struct RobotsRules {
    disallow: Vec<String>,
}

impl RobotsRules {
    pub fn parse(body: &str, agent_token: &str) -> Self {
        let agent_token = agent_token.to_lowercase();
        let mut disallow = Vec::new();
        let mut group_applies = false;
        let mut in_agent_lines = false;

        for line in body.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let Some((field, value)) = line.split_once(':') else { continue };
            let field = field.trim().to_lowercase();
            let value = value.trim();

            match field.as_str() {
                "user-agent" => {
                    // A run of consecutive User-agent lines opens a new group.
                    if !in_agent_lines {
                        group_applies = false;
                    }
                    in_agent_lines = true;
                    let ua = value.to_lowercase();
                    if ua == "*" || ua.contains(&agent_token) {
                        group_applies = true;
                    }
                }
                "disallow" => {
                    in_agent_lines = false;
                    if group_applies && !value.is_empty() {
                        disallow.push(value.to_string());
                    }
                }
                _ => {
                    in_agent_lines = false;
                }
            }
        }

        Self { disallow }
    }

    pub fn allows(&self, path: &str) -> bool {
        !self.disallow.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }
}

/// Per-host cache of parsed rules; robots.txt is fetched at most once per
/// host per process.
pub struct RobotsCache {
    agent_token: String,
    rules: Mutex<HashMap<String, RobotsRules>>,
}

impl RobotsCache {
    pub fn new(agent_token: impl Into<String>) -> Self {
        Self {
            agent_token: agent_token.into(),
            rules: Mutex::new(HashMap::new()),
        }
    }

    pub async fn allows(&self, client: &Client, url: &Url) -> bool {
        let Some(host) = url.host_str().map(|h| h.to_string()) else { return true };

        let cached = self.rules.lock().expect("robots mutex poisoned").get(&host).cloned();
        let rules = match cached {
            Some(rules) => rules,
            None => {
                let rules = self.fetch_rules(client, url).await;
                self.rules
                    .lock()
                    .expect("robots mutex poisoned")
                    .insert(host, rules.clone());
                rules
            }
        };

        rules.allows(url.path())
    }

    async fn fetch_rules(&self, client: &Client, url: &Url) -> RobotsRules {
        let mut robots_url = url.clone();
        robots_url.set_path("/robots.txt");
        robots_url.set_query(None);

        match client.get(robots_url.as_str()).send().await {
            Ok(resp) if resp.status().is_success() => match resp.text().await {
                Ok(body) => RobotsRules::parse(&body, &self.agent_token),
                Err(_) => RobotsRules::default(),
            },
            _ => RobotsRules::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "\
# municipal site
User-agent: *
Disallow: /admin/
Disallow: /internal

User-agent: badbot
Disallow: /
";

    #[test]
    fn disallowed_prefix_blocks() {
        let rules = RobotsRules::parse(BODY, "civic-ingest");
        assert!(!rules.allows("/admin/meetings"));
        assert!(!rules.allows("/internal"));
    }

    #[test]
    fn other_paths_pass() {
        let rules = RobotsRules::parse(BODY, "civic-ingest");
        assert!(rules.allows("/meetings/2025"));
        assert!(rules.allows("/"));
    }

    #[test]
    fn other_agent_group_ignored() {
        let rules = RobotsRules::parse(BODY, "civic-ingest");
        // The badbot group's blanket Disallow must not apply to us.
        assert!(rules.allows("/meetings"));
    }

    #[test]
    fn agent_specific_group_applies() {
        let body = "User-agent: civic-ingest\nDisallow: /agendas/\n";
        let rules = RobotsRules::parse(body, "civic-ingest");
        assert!(!rules.allows("/agendas/2025-01.pdf"));
        assert!(rules.allows("/minutes/"));
    }

    #[test]
    fn empty_rules_allow_everything() {
        let rules = RobotsRules::default();
        assert!(rules.allows("/anything"));
    }
}
