//! HTML card template.

use super::format::{format_date, format_stat};
use super::stats::GitHubStats;

/// Element id the rendered card is anchored on.
pub const STATS_ANCHOR_ID: &str = "stats";

const DEFAULT_BLUEPRINT: &str = include_str!("../../assets/blueprint.html");

/// HTML template with `$PLACEHOLDER$` markers for every statistic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blueprint {
    html: String,
}

impl Blueprint {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    /// Fill the template. Each placeholder is replaced once (first occurrence).
    ///
    /// The template is scanned once, left to right; inserted values are never
    /// searched for placeholders again.
    pub fn fill(&self, stats: &GitHubStats) -> String {
        let joined = format!("Joined on {}", format_date(&stats.join_date));
        let mut fields = vec![
            ("$AVATAR$", escape_html(&stats.avatar_url)),
            ("$FULLNAME$", escape_html(&stats.fullname)),
            ("$USERNAME$", escape_html(&stats.username)),
            ("$DATE_JOINED$", joined),
            ("$COMMITS$", format_stat(stats.commits)),
            ("$STARS$", format_stat(stats.stars)),
            ("$FOLLOWERS$", format_stat(stats.followers)),
            ("$PULL_REQUESTS$", format_stat(stats.pull_requests)),
            ("$ISSUES$", format_stat(stats.issues)),
            ("$REPOS$", format_stat(stats.repos)),
        ];

        let mut page = String::with_capacity(self.html.len());
        let mut rest = self.html.as_str();
        while let Some(at) = rest.find('$') {
            page.push_str(&rest[..at]);
            rest = &rest[at..];
            match fields.iter().position(|(marker, _)| rest.starts_with(marker)) {
                Some(i) => {
                    let (marker, value) = fields.swap_remove(i);
                    page.push_str(&value);
                    rest = &rest[marker.len()..];
                }
                None => {
                    page.push('$');
                    rest = &rest[1..];
                }
            }
        }
        page.push_str(rest);
        page
    }
}

impl Default for Blueprint {
    fn default() -> Self {
        Self::new(DEFAULT_BLUEPRINT)
    }
}

/// Does the page contain the element the card is anchored on?
pub fn has_stats_anchor(html: &str) -> bool {
    html.contains(&format!("id=\"{STATS_ANCHOR_ID}\""))
        || html.contains(&format!("id='{STATS_ANCHOR_ID}'"))
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn stats() -> GitHubStats {
        GitHubStats {
            avatar_url: "https://avatars.example/u/583231".to_string(),
            fullname: "The <Octocat>".to_string(),
            username: "octocat".to_string(),
            join_date: Utc.with_ymd_and_hms(2011, 1, 25, 18, 44, 36).unwrap(),
            commits: 1_590,
            stars: 12,
            followers: 21_345,
            pull_requests: 0,
            issues: 7,
            repos: 8,
        }
    }

    #[test]
    fn default_blueprint_is_fully_filled() {
        let page = Blueprint::default().fill(&stats());
        assert!(!page.contains('$'), "unfilled marker left in page");
        assert!(has_stats_anchor(&page));
        assert!(page.contains("Joined on January 25, 2011"));
        assert!(page.contains("1.59k"));
        assert!(page.contains("21.3k"));
        assert!(page.contains("The &lt;Octocat&gt;"));
    }

    #[test]
    fn replaces_first_occurrence_only() {
        let page = Blueprint::new("$REPOS$ / $REPOS$").fill(&stats());
        assert_eq!(page, "8 / $REPOS$");
    }

    #[test]
    fn inserted_values_are_not_filled_again() {
        let mut stats = stats();
        stats.fullname = "$COMMITS$ fan".to_string();

        let page = Blueprint::new("<b>$FULLNAME$</b><i>$COMMITS$</i>").fill(&stats);
        assert_eq!(page, "<b>$COMMITS$ fan</b><i>1.59k</i>");

        let page = Blueprint::default().fill(&stats);
        assert!(page.contains("$COMMITS$ fan"));
        assert!(page.contains("1.59k"));
    }

    #[test]
    fn lone_dollar_signs_are_kept() {
        let page = Blueprint::new("$ $$REPOS$ $").fill(&stats());
        assert_eq!(page, "$ $8 $");
    }

    #[test]
    fn detects_missing_anchor() {
        assert!(!has_stats_anchor("<div id=\"card\"></div>"));
        assert!(has_stats_anchor("<div id='stats'></div>"));
    }
}
