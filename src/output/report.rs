use std::fs;
use std::path::Path;

use crate::config::{Credentials, Options};
use crate::error::ReportError;
use crate::probe::CheckResult;
use crate::sites::Site;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Origin answered directly with no WAF in between
    Exposed,
    /// Origin address answered, but as a WAF edge
    Shielded,
    Unreachable,
}

impl Verdict {
    pub fn of(result: &CheckResult) -> Self {
        if result.exposed() {
            Verdict::Exposed
        } else if result.reachable {
            Verdict::Shielded
        } else {
            Verdict::Unreachable
        }
    }

    pub fn marker(&self) -> &str {
        match self {
            Verdict::Exposed => "[!]",
            Verdict::Shielded => "[~]",
            Verdict::Unreachable => "[+]",
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Verdict::Exposed => "EXPOSED",
            Verdict::Shielded => "SHIELDED",
            Verdict::Unreachable => "UNREACHABLE",
        }
    }
}

/// Everything one run produced: the site list and, unless list-only, the checks.
#[derive(Debug, Clone)]
pub struct OriginReport<'a> {
    pub sites: &'a [Site],
    pub results: Option<&'a [CheckResult]>,
}

impl<'a> OriginReport<'a> {
    pub fn new(sites: &'a [Site], results: Option<&'a [CheckResult]>) -> Self {
        Self { sites, results }
    }

    /// (exposed, shielded, unreachable)
    pub fn counts(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for r in self.results.unwrap_or(&[]) {
            match Verdict::of(r) {
                Verdict::Exposed => counts.0 += 1,
                Verdict::Shielded => counts.1 += 1,
                Verdict::Unreachable => counts.2 += 1,
            }
        }
        counts
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        lines.push(format!("[*] Protected sites: {}", self.sites.len()));
        for (i, site) in self.sites.iter().enumerate() {
            lines.push(format!("   {:>3}. {}", i + 1, describe_site(site)));
        }

        if let Some(results) = self.results {
            lines.push(String::new());
            lines.push("[*] Direct origin checks:".to_string());
            for result in results {
                lines.push(format!("   {}", describe_result(result)));
            }
        }

        lines.push(String::new());
        lines.push(self.summary_line());
        lines
    }

    pub fn summary_line(&self) -> String {
        match self.results {
            None => format!("[=] {} sites listed (origin checks skipped)", self.sites.len()),
            Some(_) => {
                let (exposed, shielded, unreachable) = self.counts();
                format!(
                    "[=] {} sites listed: {} exposed, {} shielded, {} unreachable",
                    self.sites.len(),
                    exposed,
                    shielded,
                    unreachable
                )
            }
        }
    }

    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(60));
        for line in self.lines() {
            println!("{}", line);
        }
        println!("{}\n", "=".repeat(60));
    }

    /// Writes the plain text report. Only `.txt` paths are accepted.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ReportError> {
        let is_txt = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|e| e.eq_ignore_ascii_case("txt"))
            .unwrap_or(false);
        if !is_txt {
            return Err(ReportError::Extension(path.to_path_buf()));
        }

        fs::write(path, self.format_text_report())
            .map_err(|source| ReportError::Io { path: path.to_path_buf(), source })
    }

    fn format_text_report(&self) -> String {
        let mut report = String::new();
        report.push_str("WAF ORIGIN CHECK REPORT\n");
        report.push_str(&"=".repeat(60));
        report.push('\n');
        for line in self.lines() {
            report.push_str(&line);
            report.push('\n');
        }
        report
    }
}

/// Lines shown before the API call: credentials (verbose only) and options.
pub fn header_lines(credentials: &Credentials, options: &Options) -> Vec<String> {
    let mut lines = Vec::new();
    if options.verbose {
        lines.push("[*] Credentials:".to_string());
        lines.push(format!("   API_ENDPOINT: {}", credentials.endpoint));
        lines.push(format!("   API_ID:       {}", credentials.api_id));
        lines.push(format!("   API_KEY:      {}", credentials.masked_key()));
        lines.push(format!("   ACCOUNT_ID:   {}", credentials.account_id));
    }
    lines.push(format!("[*] Options: {}", options));
    lines
}

fn describe_site(site: &Site) -> String {
    let mut out = site.label();
    if let Some(id) = site.id() {
        out.push_str(&format!("  id={}", id));
    }
    if let Some(status) = site.status() {
        out.push_str(&format!("  status={}", status));
    }
    let origins = site.origins();
    if origins.is_empty() {
        out.push_str("  origins=-");
    } else {
        out.push_str(&format!("  origins={}", origins.join(", ")));
    }
    out
}

fn describe_result(result: &CheckResult) -> String {
    let verdict = Verdict::of(result);
    let head = format!("{} {:<11} {}", verdict.marker(), verdict.label(), result.site.label());
    match verdict {
        Verdict::Exposed | Verdict::Shielded => {
            let mut line = format!(
                "{} -> {} via {} answered HTTP {} in {}ms",
                head,
                result.url.as_deref().unwrap_or("-"),
                result.origin.as_deref().unwrap_or("-"),
                result.status.map(|s| s.to_string()).unwrap_or_else(|| "-".into()),
                result.response_ms.unwrap_or(0)
            );
            if let Some(waf) = &result.waf {
                line.push_str(&format!(" ({} edge)", waf));
            }
            line
        }
        Verdict::Unreachable => format!("{}: {}", head, result.error.as_deref().unwrap_or("no response")),
    }
}
