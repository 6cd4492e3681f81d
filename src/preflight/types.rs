//! Check results and the grouped preflight report.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    /// Packaging would fail.
    Fail,
    /// Packaging can proceed but the result may be degraded.
    Warn,
}

impl CheckStatus {
    fn marker(self) -> &'static str {
        match self {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        }
    }
}

/// Outcome of one check, e.g. `npm` found at `/usr/bin/npm`.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub details: Option<String>,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, details: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            status,
            details: details.map(str::to_string),
        }
    }

    pub fn pass(name: &str) -> Self {
        Self::new(name, CheckStatus::Pass, None)
    }

    pub fn pass_with(name: &str, details: &str) -> Self {
        Self::new(name, CheckStatus::Pass, Some(details))
    }

    pub fn warn(name: &str, details: &str) -> Self {
        Self::new(name, CheckStatus::Warn, Some(details))
    }

    pub fn fail(name: &str, details: &str) -> Self {
        Self::new(name, CheckStatus::Fail, Some(details))
    }

    fn line(&self) -> String {
        match &self.details {
            Some(details) => format!("{} {}: {}", self.status.marker(), self.name, details),
            None => format!("{} {}", self.status.marker(), self.name),
        }
    }
}

/// Checks grouped under the area they cover (project, host tools, ...).
#[derive(Debug, Default)]
pub struct PreflightReport {
    sections: Vec<(&'static str, Vec<CheckResult>)>,
}

impl PreflightReport {
    pub fn add_section(&mut self, title: &'static str, checks: Vec<CheckResult>) {
        self.sections.push((title, checks));
    }

    pub fn checks(&self) -> impl Iterator<Item = &CheckResult> {
        self.sections.iter().flat_map(|(_, checks)| checks)
    }

    fn tally(&self, status: CheckStatus) -> usize {
        self.checks().filter(|c| c.status == status).count()
    }

    /// Warnings never fail the report.
    pub fn all_passed(&self) -> bool {
        self.fail_count() == 0
    }

    pub fn fail_count(&self) -> usize {
        self.tally(CheckStatus::Fail)
    }

    pub fn warn_count(&self) -> usize {
        self.tally(CheckStatus::Warn)
    }

    /// One-line tally, e.g. `7 passed, 1 warning, 0 failed`.
    pub fn summary(&self) -> String {
        let warnings = self.warn_count();
        format!(
            "{} passed, {} warning{}, {} failed",
            self.tally(CheckStatus::Pass),
            warnings,
            if warnings == 1 { "" } else { "s" },
            self.fail_count()
        )
    }

    pub fn print(&self) {
        println!("=== Preflight ===");
        for (title, checks) in &self.sections {
            println!("\n{}:", title);
            for check in checks {
                println!("  {}", check.line());
            }
        }
        println!("\n{}\n", self.summary());
    }
}
