//! Log output setup
//!
//! Verbosity comes from the command line. Some dependencies log notices we
//! never want to see (the HTML parser reports every quirk of the site's
//! markup); a [`DiagnosticPolicy`] names those targets and turns them off in
//! the subscriber's filter instead of patching any global output.

use crate::config::LoggingConfig;
use tracing_subscriber::filter::{Directive, EnvFilter};

/// Log targets to silence regardless of verbosity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticPolicy {
    suppressed: Vec<String>,
}

impl DiagnosticPolicy {
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut suppressed: Vec<String> = Vec::new();
        for target in targets {
            let target = target.into().trim().to_string();
            if !target.is_empty() && !suppressed.contains(&target) {
                suppressed.push(target);
            }
        }
        Self { suppressed }
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        Self::new(config.suppress.iter().cloned())
    }

    pub fn suppressed(&self) -> &[String] {
        &self.suppressed
    }

    /// One `<target>=off` directive per silenced target
    ///
    /// Targets that are not valid directive syntax are logged and ignored.
    pub fn directives(&self) -> Vec<Directive> {
        self.suppressed
            .iter()
            .filter_map(|target| match format!("{}=off", target).parse::<Directive>() {
                Ok(directive) => Some(directive),
                Err(e) => {
                    eprintln!("Ignoring log target '{}': {}", target, e);
                    None
                }
            })
            .collect()
    }

    /// Adds this policy's directives to `filter`
    pub fn apply(&self, filter: EnvFilter) -> EnvFilter {
        self.directives()
            .into_iter()
            .fold(filter, |filter, directive| filter.add_directive(directive))
    }
}

/// Base filter for a verbosity level
pub fn verbosity_filter(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "commentary_harvest=info,warn",
        1 => "commentary_harvest=debug,info",
        2 => "commentary_harvest=trace,debug",
        _ => "trace",
    }
}

/// Installs the global tracing subscriber
pub fn setup_logging(verbose: u8, quiet: bool, policy: &DiagnosticPolicy) {
    let filter = policy.apply(EnvFilter::new(verbosity_filter(verbose, quiet)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
