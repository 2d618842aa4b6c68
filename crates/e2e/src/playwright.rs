//! Playwright + axe-core scanner
//!
//! Each scan generates a small Node script that opens the target in a fresh
//! browser context, runs `@axe-core/playwright` and prints the results as JSON
//! on stdout.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use clap::ValueEnum;
use serde_json::Value;
use tokio::process::Command as TokioCommand;
use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::scanner::Scanner;
use crate::spec::PageTarget;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Page navigation and selector wait timeout
    pub navigation_timeout_ms: u64,

    /// Upper bound for one whole scan, browser start-up included
    pub scan_timeout: Duration,

    /// `node_modules` holding `playwright` and `@axe-core/playwright`,
    /// exported to the script as `NODE_PATH`
    pub node_modules: Option<PathBuf>,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            navigation_timeout_ms: 30_000,
            scan_timeout: Duration::from_secs(120),
            node_modules: Some(PathBuf::from("node_modules")),
        }
    }
}

/// [`Scanner`] backed by a Node.js Playwright process per page
pub struct PlaywrightScanner {
    config: PlaywrightConfig,
}

impl PlaywrightScanner {
    /// Create a scanner, verifying that Playwright is installed
    pub fn new(config: PlaywrightConfig) -> E2eResult<Self> {
        Self::check_playwright_installed()?;
        Ok(Self { config })
    }

    /// Check if Playwright is installed
    fn check_playwright_installed() -> E2eResult<()> {
        let output = Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    /// Build the Node script that scans one target
    pub fn build_script(&self, target: &PageTarget) -> E2eResult<String> {
        let mut script = String::new();

        script.push_str(&format!(
            r#"
const {{ chromium, firefox, webkit }} = require('playwright');
const {{ AxeBuilder }} = require('@axe-core/playwright');

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}
  }});
  const page = await context.newPage();

  try {{
    await page.goto({url}, {{ waitUntil: 'load', timeout: {timeout} }});
"#,
            browser = self.config.browser.as_str(),
            headless = self.config.headless,
            width = self.config.viewport_width,
            height = self.config.viewport_height,
            url = js_literal(&target.url)?,
            timeout = self.config.navigation_timeout_ms,
        ));

        if let Some(selector) = &target.wait_for_selector {
            script.push_str(&format!(
                "    await page.waitForSelector({}, {{ timeout: {} }});\n",
                js_literal(selector)?,
                self.config.navigation_timeout_ms
            ));
        }

        script.push_str("    let builder = new AxeBuilder({ page });\n");
        if !target.axe_tags.is_empty() {
            script.push_str(&format!(
                "    builder = builder.withTags({});\n",
                serde_json::to_string(&target.axe_tags)?
            ));
        }
        for selector in &target.include {
            script.push_str(&format!("    builder = builder.include({});\n", js_literal(selector)?));
        }
        for selector in &target.exclude {
            script.push_str(&format!("    builder = builder.exclude({});\n", js_literal(selector)?));
        }

        script.push_str(
            r#"    const results = await builder.analyze();
    process.stdout.write(JSON.stringify(results));
  } catch (error) {
    console.error(JSON.stringify({ success: false, error: error.message }));
    process.exitCode = 1;
  } finally {
    await browser.close();
  }
})();
"#,
        );

        Ok(script)
    }

    /// Execute a scan script and return its stdout
    async fn run_script(&self, target: &PageTarget, script: &str) -> E2eResult<String> {
        // Write script to temp file
        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("scan.js");
        std::fs::write(&script_path, script)?;

        debug!("Running axe scan script: {}", script_path.display());

        let mut command = TokioCommand::new("node");
        command.arg(&script_path).kill_on_drop(true);
        if let Some(node_modules) = &self.config.node_modules {
            let node_modules = std::fs::canonicalize(node_modules).unwrap_or_else(|_| node_modules.clone());
            command.env("NODE_PATH", node_modules);
        }

        let output = tokio::time::timeout(self.config.scan_timeout, command.output())
            .await
            .map_err(|_| E2eError::Timeout(format!("axe scan of {}", target.url)))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(E2eError::ScanFailed {
                target: target.name.clone(),
                reason: script_error(&stderr),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl Scanner for PlaywrightScanner {
    async fn scan(&self, target: &PageTarget) -> E2eResult<Value> {
        let script = self.build_script(target)?;
        let stdout = self.run_script(target, &script).await?;

        serde_json::from_str(stdout.trim()).map_err(|e| E2eError::ScanFailed {
            target: target.name.clone(),
            reason: format!("unreadable scan output: {}", e),
        })
    }
}

/// Quote a string as a JavaScript literal
fn js_literal(value: &str) -> E2eResult<String> {
    Ok(serde_json::to_string(value)?)
}

/// Pull the error message out of the script's stderr
fn script_error(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .find_map(|line| {
            serde_json::from_str::<Value>(line.trim())
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| stderr.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner(config: PlaywrightConfig) -> PlaywrightScanner {
        PlaywrightScanner { config }
    }

    #[test]
    fn test_build_script_for_target() {
        let mut target = PageTarget::new("inventory", "https://www.saucedemo.com/inventory.html");
        target.wait_for_selector = Some("[data-test=\"inventory-list\"]".to_string());
        target.include = vec!["#inventory_container".to_string()];
        target.exclude = vec![".footer".to_string()];

        let script = scanner(PlaywrightConfig {
            browser: Browser::Firefox,
            viewport_width: 1920,
            ..Default::default()
        })
        .build_script(&target)
        .unwrap();

        assert!(script.contains("await firefox.launch({ headless: true })"));
        assert!(script.contains("width: 1920"));
        assert!(script.contains("page.goto(\"https://www.saucedemo.com/inventory.html\""));
        assert!(script.contains("page.waitForSelector(\"[data-test=\\\"inventory-list\\\"]\""));
        assert!(script.contains("withTags([\"wcag2a\",\"wcag2aa\",\"wcag21aa\"])"));
        assert!(script.contains("builder.include(\"#inventory_container\")"));
        assert!(script.contains("builder.exclude(\".footer\")"));
    }

    #[test]
    fn test_script_quotes_hostile_urls() {
        let target = PageTarget::new("x", "https://example.test/'); process.exit(0); ('");
        let script = scanner(PlaywrightConfig::default()).build_script(&target).unwrap();
        assert!(script.contains("page.goto(\"https://example.test/'); process.exit(0); ('\""));
        assert!(!script.contains("waitForSelector"));
    }

    #[test]
    fn test_script_error_prefers_reported_message() {
        let stderr = "some warning\n{\"success\":false,\"error\":\"net::ERR_NAME_NOT_RESOLVED\"}\n";
        assert_eq!(script_error(stderr), "net::ERR_NAME_NOT_RESOLVED");
        assert_eq!(script_error("  segfault \n"), "segfault");
    }

    #[test]
    fn test_browser_names() {
        assert_eq!(<Browser as ValueEnum>::from_str("webkit", false), Ok(Browser::Webkit));
        assert_eq!(<Browser as ValueEnum>::from_str("Firefox", true), Ok(Browser::Firefox));
        assert!(<Browser as ValueEnum>::from_str("edge", true).is_err());
        for browser in Browser::value_variants() {
            let name = browser.to_possible_value().unwrap();
            assert_eq!(name.get_name(), browser.as_str());
        }
    }
}
