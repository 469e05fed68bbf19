use crate::browser::config::SessionConfig;
use crate::error::{AgentError, Result};
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

/// JavaScript run after each navigation to paper over the most common
/// automation fingerprints. Best-effort; failures are ignored.
const STEALTH_JS: &str = r#"
    Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
    Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
    Object.defineProperty(navigator, 'hardwareConcurrency', { get: () => 8 });
    window.chrome = window.chrome || { runtime: {} };
"#;

/// Browser session managing a single Chrome/Chromium instance and one tab.
///
/// A session is an exclusively-owned resource for the duration of one plan
/// execution. Dropping it closes the browser, so teardown happens on every
/// exit path.
pub struct BrowserSession {
    /// The underlying headless_chrome Browser instance
    _browser: Browser,

    /// The single tab all operations run against
    tab: Arc<Tab>,
}

impl BrowserSession {
    /// Launch a new browser instance with the given session config
    pub fn launch(config: &SessionConfig) -> Result<Self> {
        let mut launch_opts = LaunchOptions::default();

        // Suppress the automation banner and the usual detection flags
        launch_opts
            .ignore_default_args
            .push(OsStr::new("--enable-automation"));
        launch_opts
            .args
            .push(OsStr::new("--disable-blink-features=AutomationControlled"));
        launch_opts.args.push(OsStr::new("--disable-infobars"));
        launch_opts.args.push(OsStr::new("--no-first-run"));

        // Keep the session alive across slow page loads (default is 30s)
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = config.headless;
        launch_opts.window_size = Some((config.window_width, config.window_height));

        if let Some(path) = &config.chrome_path {
            launch_opts.path = Some(path.clone());
        }

        if let Some(dir) = &config.user_data_dir {
            launch_opts.user_data_dir = Some(dir.clone());
        }

        let browser =
            Browser::new(launch_opts).map_err(|e| AgentError::LaunchFailed(e.to_string()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| AgentError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        if let Some(ua) = config.pick_user_agent() {
            log::debug!("Session user agent: {}", ua);
            tab.set_user_agent(ua, Some(&config.accept_language), Some(&config.platform))
                .map_err(|e| {
                    AgentError::LaunchFailed(format!("Failed to set user agent: {}", e))
                })?;
        }

        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    /// Get the session's tab
    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    /// Navigate to a URL and wait until the DOM is ready
    pub fn navigate(&self, url: &str) -> Result<()> {
        self.tab.navigate_to(url).map_err(|e| {
            AgentError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e))
        })?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| AgentError::NavigationFailed(format!("Navigation timeout: {}", e)))?;

        // Re-apply fingerprint patches on the new document
        let _ = self.tab.evaluate(STEALTH_JS, false);

        Ok(())
    }

    /// Wait for an element to be present, bounded by `timeout`
    pub fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map_err(|e| {
                AgentError::ElementNotFound(format!(
                    "'{}' not found within {:?}: {}",
                    selector, timeout, e
                ))
            })?;
        Ok(())
    }

    /// Click the first element matching a selector
    pub fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .tab
            .find_element(selector)
            .map_err(|e| AgentError::ElementNotFound(format!("'{}' not found: {}", selector, e)))?;

        element.click().map_err(|e| AgentError::StepFailed {
            action: "click".to_string(),
            reason: e.to_string(),
        })?;

        Ok(())
    }

    /// Clear an input element and type text into it
    pub fn fill(&self, selector: &str, text: &str) -> Result<()> {
        let element = self
            .tab
            .find_element(selector)
            .map_err(|e| AgentError::ElementNotFound(format!("'{}' not found: {}", selector, e)))?;

        // Focus, clear any prefilled value, then type
        element.click().map_err(|e| AgentError::StepFailed {
            action: "fill".to_string(),
            reason: e.to_string(),
        })?;

        let js_sel = selector.replace('\'', "\\'");
        let _ = self.tab.evaluate(
            &format!("(document.querySelector('{}') || {{}}).value = ''", js_sel),
            false,
        );

        self.tab
            .type_str(text)
            .map_err(|e| AgentError::StepFailed {
                action: "fill".to_string(),
                reason: e.to_string(),
            })?;

        Ok(())
    }

    /// Focus an element and press Enter (keyboard-submit fallback)
    pub fn press_enter_in(&self, selector: &str) -> Result<()> {
        let element = self
            .tab
            .find_element(selector)
            .map_err(|e| AgentError::ElementNotFound(format!("'{}' not found: {}", selector, e)))?;

        element.click().map_err(|e| AgentError::StepFailed {
            action: "submit".to_string(),
            reason: e.to_string(),
        })?;

        self.tab
            .press_key("Enter")
            .map_err(|e| AgentError::StepFailed {
                action: "submit".to_string(),
                reason: e.to_string(),
            })?;

        Ok(())
    }

    /// Scroll the page down by `delta_y` pixels
    pub fn scroll_by(&self, delta_y: i64) -> Result<()> {
        self.tab
            .evaluate(&format!("window.scrollBy(0, {})", delta_y), false)
            .map_err(|e| AgentError::EvalFailed(format!("Scroll failed: {}", e)))?;
        Ok(())
    }

    /// Get the full page markup
    pub fn content(&self) -> Result<String> {
        self.tab
            .get_content()
            .map_err(|e| AgentError::EvalFailed(format!("Failed to read page content: {}", e)))
    }

    /// Evaluate a JavaScript expression and return its string value
    pub fn eval_string(&self, expression: &str) -> Result<String> {
        let result = self
            .tab
            .evaluate(expression, false)
            .map_err(|e| AgentError::EvalFailed(e.to_string()))?;

        let value = result
            .value
            .ok_or_else(|| AgentError::EvalFailed("No value returned from script".to_string()))?;

        serde_json::from_value(value)
            .map_err(|e| AgentError::EvalFailed(format!("Script did not return a string: {}", e)))
    }

    /// Count elements matching a CSS selector
    pub fn count_elements(&self, selector: &str) -> Result<u64> {
        let js_sel = selector.replace('\'', "\\'");
        let result = self
            .tab
            .evaluate(
                &format!("document.querySelectorAll('{}').length", js_sel),
                false,
            )
            .map_err(|e| AgentError::EvalFailed(e.to_string()))?;

        Ok(result.value.and_then(|v| v.as_u64()).unwrap_or(0))
    }

    /// Capture a full-page PNG screenshot
    pub fn screenshot(&self) -> Result<Vec<u8>> {
        self.tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| AgentError::EvalFailed(format!("Screenshot failed: {}", e)))
    }

    /// Current page URL
    pub fn url(&self) -> String {
        self.tab.get_url()
    }

    /// Current page title, empty if unavailable
    pub fn title(&self) -> String {
        self.tab.get_title().unwrap_or_default()
    }
}
