//! One render pass: parse, bind, expand, render.
//!
//! The stages run strictly in sequence. Cancellation and the deadline are
//! checked before each stage; a failed pass returns only the error, never
//! a partial prompt.

use crate::binder;
use crate::cancel::CancelToken;
use crate::config::Config;
use crate::error::Result;
use crate::expand;
use crate::parser;
use crate::render::{self, RenderedPrompt};
use std::path::PathBuf;
use tracing::{debug, info};

/// Runs render passes with a fixed configuration.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
    base_dir: PathBuf,
}

impl Pipeline {
    /// A pipeline resolving data sources against the configured `base_dir`,
    /// or the current directory.
    pub fn new(config: Config) -> Self {
        let base_dir = config.resolve_base_dir(None);
        Self { config, base_dir }
    }

    /// Override the directory data sources resolve against.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn base_dir(&self) -> &std::path::Path {
        &self.base_dir
    }

    /// Render `source` to a prompt.
    ///
    /// # Errors
    ///
    /// Any parse, bind or expand error; see [`crate::error::PomlError`].
    ///
    /// # Example
    ///
    /// ```
    /// use poml::config::Config;
    /// use poml::pipeline::Pipeline;
    ///
    /// let prompt = Pipeline::new(Config::default())
    ///     .run("<poml><role>Support agent</role><task>Say hi.</task></poml>")
    ///     .unwrap();
    /// assert_eq!(prompt.as_text(), Some("Support agent\n\nSay hi."));
    /// ```
    pub fn run(&self, source: &str) -> Result<RenderedPrompt> {
        self.run_with(source, &CancelToken::new())
    }

    /// Like [`Pipeline::run`], stopping at the next stage boundary once
    /// `cancel` fires or its deadline passes.
    pub fn run_with(&self, source: &str, cancel: &CancelToken) -> Result<RenderedPrompt> {
        info!(
            base_dir = %self.base_dir.display(),
            has_deadline = cancel.deadline().is_some(),
            "render pass started"
        );

        cancel.check("parse")?;
        let document = parser::parse(source, &self.config.parse_options())?;

        cancel.check("bind")?;
        let bindings = binder::bind_with_cancel(
            &document,
            &self.base_dir,
            self.config.duplicate_binding,
            cancel,
        )?;
        debug!(bindings = bindings.len(), "stage bind finished");

        cancel.check("expand")?;
        let expanded = expand::expand(&document, &bindings)?;

        cancel.check("render")?;
        let prompt = render::render(&expanded, self.config.output_mode);

        info!(mode = ?self.config.output_mode, "render pass finished");
        Ok(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DuplicateBindingPolicy, OutputMode};
    use crate::error::PomlError;
    use crate::render::MessageRole;
    use crate::test_support::{DataDir, SUPPORT_CSV, SUPPORT_MARKUP};
    use std::time::Instant;

    fn pipeline(data: &DataDir, mode: OutputMode) -> Pipeline {
        let config = Config {
            output_mode: mode,
            ..Config::default()
        };
        Pipeline::new(config).with_base_dir(data.path())
    }

    #[test]
    fn test_support_scenario_string_mode() {
        let data = DataDir::new();
        data.write("h.csv", SUPPORT_CSV);

        let prompt = pipeline(&data, OutputMode::Text).run(SUPPORT_MARKUP).unwrap();
        let text = prompt.as_text().unwrap();

        assert_eq!(text, "Support agent\n\nbillingshipping");
        let role = text.find("Support agent").unwrap();
        let task = text.find("billingshipping").unwrap();
        assert!(role < task);
    }

    #[test]
    fn test_support_scenario_messages_mode() {
        let data = DataDir::new();
        data.write("h.csv", SUPPORT_CSV);

        let prompt = pipeline(&data, OutputMode::Messages).run(SUPPORT_MARKUP).unwrap();
        let messages = prompt.messages().unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[0].content, "Support agent");
        assert_eq!(messages[1].role, MessageRole::User);
        assert_eq!(messages[1].content, "billingshipping");
    }

    #[test]
    fn test_failure_returns_no_prompt() {
        let data = DataDir::new();
        let err = pipeline(&data, OutputMode::Text).run(SUPPORT_MARKUP).unwrap_err();
        assert!(matches!(err, PomlError::DataSourceNotFound { .. }));
    }

    #[test]
    fn test_config_policy_reaches_binder() {
        let data = DataDir::new();
        data.write("a.txt", "one");
        data.write("b.txt", "two");
        let markup = r#"<poml><data src="a.txt" format="text" name="n"/><data src="b.txt" format="text" name="n"/><task>{{n}}</task></poml>"#;

        let strict = pipeline(&data, OutputMode::Text);
        assert!(matches!(
            strict.run(markup),
            Err(PomlError::DuplicateBinding { .. })
        ));

        let config = Config {
            duplicate_binding: DuplicateBindingPolicy::Overwrite,
            ..Config::default()
        };
        let lenient = Pipeline::new(config).with_base_dir(data.path());
        assert_eq!(lenient.run(markup).unwrap().as_text(), Some("two"));
    }

    #[test]
    fn test_cancelled_before_parse() {
        let data = DataDir::new();
        let token = CancelToken::new();
        token.cancel();

        let err = pipeline(&data, OutputMode::Text)
            .run_with(SUPPORT_MARKUP, &token)
            .unwrap_err();
        assert!(matches!(err, PomlError::Cancelled { stage: "parse" }));
    }

    #[test]
    fn test_expired_deadline() {
        let data = DataDir::new();
        let token = CancelToken::with_deadline(Instant::now());

        let err = pipeline(&data, OutputMode::Text)
            .run_with("<poml><task>x</task></poml>", &token)
            .unwrap_err();
        assert!(matches!(err, PomlError::DeadlineExceeded { stage: "parse" }));
    }

    #[test]
    fn test_new_uses_configured_base_dir() {
        let config = Config {
            base_dir: Some(PathBuf::from("prompts")),
            ..Config::default()
        };
        assert_eq!(Pipeline::new(config).base_dir(), std::path::Path::new("prompts"));
    }
}
