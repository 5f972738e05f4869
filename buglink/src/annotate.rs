//! Changelog annotation: rewrite bug-ID references into hyperlinks
//!
//! One annotation pass covers one changelog entry. The pass is
//! fail-open end to end: a pattern that will not compile disables
//! annotation for the entry, a failed summary lookup disables tooltips
//! but still links, and a match without a parseable ID is handled per
//! the configured fallback policy. Nothing here ever aborts the
//! surrounding build pipeline.

use std::collections::BTreeSet;

use crate::config::{FallbackPolicy, TrackerConfig};
use crate::markup::MarkupText;
use crate::pattern::{compile_pattern, id_from_match};
use crate::session::Session;

/// One-entry changelog annotator
///
/// Holds only borrowed, read-only state; passes over different entries
/// are independent and may run concurrently against the same session.
pub struct Annotator<'a> {
    config: &'a TrackerConfig,
    session: Option<&'a Session>,
}

impl<'a> Annotator<'a> {
    /// An annotator over the given configuration.
    ///
    /// The session is only consulted when tooltips are enabled; pass
    /// `None` to force plain links.
    pub fn new(config: &'a TrackerConfig, session: Option<&'a Session>) -> Self {
        Self { config, session }
    }

    /// Annotate one changelog entry's text.
    ///
    /// Every pattern match that yields a bug ID is wrapped in an anchor
    /// to `{base_url}/show_bug.cgi?id={id}`, with the bug summary as a
    /// tooltip when tooltips are enabled and the lookup succeeded. Text
    /// outside matches comes through untouched.
    pub async fn annotate(&self, text: &str) -> String {
        let regex = match compile_pattern(&self.config.id_pattern) {
            Ok(regex) => regex,
            Err(e) => {
                tracing::warn!("cannot compile bug ID pattern, skipping annotation: {e}");
                return text.to_string();
            }
        };

        let summaries = if self.config.use_tooltips {
            let ids: BTreeSet<u64> = regex
                .captures_iter(text)
                .filter_map(|caps| id_from_match(&caps))
                .collect();
            match self.session {
                Some(session) if !ids.is_empty() => session.bug_summaries(&ids).await,
                _ => None,
            }
        } else {
            None
        };

        let mut markup = MarkupText::new(text);
        for caps in regex.captures_iter(text) {
            let Some(matched) = caps.get(0) else { continue };
            match id_from_match(&caps) {
                Some(id) => {
                    let href = format!("{}/show_bug.cgi?id={}", self.config.base_url, id);
                    let open = match summaries.as_ref().and_then(|map| map.get(&id)) {
                        Some(summary) => format!("<a href='{href}' tooltip='{summary}'>"),
                        None => format!("<a href='{href}'>"),
                    };
                    markup.wrap(matched.range(), open, "</a>".to_string());
                }
                None => match self.config.fallback {
                    FallbackPolicy::LinkRaw => {
                        let open = format!(
                            "<a href='{}/show_bug.cgi?id={}'>",
                            self.config.base_url,
                            matched.as_str()
                        );
                        markup.wrap(matched.range(), open, "</a>".to_string());
                    }
                    FallbackPolicy::Skip => {
                        tracing::trace!(token = matched.as_str(), "no bug ID in match, skipping");
                    }
                },
            }
        }
        markup.render()
    }
}
