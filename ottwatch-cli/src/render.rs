//! Renderers for the terminal and for JSON output.

use std::io::Write;

use ottwatch_search::{DateWindow, ReleaseItem, ReleaseRenderer, Section};
use serde_json::{Map, Value, json};

/// Writes each section as a plain-text block.
///
/// Write errors are logged and otherwise ignored; a closed pipe must not turn
/// into a failed run.
pub struct TerminalRenderer<W: Write> {
    out: W,
    imdb_base_url: String,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, imdb_base_url: impl Into<String>) -> Self {
        Self {
            out,
            imdb_base_url: imdb_base_url.into(),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn heading(&mut self, section: &Section) -> std::io::Result<()> {
        writeln!(
            self.out,
            "\n== {} {} releases on {} ==",
            section.language, section.media_type, section.platform
        )
    }

    fn write_releases(
        &mut self,
        section: &Section,
        releases: &[ReleaseItem],
    ) -> std::io::Result<()> {
        self.heading(section)?;

        if releases.is_empty() {
            return writeln!(
                self.out,
                "  No {} {} found on {} for the specified period.",
                section.language, section.media_type, section.platform
            );
        }

        for release in releases {
            writeln!(self.out, "  {}", release.display_title())?;

            let date = release
                .effective_date()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "unknown".to_string());
            write!(
                self.out,
                "    Release Date: {date} | TMDB Rating: {:.1}/10",
                release.vote_average
            )?;

            match &release.imdb_id {
                Some(imdb_id) => writeln!(self.out, " | IMDb: {}{imdb_id}", self.imdb_base_url)?,
                None => writeln!(self.out)?,
            }
        }
        Ok(())
    }
}

impl<W: Write> ReleaseRenderer for TerminalRenderer<W> {
    fn render_releases(&mut self, section: &Section, _window: &DateWindow, releases: &[ReleaseItem]) {
        if let Err(e) = self.write_releases(section, releases) {
            tracing::warn!(section = %section.key(), error = %e, "Failed to write releases");
        }
    }

    fn render_section_error(&mut self, section: &Section, message: &str) {
        let result = self
            .heading(section)
            .and_then(|()| writeln!(self.out, "  ! {message}"));
        if let Err(e) = result {
            tracing::warn!(section = %section.key(), error = %e, "Failed to write section error");
        }
    }

    fn render_global_error(&mut self, message: &str) {
        if let Err(e) = writeln!(self.out, "Error: {message}") {
            tracing::warn!(error = %e, "Failed to write error");
        }
    }
}

/// Collects the run into one JSON document keyed by section.
#[derive(Debug, Default)]
pub struct JsonRenderer {
    sections: Map<String, Value>,
    error: Option<String>,
}

impl JsonRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_value(self) -> Value {
        json!({
            "sections": Value::Object(self.sections),
            "error": self.error,
        })
    }
}

impl ReleaseRenderer for JsonRenderer {
    fn render_releases(&mut self, section: &Section, window: &DateWindow, releases: &[ReleaseItem]) {
        self.sections.insert(
            section.key(),
            json!({
                "window": window,
                "releases": releases,
            }),
        );
    }

    fn render_section_error(&mut self, section: &Section, message: &str) {
        self.sections
            .insert(section.key(), json!({ "error": message }));
    }

    fn render_global_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }
}
