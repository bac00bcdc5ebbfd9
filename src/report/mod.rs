use crate::classifier::{render, render_wrapped, Classification};
use crate::config::{OutputFormat, OutputSettings};
use crate::error::Result;
use colored::*;
use serde::Serialize;

pub const PUBLIC_LABEL: &str = "Python standard library";
pub const HIDDEN_LABEL: &str = "Python hidden standard library";
pub const KEYWORDS_LABEL: &str = "Python keywords";
pub const BUILTINS_LABEL: &str = "Python builtins";

/// A labelled group of names in a report.
struct Section<'a> {
    label: &'a str,
    names: Vec<&'a str>,
}

impl<'a> Section<'a> {
    fn new<I>(label: &'a str, names: I) -> Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        Self {
            label,
            names: names.into_iter().map(String::as_str).collect(),
        }
    }
}

/// Formats the result of a scan.
pub fn format_classification(result: &Classification, settings: &OutputSettings) -> Result<String> {
    match settings.format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        format => Ok(format_sections(
            &[
                Section::new(PUBLIC_LABEL, &result.public),
                Section::new(HIDDEN_LABEL, &result.hidden),
            ],
            format,
            settings,
        )),
    }
}

#[derive(Serialize)]
struct KeywordListing<'a> {
    keywords: &'a [String],
    builtins: &'a [String],
}

/// Formats the keyword and builtin listing.
///
/// Keywords keep the interpreter's order in JSON; the text forms are sorted
/// like every other name set.
pub fn format_keywords(
    keywords: &[String],
    builtins: &[String],
    settings: &OutputSettings,
) -> Result<String> {
    match settings.format {
        OutputFormat::Json => {
            let listing = KeywordListing { keywords, builtins };
            Ok(serde_json::to_string_pretty(&listing)?)
        }
        format => Ok(format_sections(
            &[
                Section::new(KEYWORDS_LABEL, keywords),
                Section::new(BUILTINS_LABEL, builtins),
            ],
            format,
            settings,
        )),
    }
}

fn format_sections(
    sections: &[Section<'_>],
    format: OutputFormat,
    settings: &OutputSettings,
) -> String {
    let blocks: Vec<String> = sections
        .iter()
        .map(|section| match format {
            OutputFormat::Text => {
                let label = if settings.color {
                    section.label.bold().cyan().to_string()
                } else {
                    section.label.to_string()
                };
                format!("{}: {}", label, render(&section.names))
            }
            _ => format!(
                "**{}**\n\n```\n{}\n```",
                section.label,
                render_wrapped(&section.names, settings.wrap_width)
            ),
        })
        .collect();

    let separator = if format == OutputFormat::Text { "\n" } else { "\n\n" };
    blocks.join(separator)
}
