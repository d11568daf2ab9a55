//! Fancy diagnostics support using `ariadne`.
//!
//! Configuration errors carry byte spans from the lenient JSON parser; this
//! module renders them as labeled reports without the error types
//! themselves depending on a rendering backend. Only available with the
//! `diagnostics` feature.

#[cfg(feature = "diagnostics")]
use ariadne::{Color, Label, Report, ReportKind, Source};

#[cfg(feature = "diagnostics")]
use crate::config::ConfigError;

/// Prints a labeled report for `error` against the configuration `source`
/// text it came from. `name` is shown as the file name.
#[cfg(feature = "diagnostics")]
pub fn emit_config_error(name: &str, source: &str, error: &ConfigError) {
    match error {
        ConfigError::Syntax(messages) if !messages.is_empty() => {
            for message in messages {
                let report = Report::build(ReportKind::Error, (name, message.start..message.end))
                    .with_message("configuration syntax error")
                    .with_label(
                        Label::new((name, message.start..message.end))
                            .with_message(&message.message)
                            .with_color(Color::Red),
                    )
                    .finish();
                let _ = report.eprint((name, Source::from(source)));
            }
        }
        other => eprintln!("{name}: {other}"),
    }
}

#[cfg(all(test, feature = "diagnostics"))]
mod tests {
    use super::*;
    use crate::config::parse_pad_model;

    #[test]
    fn renders_syntax_and_semantic_errors() {
        let source = "{\"ArrowData\": [{]}";
        let error = parse_pad_model(source).unwrap_err();
        emit_config_error("broken.json", source, &error);

        let empty = "{\"StartingPositions\": [], \"ArrowData\": [], \
                     \"YTravelDistanceCompensation\": 0.5}";
        let error = parse_pad_model(empty).unwrap_err();
        emit_config_error("empty.json", empty, &error);
    }
}
