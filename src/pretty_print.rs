use crate::{EnvError, EvalError, ParseError};
use ariadne::{Config, IndexType, Label, Report, ReportKind, Source};
use std::io::{self, Write};
use std::ops::Range;

// Spans hold byte offsets, ariadne counts chars unless told otherwise.
fn report_config() -> Config {
    Config::default().with_index_type(IndexType::Byte)
}

// Range of the last character, used for errors reported at the end of the input.
fn end_of_input(input: &str) -> Range<usize> {
    let start = input.char_indices().next_back().map_or(0, |(i, _)| i);
    start..input.len()
}

impl EvalError {
    /// Writes an annotated report of this error to stderr. `name` labels the
    /// source (a file name, or "REPL").
    pub fn pretty_print(&self, name: &str, input: &str) -> io::Result<()> {
        self.write_report(name, input, report_config(), io::stderr())
    }

    fn write_report<W: Write>(
        &self,
        name: &str,
        input: &str,
        config: Config,
        mut w: W,
    ) -> io::Result<()> {
        let report = match self {
            EvalError::EnvError(env_error) => match env_error {
                EnvError::UndefinedVariable(symbol, span) => {
                    Report::build(ReportKind::Error, (name, span.to_range()))
                        .with_message(format!("Undefined variable `{}`", symbol))
                        .with_label(
                            Label::new((name, span.to_range()))
                                .with_message("This variable is not defined in the current scope"),
                        )
                }
            },
            EvalError::TypeMismatch {
                operator,
                expected,
                found,
                span,
            } => Report::build(ReportKind::Error, (name, span.to_range()))
                .with_message(format!("Type mismatch: '{}' expects {}", operator, expected))
                .with_label(Label::new((name, span.to_range())).with_message(format!(
                    "This is a {} ({})",
                    found.type_name(),
                    found
                ))),
            EvalError::Output(message) => {
                return writeln!(w, "Error: could not write output: {}", message);
            }
        };
        report
            .with_config(config)
            .finish()
            .write((name, Source::from(input)), w)
    }
}

impl ParseError {
    /// Writes an annotated report of this error to stderr.
    pub fn pretty_print(&self, name: &str, input: &str) -> io::Result<()> {
        self.write_report(name, input, report_config(), io::stderr())
    }

    fn write_report<W: Write>(&self, name: &str, input: &str, config: Config, w: W) -> io::Result<()> {
        let report = match self {
            ParseError::UnexpectedToken { found, expected } => {
                Report::build(ReportKind::Error, (name, found.span.to_range()))
                    .with_message(format!("Unexpected token: {}", found.kind))
                    .with_label(
                        Label::new((name, found.span.to_range()))
                            .with_message(format!("Expected {expected}")),
                    )
            }
            ParseError::UnexpectedEof(expected) => {
                let range = end_of_input(input);
                Report::build(ReportKind::Error, (name, range.clone()))
                    .with_message("Unexpected end of input")
                    .with_label(Label::new((name, range)).with_message(format!("Expected {expected}")))
            }
            ParseError::InvalidNumber { text, span } => {
                Report::build(ReportKind::Error, (name, span.to_range()))
                    .with_message(format!("Invalid number `{}`", text))
                    .with_label(
                        Label::new((name, span.to_range()))
                            .with_message("Numbers must fit in a signed 64-bit integer"),
                    )
            }
            ParseError::TooDeep { span } => Report::build(ReportKind::Error, (name, span.to_range()))
                .with_message("Blocks nested too deeply")
                .with_label(Label::new((name, span.to_range())).with_message(format!(
                    "This block is more than {} levels deep",
                    crate::parser::MAX_NESTING
                ))),
        };
        report
            .with_config(config)
            .finish()
            .write((name, Source::from(input)), w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_str, run};

    fn parse_report(input: &str) -> String {
        let err = parse_str(input).unwrap_err();
        let mut out = Vec::new();
        err.write_report("test.dude", input, report_config().with_color(false), &mut out)
            .expect("Writing to a Vec should not fail");
        String::from_utf8(out).expect("Report should be utf-8")
    }

    fn eval_report(input: &str) -> String {
        let err = match run(input, &mut Vec::new()) {
            Err(crate::Error::Eval(err)) => err,
            other => panic!("Expected an evaluation error for '{}', got {:?}", input, other),
        };
        let mut out = Vec::new();
        err.write_report("test.dude", input, report_config().with_color(false), &mut out)
            .expect("Writing to a Vec should not fail");
        String::from_utf8(out).expect("Report should be utf-8")
    }

    #[test]
    fn test_end_of_input_is_a_char_boundary() {
        assert_eq!(end_of_input(""), 0..0);
        assert_eq!(end_of_input("var(x=1"), 6..7);
        assert_eq!(end_of_input("☕"), 0..3);
        let input = "out->\"☕\" var(x=☕";
        let range = end_of_input(input);
        assert!(input.is_char_boundary(range.start));
        assert_eq!(&input[range], "☕");
    }

    #[test]
    fn test_reports_keep_labels_after_multibyte_text() {
        let report = parse_report("out->\"☕☕☕\" if x = 1 {}");
        assert!(report.contains("Unexpected token"), "{}", report);
        assert!(report.contains("Expected a comparison operator"), "{}", report);

        let report = parse_report("out->\"☕\" var(x=☕");
        assert!(report.contains("Expected ')' to close the declaration"), "{}", report);

        let report = eval_report("var(note=\"☕☕\") if note > 1 { }");
        assert!(report.contains("This is a string (☕☕)"), "{}", report);
    }

    #[test]
    fn test_too_deep_report() {
        let report = parse_report(&"{".repeat(300));
        assert!(report.contains("Blocks nested too deeply"), "{}", report);
        assert!(report.contains("more than 256 levels deep"), "{}", report);
    }
}
