use std::cell::RefCell;
use std::collections::HashSet;
use std::io;
use std::rc::Rc;

use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Cmd, Completer, Context, Editor, EventHandler, KeyCode, KeyEvent, Modifiers};
use rustyline::{Helper, Highlighter, Hinter, Validator};

use dudelang::{Environment, Error, TokenKind, interpret, parse_str, tokenize};

const HISTORY_FILE: &str = "dudelang_history.txt";
const KEYWORDS: [&str; 8] = ["var", "out", "if", "ifdude", "else", "fordude", "in", "range"];

struct DudeCompleter {
    env: Rc<RefCell<Environment>>,
}

impl DudeCompleter {
    fn new(env: Rc<RefCell<Environment>>) -> Self {
        DudeCompleter { env }
    }

    fn candidates(&self) -> HashSet<String> {
        let mut names = self.env.borrow().get_identifiers();
        names.extend(KEYWORDS.iter().map(|k| k.to_string()));
        names
    }
}

impl rustyline::completion::Completer for DudeCompleter {
    type Candidate = String;
    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        let tokens = tokenize(&line[..pos]);
        // Only complete a word the cursor is still touching.
        let prefix = tokens
            .last()
            .filter(|t| t.span.end == pos)
            .filter(|t| t.kind == TokenKind::Identifier || t.kind.is_keyword())
            .map(|t| t.text.clone());

        let mut completions: Vec<String> = match prefix {
            Some(prefix) => self
                .candidates()
                .into_iter()
                .filter_map(|id| id.strip_prefix(prefix.as_str()).map(str::to_string))
                .filter(|rest| !rest.is_empty())
                .collect(),
            None => vec![],
        };
        completions.sort();
        Ok((pos, completions))
    }
}

#[derive(Completer, Helper, Highlighter, Hinter, Validator)]
struct InputValidator {
    #[rustyline(Validator)]
    validator: DudeValidator,
    #[rustyline(Highlighter)]
    highlighter: DudeHighlighter,
    #[rustyline(Completer)]
    completer: DudeCompleter,
}

struct DudeValidator;

impl Validator for DudeValidator {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(check_brackets(ctx.input()))
    }
}

// Waits for open strings, %comments and brackets to close. A closer with
// nothing open is left for the parser, which skips it at top level.
fn check_brackets(input: &str) -> ValidationResult {
    let mut stack = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            // Strings and %comments may span lines; wait for the closing character.
            '"' | '%' => {
                if !chars.any(|(_, next)| next == c) {
                    return ValidationResult::Incomplete;
                }
            }
            '/' if chars.peek().is_some_and(|&(_, next)| next == '/') => {
                for (_, next) in chars.by_ref() {
                    if next == '\n' {
                        break;
                    }
                }
            }
            '(' | '{' => stack.push(c),
            ')' | '}' => {
                let opening = if c == ')' { '(' } else { '{' };
                match stack.pop() {
                    None => {}
                    Some(open) if open == opening => {}
                    Some(_) => {
                        return ValidationResult::Invalid(Some(format!(
                            "  - Unmatched '{}' at position {}",
                            c, i
                        )));
                    }
                }
            }
            _ => {}
        }
    }

    if stack.is_empty() {
        ValidationResult::Valid(None)
    } else {
        ValidationResult::Incomplete
    }
}

struct DudeHighlighter;

impl Highlighter for DudeHighlighter {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> std::borrow::Cow<'l, str> {
        let mut stack: Vec<(char, usize)> = Vec::new();
        let mut highlighted = String::new();
        let mut in_string = false;
        // Byte offsets of the characters on either side of the cursor
        let near_cursor = |i: usize| i + 1 == pos || i == pos;

        for (i, c) in line.char_indices() {
            if in_string || c == '"' {
                if c == '"' {
                    in_string = !in_string;
                }
                highlighted.push_str(&format!("\x1b[32m{}\x1b[0m", c)); // Green for strings
                continue;
            }

            match c {
                '(' | '{' => {
                    stack.push((c, highlighted.len()));
                    highlighted.push(c);
                }
                ')' | '}' => {
                    let opening = if c == ')' { '(' } else { '{' };
                    if let Some((open, matching_pos)) = stack.pop() {
                        if open == opening {
                            if near_cursor(i) {
                                highlighted.push_str(&format!("\x1b[34m{}\x1b[0m", c)); // Blue for matching brackets
                                highlighted.replace_range(
                                    matching_pos..=matching_pos,
                                    &format!("\x1b[1;34m{}\x1b[0m", open),
                                );
                            } else {
                                highlighted.push(c);
                            }
                        } else {
                            highlighted.push_str(&format!("\x1b[31m{}\x1b[0m", c)); // Red for mismatched brackets
                            highlighted.replace_range(
                                matching_pos..=matching_pos,
                                &format!("\x1b[1;31m{}\x1b[0m", open),
                            );
                        }
                    } else {
                        highlighted.push_str(&format!("\x1b[31m{}\x1b[0m", c)); // Red for unmatched closing brackets
                    }
                }
                _ => highlighted.push(c),
            }
        }

        std::borrow::Cow::Owned(highlighted)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

// `:tokens <src>` and `:ast <src>` dump the front-end output instead of running.
fn run_command(command: &str, rest: &str) -> bool {
    match command {
        ":tokens" => {
            for token in tokenize(rest) {
                println!("{:?} {:?} [{}]", token.kind, token.text, token.span);
            }
            true
        }
        ":ast" => {
            match parse_str(rest) {
                Ok(program) => program.iter().for_each(|stmt| println!("{}", stmt)),
                Err(e) => {
                    if e.pretty_print("REPL", rest).is_err() {
                        eprintln!("{}", e);
                    }
                }
            }
            true
        }
        _ => false,
    }
}

fn main() -> rustyline::Result<()> {
    println!("dudelang REPL v0.1.0");
    println!("Type 'exit' or press Ctrl-D to quit.");

    let global_env = Environment::new();
    let h = InputValidator {
        highlighter: DudeHighlighter,
        validator: DudeValidator,
        completer: DudeCompleter::new(global_env.clone()),
    };
    let config = rustyline::config::Config::builder()
        .edit_mode(rustyline::EditMode::Vi)
        .build();
    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(h));
    rl.bind_sequence(
        KeyEvent(KeyCode::Char('s'), Modifiers::CTRL),
        EventHandler::Simple(Cmd::Newline),
    );
    if rl.load_history(HISTORY_FILE).is_err() {
        println!("No previous history.");
    }

    loop {
        let readline = rl.readline("dude> ");
        match readline {
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                let trimmed_input = line.trim();
                if trimmed_input.is_empty() {
                    continue;
                }
                if trimmed_input.eq_ignore_ascii_case("exit") {
                    break;
                }
                let (command, rest) = trimmed_input
                    .split_once(char::is_whitespace)
                    .unwrap_or((trimmed_input, ""));
                if run_command(command, rest) {
                    continue;
                }

                // Statements run in the session's global scope, so declarations persist.
                let result = parse_str(trimmed_input)
                    .map_err(Error::from)
                    .and_then(|program| {
                        interpret(&program, global_env.clone(), &mut io::stdout())
                            .map_err(Error::from)
                    });
                if let Err(e) = result {
                    if e.pretty_print("REPL", trimmed_input).is_err() {
                        eprintln!("Error: {}", e);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C
                println!("Interrupted. Type 'exit' or Ctrl-D to quit.");
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D
                println!("\nExiting.");
                break;
            }
            Err(err) => {
                eprintln!("Readline Error: {:?}", err);
                break;
            }
        }
    }
    rl.save_history(HISTORY_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validator_waits_for_closers() {
        assert!(matches!(check_brackets("{ out->1"), ValidationResult::Incomplete));
        assert!(matches!(check_brackets("var(x="), ValidationResult::Incomplete));
        assert!(matches!(check_brackets("out->\"open"), ValidationResult::Incomplete));
        assert!(matches!(check_brackets("% still a comment"), ValidationResult::Incomplete));
        assert!(matches!(check_brackets("{ out->1 }"), ValidationResult::Valid(None)));
        assert!(matches!(check_brackets("out->\"}\" // {"), ValidationResult::Valid(None)));
    }

    #[test]
    fn test_validator_accepts_stray_closers_at_top_level() {
        assert!(matches!(check_brackets(")"), ValidationResult::Valid(None)));
        assert!(matches!(check_brackets("} out->1"), ValidationResult::Valid(None)));
        assert!(matches!(check_brackets("{ } }"), ValidationResult::Valid(None)));
        assert!(matches!(check_brackets("} {"), ValidationResult::Incomplete));
    }

    #[test]
    fn test_validator_rejects_mismatched_closers() {
        assert!(matches!(check_brackets("{ )"), ValidationResult::Invalid(Some(_))));
        assert!(matches!(check_brackets("var(x=1}"), ValidationResult::Invalid(Some(_))));
    }
}
