//! Splits a SQL script blob into individually executable statements.
//!
//! Migration assets are plain `.sql` text containing multiple statements,
//! `--` and `/* */` comments, and both quoting styles. SQLite's `execute`
//! wants one statement at a time, so scripts are split here before execution.

/// Split a script into trimmed, non-empty statements.
///
/// Single left-to-right scan with four mutually exclusive modes: single-quote
/// literal, double-quote identifier, line comment, block comment. A `;` seen
/// outside all four terminates the current statement. Comment text is not
/// copied into the output. A doubled quote inside its own quote mode (`''` or
/// `""`) is an escape, not a mode exit.
pub fn split_statements(script: &str) -> Vec<String> {
    let chars: Vec<char> = script.chars().collect();
    let mut out: Vec<String> = Vec::new();
    let mut buf = String::new();

    let mut i = 0;
    let mut in_single = false;
    let mut in_double = false;
    let mut in_line_comment = false;
    let mut in_block_comment = false;

    let peek = |i: usize, offset: usize| -> char {
        chars.get(i + offset).copied().unwrap_or('\0')
    };

    while i < chars.len() {
        let c = chars[i];

        if !in_single && !in_double {
            if !in_block_comment && !in_line_comment && c == '-' && peek(i, 1) == '-' {
                in_line_comment = true;
                i += 2;
                continue;
            }
            if !in_block_comment && !in_line_comment && c == '/' && peek(i, 1) == '*' {
                in_block_comment = true;
                i += 2;
                continue;
            }
            if in_line_comment {
                // A `/*` inside a line comment is just text; the line comment
                // consumes everything up to the newline.
                if c == '\n' || c == '\r' {
                    in_line_comment = false;
                }
                i += 1;
                continue;
            }
            if in_block_comment {
                if c == '*' && peek(i, 1) == '/' {
                    in_block_comment = false;
                    i += 2;
                    continue;
                }
                i += 1;
                continue;
            }
        }

        // quotes
        if !in_double && c == '\'' {
            if in_single {
                if peek(i, 1) == '\'' {
                    buf.push_str("''");
                    i += 2;
                    continue;
                }
                in_single = false;
            } else {
                in_single = true;
            }
            buf.push(c);
            i += 1;
            continue;
        }

        if !in_single && c == '"' {
            if in_double {
                if peek(i, 1) == '"' {
                    buf.push_str("\"\"");
                    i += 2;
                    continue;
                }
                in_double = false;
            } else {
                in_double = true;
            }
            buf.push(c);
            i += 1;
            continue;
        }

        if !in_single && !in_double && c == ';' {
            flush(&mut out, &mut buf);
            i += 1;
            continue;
        }

        buf.push(c);
        i += 1;
    }

    // Anything left after the final terminator is a statement of its own.
    flush(&mut out, &mut buf);

    out
}

fn flush(out: &mut Vec<String>, buf: &mut String) {
    let stmt = buf.trim();
    if !stmt.is_empty() {
        out.push(stmt.to_owned());
    }
    buf.clear();
}
