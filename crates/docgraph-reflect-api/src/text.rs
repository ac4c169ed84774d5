//! Docstring text helpers shared by providers and the core.

/// Clean up indentation of a docstring
///
/// Tabs are expanded, leading whitespace is removed from the first line and
/// the common indentation of the remaining lines is removed from each of
/// them. Blank lines at the start and end are dropped.
pub fn cleandoc(doc: &str) -> String {
    let expanded = expand_tabs(doc, 8);
    let lines: Vec<&str> = expanded.split('\n').collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter_map(|line| {
            let content = line.trim_start();
            if content.is_empty() {
                None
            } else {
                Some(line.chars().count() - content.chars().count())
            }
        })
        .min();

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    cleaned.push(lines[0].trim_start().to_string());
    for line in &lines[1..] {
        match margin {
            Some(margin) => cleaned.push(line.chars().skip(margin).collect()),
            None => cleaned.push(String::new()),
        }
    }

    while cleaned.last().map_or(false, |line| line.is_empty()) {
        cleaned.pop();
    }
    let leading = cleaned.iter().take_while(|line| line.is_empty()).count();

    cleaned[leading..].join("\n")
}

/// Expand tab characters to the next multiple of `tabsize` columns
pub fn expand_tabs(text: &str, tabsize: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut column = 0;

    for ch in text.chars() {
        match ch {
            '\t' => {
                let pad = tabsize - column % tabsize;
                out.extend(std::iter::repeat(' ').take(pad));
                column += pad;
            }
            '\n' | '\r' => {
                out.push(ch);
                column = 0;
            }
            _ => {
                out.push(ch);
                column += 1;
            }
        }
    }

    out
}

/// Decode the value of a single Python string literal from its source text
///
/// Returns `None` for byte strings, f-strings and malformed literals.
pub fn decode_string_literal(literal: &str) -> Option<String> {
    let quote_at = literal.find(|c| c == '\'' || c == '"')?;
    let prefix = literal[..quote_at].to_ascii_lowercase();
    if prefix.contains('f') || prefix.contains('b') {
        return None;
    }
    if !prefix.chars().all(|c| c == 'r' || c == 'u') {
        return None;
    }
    let raw = prefix.contains('r');

    let quoted = &literal[quote_at..];
    let quote_len = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
        3
    } else {
        1
    };
    let delimiter = &quoted[..quote_len];
    if quoted.len() < quote_len * 2 || !quoted.ends_with(delimiter) {
        return None;
    }
    let body = &quoted[quote_len..quoted.len() - quote_len];

    if raw {
        Some(body.to_string())
    } else {
        Some(unescape(body))
    }
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let Some(escaped) = chars.next() else {
            out.push('\\');
            break;
        };
        match escaped {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{0b}'),
            '0'..='7' => {
                let mut digits = escaped.to_string();
                while digits.len() < 3 {
                    match chars.peek() {
                        Some(next @ '0'..='7') => {
                            digits.push(*next);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                push_code_point(&mut out, &digits, 8, escaped);
            }
            'x' | 'u' | 'U' => {
                let width = match escaped {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = chars.by_ref().take(width).collect();
                if digits.len() == width && digits.chars().all(|c| c.is_ascii_hexdigit()) {
                    push_code_point(&mut out, &digits, 16, escaped);
                } else {
                    out.push('\\');
                    out.push(escaped);
                    out.push_str(&digits);
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    out
}

fn push_code_point(out: &mut String, digits: &str, radix: u32, escaped: char) {
    match u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
    {
        Some(decoded) => out.push(decoded),
        None => {
            out.push('\\');
            if radix == 16 {
                out.push(escaped);
            }
            out.push_str(digits);
        }
    }
}
