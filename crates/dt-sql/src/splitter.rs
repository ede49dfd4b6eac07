//! Split DDL text into statements

/// One statement's text and the 1-based line it starts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStatement {
    pub text: String,
    pub line: usize,
}

/// Lexical features that change where a statement ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitRules {
    /// A line holding only `GO` ends a batch (SQL Server)
    pub go_batches: bool,
    /// `[name]` quotes an identifier (SQL Server)
    pub bracket_identifiers: bool,
    /// `$tag$ ... $tag$` strings (Postgres)
    pub dollar_quotes: bool,
    /// `#` starts a line comment (MySQL)
    pub hash_comments: bool,
    /// `\'` escapes a quote inside a string (MySQL)
    pub backslash_escapes: bool,
}

/// Split on `;` outside quotes and comments.
///
/// Statements that are empty after removing whitespace and comments are
/// dropped. Text after the last `;` is kept as a final statement.
pub fn split_statements(text: &str, rules: SplitRules) -> Vec<RawStatement> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::new();
    let mut current = String::new();
    let mut start_line = 1;
    let mut line = 1;
    let mut has_content = false;
    // only whitespace since the last newline
    let mut line_start = true;
    let mut i = 0;

    let mut finish = |current: &mut String, has_content: &mut bool, start_line: usize| {
        if *has_content {
            out.push(RawStatement {
                text: current.trim().to_string(),
                line: start_line,
            });
        }
        current.clear();
        *has_content = false;
    };

    while i < chars.len() {
        let c = chars[i];

        if rules.go_batches && line_start && !c.is_whitespace() {
            if let Some(end) = go_line_end(&chars, i) {
                finish(&mut current, &mut has_content, start_line);
                // leave the newline to be counted below
                line_start = false;
                i = end;
                continue;
            }
        }
        line_start = c == '\n' || (line_start && c.is_whitespace());

        if !has_content && !c.is_whitespace() && !starts_comment(&chars, i, rules) {
            has_content = true;
            start_line = line;
            current.clear();
        }

        match c {
            '\n' => {
                line += 1;
                current.push(c);
                i += 1;
            }
            ';' => {
                finish(&mut current, &mut has_content, start_line);
                i += 1;
            }
            '\'' | '"' | '`' => {
                let end = quoted_end(&chars, i, c, rules.backslash_escapes);
                line += push_span(&mut current, &chars[i..end]);
                i = end;
            }
            '[' if rules.bracket_identifiers => {
                let end = quoted_end(&chars, i, ']', false);
                line += push_span(&mut current, &chars[i..end]);
                i = end;
            }
            '$' if rules.dollar_quotes => match dollar_end(&chars, i) {
                Some(end) => {
                    line += push_span(&mut current, &chars[i..end]);
                    i = end;
                }
                None => {
                    current.push(c);
                    i += 1;
                }
            },
            _ if starts_comment(&chars, i, rules) => {
                let end = comment_end(&chars, i);
                let skipped = &chars[i..end];
                line += skipped.iter().filter(|c| **c == '\n').count();
                if has_content {
                    // keep the line count inside the statement right
                    for _ in 0..skipped.iter().filter(|c| **c == '\n').count() {
                        current.push('\n');
                    }
                    current.push(' ');
                }
                i = end;
            }
            _ => {
                if has_content {
                    current.push(c);
                }
                i += 1;
            }
        }
    }
    finish(&mut current, &mut has_content, start_line);
    out
}

fn push_span(current: &mut String, span: &[char]) -> usize {
    current.extend(span.iter());
    span.iter().filter(|c| **c == '\n').count()
}

fn starts_comment(chars: &[char], i: usize, rules: SplitRules) -> bool {
    match chars[i] {
        '-' => chars.get(i + 1) == Some(&'-'),
        '/' => chars.get(i + 1) == Some(&'*'),
        '#' => rules.hash_comments,
        _ => false,
    }
}

fn comment_end(chars: &[char], i: usize) -> usize {
    if chars[i] == '/' {
        let mut j = i + 2;
        while j + 1 < chars.len() {
            if chars[j] == '*' && chars[j + 1] == '/' {
                return j + 2;
            }
            j += 1;
        }
        return chars.len();
    }
    let mut j = i;
    while j < chars.len() && chars[j] != '\n' {
        j += 1;
    }
    j
}

/// End (exclusive) of a quoted run starting at `i`; doubled closers escape
fn quoted_end(chars: &[char], i: usize, close: char, backslash: bool) -> usize {
    let mut j = i + 1;
    while j < chars.len() {
        if chars[j] == close {
            if chars.get(j + 1) == Some(&close) {
                j += 2;
                continue;
            }
            return j + 1;
        }
        if backslash && chars[j] == '\\' {
            j += 2;
            continue;
        }
        j += 1;
    }
    chars.len()
}

fn dollar_end(chars: &[char], i: usize) -> Option<usize> {
    let mut j = i + 1;
    while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '_') {
        j += 1;
    }
    if chars.get(j) != Some(&'$') {
        return None;
    }
    let tag: Vec<char> = chars[i..=j].to_vec();
    let mut k = j + 1;
    while k + tag.len() <= chars.len() {
        if chars[k..k + tag.len()] == tag[..] {
            return Some(k + tag.len());
        }
        k += 1;
    }
    Some(chars.len())
}

/// If a `GO [count]` line continues at `i`, where it ends (at the newline)
fn go_line_end(chars: &[char], i: usize) -> Option<usize> {
    let mut j = i;
    while j < chars.len() && chars[j] != '\n' && chars[j].is_whitespace() {
        j += 1;
    }
    let word: String = chars[j..].iter().take(2).collect();
    if !word.eq_ignore_ascii_case("go") {
        return None;
    }
    let mut k = j + 2;
    let rest_start = k;
    while k < chars.len() && chars[k] != '\n' {
        k += 1;
    }
    let rest: String = chars[rest_start..k].iter().collect();
    let rest = rest.trim();
    if rest.is_empty() || rest.chars().all(|c| c.is_ascii_digit()) {
        Some(k)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "splitter_test.rs"]
mod tests;
