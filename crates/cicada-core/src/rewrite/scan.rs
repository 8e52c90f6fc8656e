//! Lexical scanner locating module specifiers in ES module source.
//!
//! This is deliberately not a parser: it has to cope with syntax the
//! translator in front of it may not understand. Comments, string literals
//! and template literals are skipped so keywords inside them are ignored.
//! Regular expression literals are not recognised; a quote inside one can
//! confuse the scanner.

/// Which statement form a specifier was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierKind {
    /// `import x from "m"`, `import { a, b } from "m"`, `import * as ns from "m"`.
    Import,
    /// `import "m"`.
    SideEffect,
    /// `export { a } from "m"`, `export * from "m"`.
    ExportFrom,
    /// `import("m")` with a literal argument.
    Dynamic,
}

/// Byte range of a specifier's text, excluding its quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecifierSpan {
    pub kind: SpecifierKind,
    pub start: usize,
    pub end: usize,
    pub quote: u8,
}

impl SpecifierSpan {
    /// The specifier text within `source`.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Find every import/export specifier in `source`, in order of appearance.
#[must_use]
pub fn scan_specifiers(source: &str) -> Vec<SpecifierSpan> {
    let b = source.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < b.len() {
        match b[i] {
            b'/' if b.get(i + 1) == Some(&b'/') => i = skip_line_comment(b, i),
            b'/' if b.get(i + 1) == Some(&b'*') => i = skip_block_comment(b, i),
            b'\'' | b'"' => i = skip_string(b, i),
            b'`' => i = skip_template(b, i),
            c if is_ident_start(c) => {
                let end = word_end(b, i);
                let member_access = i > 0 && b[i - 1] == b'.';
                let word = &b[i..end];
                let found = if member_access {
                    None
                } else if word == b"import" {
                    scan_import(b, end)
                } else if word == b"export" {
                    scan_clause(b, end, SpecifierKind::ExportFrom)
                } else {
                    None
                };
                match found {
                    Some(span) => {
                        spans.push(span);
                        i = span.end + 1;
                    }
                    None => i = end,
                }
            }
            _ => i += 1,
        }
    }

    spans
}

/// After the `import` keyword.
fn scan_import(b: &[u8], pos: usize) -> Option<SpecifierSpan> {
    let j = skip_trivia(b, pos);
    match b.get(j)? {
        b'\'' | b'"' => literal(b, j, SpecifierKind::SideEffect),
        b'(' => {
            let k = skip_trivia(b, j + 1);
            let span = literal(b, k, SpecifierKind::Dynamic)?;
            let after = skip_trivia(b, span.end + 1);
            matches!(b.get(after), Some(b')' | b',')).then_some(span)
        }
        b'.' => None,
        _ => scan_clause(b, pos, SpecifierKind::Import),
    }
}

/// Walk an import/export clause up to `from "<spec>"`.
///
/// Only identifiers, `*`, `,`, braces and trivia may appear before `from`;
/// anything else means this is not an import/export-from statement.
fn scan_clause(b: &[u8], pos: usize, kind: SpecifierKind) -> Option<SpecifierSpan> {
    let mut depth = 0u32;
    let mut i = pos;

    loop {
        i = skip_trivia(b, i);
        let c = *b.get(i)?;
        match c {
            b'{' => {
                if depth > 0 {
                    return None;
                }
                depth += 1;
                i += 1;
            }
            b'}' => {
                if depth == 0 {
                    return None;
                }
                depth -= 1;
                i += 1;
            }
            b'*' | b',' => i += 1,
            // String export names: `export { "a-b" as c } from "m"`
            b'\'' | b'"' if depth > 0 => i = skip_string(b, i),
            c if is_ident_start(c) => {
                let end = word_end(b, i);
                if depth == 0 && &b[i..end] == b"from" {
                    let j = skip_trivia(b, end);
                    if matches!(b.get(j), Some(b'\'' | b'"')) {
                        return literal(b, j, kind);
                    }
                }
                i = end;
            }
            _ => return None,
        }
    }
}

/// Parse a single-line string literal starting at `pos`.
fn literal(b: &[u8], pos: usize, kind: SpecifierKind) -> Option<SpecifierSpan> {
    let quote = *b.get(pos)?;
    if quote != b'\'' && quote != b'"' {
        return None;
    }
    let mut i = pos + 1;
    while i < b.len() {
        match b[i] {
            b'\\' => i += 2,
            b'\n' => return None,
            c if c == quote => {
                return Some(SpecifierSpan {
                    kind,
                    start: pos + 1,
                    end: i,
                    quote,
                })
            }
            _ => i += 1,
        }
    }
    None
}

fn skip_trivia(b: &[u8], mut i: usize) -> usize {
    loop {
        match b.get(i) {
            Some(c) if c.is_ascii_whitespace() => i += 1,
            Some(b'/') if b.get(i + 1) == Some(&b'/') => i = skip_line_comment(b, i),
            Some(b'/') if b.get(i + 1) == Some(&b'*') => i = skip_block_comment(b, i),
            _ => return i,
        }
    }
}

fn skip_line_comment(b: &[u8], mut i: usize) -> usize {
    while i < b.len() && b[i] != b'\n' {
        i += 1;
    }
    i
}

fn skip_block_comment(b: &[u8], mut i: usize) -> usize {
    i += 2;
    while i + 1 < b.len() && !(b[i] == b'*' && b[i + 1] == b'/') {
        i += 1;
    }
    (i + 2).min(b.len())
}

fn skip_string(b: &[u8], pos: usize) -> usize {
    let quote = b[pos];
    let mut i = pos + 1;
    while i < b.len() {
        match b[i] {
            b'\\' => i += 2,
            // Unterminated literal: resume on the next line
            b'\n' => return i,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    b.len()
}

fn skip_template(b: &[u8], pos: usize) -> usize {
    let mut i = pos + 1;
    while i < b.len() {
        match b[i] {
            b'\\' => i += 2,
            b'`' => return i + 1,
            b'$' if b.get(i + 1) == Some(&b'{') => {
                i += 2;
                let mut depth = 1u32;
                while i < b.len() && depth > 0 {
                    match b[i] {
                        b'{' => {
                            depth += 1;
                            i += 1;
                        }
                        b'}' => {
                            depth -= 1;
                            i += 1;
                        }
                        b'\'' | b'"' => i = skip_string(b, i),
                        b'`' => i = skip_template(b, i),
                        _ => i += 1,
                    }
                }
            }
            _ => i += 1,
        }
    }
    b.len()
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'$' || c >= 0x80
}

fn word_end(b: &[u8], mut i: usize) -> usize {
    while i < b.len() && (is_ident_start(b[i]) || b[i].is_ascii_digit()) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs(source: &str) -> Vec<(SpecifierKind, &str)> {
        scan_specifiers(source)
            .into_iter()
            .map(|s| (s.kind, s.text(source)))
            .collect()
    }

    #[test]
    fn test_import_forms() {
        let source = r#"
import a from "./a";
import { b, c as d } from './b';
import * as ns from "@lib/ns";
import e, { f } from "e";
import type { T } from "./types";
import "./side-effect";
import './single';
"#;
        assert_eq!(
            specs(source),
            vec![
                (SpecifierKind::Import, "./a"),
                (SpecifierKind::Import, "./b"),
                (SpecifierKind::Import, "@lib/ns"),
                (SpecifierKind::Import, "e"),
                (SpecifierKind::Import, "./types"),
                (SpecifierKind::SideEffect, "./side-effect"),
                (SpecifierKind::SideEffect, "./single"),
            ]
        );
    }

    #[test]
    fn test_multiline_import_list() {
        let source = "import {\n    one,\n    two, // trailing\n    three,\n} from \"./numbers\";\n";
        assert_eq!(specs(source), vec![(SpecifierKind::Import, "./numbers")]);
    }

    #[test]
    fn test_export_from_forms() {
        let source = r#"
export * from "./all";
export * as ns from "./ns";
export { x, y as z } from './xy';
export { "odd-name" as odd } from "./odd";
export const value = 1;
export default function from() {}
export { local };
"#;
        assert_eq!(
            specs(source),
            vec![
                (SpecifierKind::ExportFrom, "./all"),
                (SpecifierKind::ExportFrom, "./ns"),
                (SpecifierKind::ExportFrom, "./xy"),
                (SpecifierKind::ExportFrom, "./odd"),
            ]
        );
    }

    #[test]
    fn test_dynamic_import() {
        let source = r#"const m = await import("./lazy"); const n = import(name);"#;
        assert_eq!(specs(source), vec![(SpecifierKind::Dynamic, "./lazy")]);
    }

    #[test]
    fn test_ignores_comments_and_strings() {
        let source = r#"
// import a from "./commented";
/* export * from "./block"; */
const s = "import b from './in-string'";
const t = `import c from "./in-template" ${'import d from "./in-expr"'}`;
import real from "./real";
"#;
        assert_eq!(specs(source), vec![(SpecifierKind::Import, "./real")]);
    }

    #[test]
    fn test_ignores_member_and_meta() {
        let source = r#"loader.import("./not-this"); const u = import.meta.url; obj.export;"#;
        assert!(specs(source).is_empty());
    }

    #[test]
    fn test_default_import_named_from() {
        let source = r#"import from from "./from";"#;
        assert_eq!(specs(source), vec![(SpecifierKind::Import, "./from")]);
    }

    #[test]
    fn test_ts_import_equals_is_not_an_import() {
        let source = r#"import fs = require("fs");"#;
        assert!(specs(source).is_empty());
    }

    #[test]
    fn test_span_offsets() {
        let source = "import x from 'mod';";
        let spans = scan_specifiers(source);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].quote, b'\'');
        assert_eq!(&source[spans[0].start - 1..spans[0].end + 1], "'mod'");
    }
}
