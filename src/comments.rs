//! C3: comment classification and buffering helpers used by the parser
//! while it walks the token stream a second time (conceptually) to
//! attach comments to the AST skeleton built by C2.
//!
//! Implementation note: because every AST node's position is recorded
//! during structural parsing and token order matches construction
//! order exactly, this crate attaches comments during the same token
//! walk that builds the structure rather than re-scanning the token
//! stream from scratch. The attachment *rules* below are still
//! factored into their own, independently unit-tested functions, which
//! is the part of the design spec §4.3/§9 cares about keeping
//! testable. See DESIGN.md for the full rationale.

use crate::parser::TokenStream;
use crate::token::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PendingKind {
    Plain,
    Outer,
    Inner,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Pending {
    pub kind: PendingKind,
    pub text: String,
    /// Whether a blank source line separates this comment from the
    /// previous token (comment or structural).
    pub blank_before: bool,
}

/// Consumes whitespace/newline/comment tokens up to (not including) the
/// next structural token, classifying each comment as it goes.
/// Returns the gathered comments plus the number of newline tokens seen
/// since the last comment (used to tell "hard against the next thing"
/// apart from "separated by a blank line").
pub(crate) fn collect_until_structural(ts: &mut TokenStream) -> (Vec<Pending>, usize) {
    let mut out = Vec::new();
    let mut newline_run = 0usize;
    loop {
        match ts.peek() {
            TokenKind::Whitespace => {
                ts.bump();
            }
            TokenKind::Newline => {
                newline_run += 1;
                ts.bump();
            }
            TokenKind::Comment(text) => {
                out.push(Pending {
                    kind: PendingKind::Plain,
                    text: text.clone(),
                    blank_before: newline_run > 1,
                });
                newline_run = 0;
                ts.bump();
            }
            TokenKind::OuterDoc(text) => {
                out.push(Pending {
                    kind: PendingKind::Outer,
                    text: text.clone(),
                    blank_before: newline_run > 1,
                });
                newline_run = 0;
                ts.bump();
            }
            TokenKind::InnerDoc(text) => {
                out.push(Pending {
                    kind: PendingKind::Inner,
                    text: text.clone(),
                    blank_before: newline_run > 1,
                });
                newline_run = 0;
                ts.bump();
            }
            _ => break,
        }
    }
    (out, newline_run)
}

/// Splits off the maximal leading run of `InnerDoc` entries (rule 1/2):
/// a document's or container's leading inner-doc comments.
pub(crate) fn split_leading_inner_docs(pending: &[Pending]) -> (Vec<String>, &[Pending]) {
    let mut end = 0;
    for p in pending {
        if p.kind == PendingKind::Inner {
            end += 1;
        } else {
            break;
        }
    }
    (pending[..end].iter().map(|p| p.text.clone()).collect(), &pending[end..])
}

/// Splits off the maximal trailing run of `OuterDoc` entries with no
/// internal blank-line interruption (rule 3): the outer-doc comments
/// that attach to the upcoming `KeyValue`. Everything before the run
/// becomes that `KeyValue`'s plain leading comments.
pub(crate) fn split_trailing_outer_docs(pending: &[Pending]) -> (Vec<String>, Vec<String>) {
    let mut start = pending.len();
    while start > 0 {
        let cur = &pending[start - 1];
        if cur.kind != PendingKind::Outer {
            break;
        }
        if start < pending.len() && pending[start].blank_before {
            break;
        }
        start -= 1;
    }
    let leading = pending[..start].iter().map(|p| p.text.clone()).collect();
    let outer = pending[start..].iter().map(|p| p.text.clone()).collect();
    (leading, outer)
}

/// Result of classifying the comments trailing the last element in a
/// scope (rule 5, orphan trailing comments).
pub(crate) struct OrphanComments {
    pub leading_comments: Vec<String>,
    pub inline_comment_end: Option<String>,
}

/// A blank line before the closer demotes even an otherwise-adjacent
/// trailing comment to a plain leading comment of the end delimiter;
/// see DESIGN.md for why "on the closing line" is interpreted this way
/// (FTML comments always run to end-of-line, so a comment can never
/// share a source line with the delimiter that follows it).
pub(crate) fn classify_orphans(pending: Vec<Pending>, newlines_after_last: usize) -> OrphanComments {
    if pending.is_empty() {
        return OrphanComments { leading_comments: Vec::new(), inline_comment_end: None };
    }
    if newlines_after_last <= 1 {
        let mut texts: Vec<String> = pending.into_iter().map(|p| p.text).collect();
        let end = texts.pop();
        OrphanComments { leading_comments: texts, inline_comment_end: end }
    } else {
        OrphanComments {
            leading_comments: pending.into_iter().map(|p| p.text).collect(),
            inline_comment_end: None,
        }
    }
}

/// Same-line trailing comment immediately after an element (rule 6).
/// Does not consume a leading newline; returns `Ok(None)` if none is
/// present. Errors if a second comment-like token follows on the same
/// line (I4: at most one inline comment per node).
pub(crate) fn take_inline(
    ts: &mut TokenStream,
) -> Result<Option<String>, crate::error::ParseError> {
    let save = ts.mark();
    ts.skip_whitespace();
    let first = match ts.peek().clone() {
        TokenKind::Comment(t) | TokenKind::OuterDoc(t) | TokenKind::InnerDoc(t) => {
            ts.bump();
            Some(t)
        }
        _ => {
            ts.reset(save);
            None
        }
    };
    let Some(first) = first else {
        return Ok(None);
    };
    let save2 = ts.mark();
    ts.skip_whitespace();
    if matches!(
        ts.peek(),
        TokenKind::Comment(_) | TokenKind::OuterDoc(_) | TokenKind::InnerDoc(_)
    ) {
        return Err(crate::error::ParseError::MultipleInlineComments { pos: ts.peek_pos() });
    }
    ts.reset(save2);
    Ok(Some(first))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn pendings_for(src: &str) -> Vec<Pending> {
        let tokens = tokenize(src).unwrap();
        let mut ts = TokenStream::new(&tokens);
        collect_until_structural(&mut ts).0
    }

    #[test]
    fn leading_inner_doc_split() {
        let pending = pendings_for("//! a\n//! b\n// c\nkey");
        let (inner, rest) = split_leading_inner_docs(&pending);
        assert_eq!(inner, vec!["//! a", "//! b"]);
        assert_eq!(rest.len(), 1);
    }

    #[test]
    fn trailing_outer_doc_run_with_gap_breaks() {
        let pending = pendings_for("// lead\n/// doc1\n\n/// doc2\nkey");
        let (leading, outer) = split_trailing_outer_docs(&pending);
        // The blank line between doc1 and doc2 breaks continuity, so only
        // doc2 attaches as the outer-doc run; doc1 demotes to leading.
        assert_eq!(outer, vec!["/// doc2"]);
        assert_eq!(leading, vec!["// lead", "/// doc1"]);
    }
}
