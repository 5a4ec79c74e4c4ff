//! The tokenizer/parser: a tagged-state machine over a character cursor that
//! compiles a textual path expression into a query plan.
//!
//! The path syntax mixes positional tokens (`/`, `//`), bracketed
//! predicates, attribute sigils, and function-call suffixes; an explicit
//! state enum driving transitions over the cursor handles that mix more
//! directly than a grammar would.

use crate::ast::{BareTest, Operand, PathExpression, Predicate, Scope, Selector, Step, StepChain};
use crate::error::PathError;

/// Characters an operator token may consist of. The parser accepts any run
/// of these at predicate top level; whether the token means anything is the
/// operator registry's call at evaluation time.
const OPERATOR_CHARS: &str = "=!<>~^";

/// Compiles a path expression.
///
/// The expression is split on the union delimiter `|`; each non-empty
/// alternative becomes one step chain. Malformed input fails with
/// [`PathError::Parse`] carrying the offending position; nothing
/// partially-compiled escapes.
pub fn compile(expression: &str) -> Result<PathExpression, PathError> {
    let mut chains = Vec::new();
    for (offset, alternative) in alternatives(expression) {
        chains.push(ChainParser::new(expression, &alternative, offset).parse()?);
    }
    Ok(PathExpression::new(expression.to_string(), chains))
}

/// Splits on `|`, trims, drops empty alternatives, and keeps each
/// alternative's character offset into the original text for diagnostics.
fn alternatives(expression: &str) -> Vec<(usize, String)> {
    let chars: Vec<char> = expression.chars().collect();
    let mut out = Vec::new();
    let mut start = 0usize;
    for i in 0..=chars.len() {
        if i == chars.len() || chars[i] == '|' {
            let piece: String = chars[start..i].iter().collect();
            let trimmed = piece.trim();
            if !trimmed.is_empty() {
                let lead = piece.chars().take_while(|c| c.is_whitespace()).count();
                out.push((start + lead, trimmed.to_string()));
            }
            start = i + 1;
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Expecting a step separator (`/` or `//`) or the first bare selector.
    Scope,
    /// Consuming a selector token.
    Selector,
    /// Consuming a bracketed predicate.
    Predicate,
    /// Input exhausted.
    Done,
}

struct ChainParser<'s> {
    expr: &'s str,
    chars: Vec<char>,
    base: usize,
    pos: usize,
    state: State,
    scope: Scope,
    steps: Vec<Step>,
}

impl<'s> ChainParser<'s> {
    fn new(expr: &'s str, alternative: &str, base: usize) -> Self {
        Self {
            expr,
            chars: alternative.chars().collect(),
            base,
            pos: 0,
            state: State::Scope,
            scope: Scope::Normal,
            steps: Vec::new(),
        }
    }

    fn parse(mut self) -> Result<StepChain, PathError> {
        // A leading `.` names the context itself; `.//a` evaluates exactly
        // like `//a` since evaluation is context-relative anyway.
        if self.chars.first() == Some(&'.') && matches!(self.chars.get(1).copied(), None | Some('/')) {
            self.pos = 1;
        }
        while self.state != State::Done {
            self.state = match self.state {
                State::Scope => self.scan_scope()?,
                State::Selector => self.scan_selector()?,
                State::Predicate => self.scan_predicate()?,
                State::Done => State::Done,
            };
        }
        Ok(StepChain::new(self.steps))
    }

    fn err(&self, pos: usize, message: impl Into<String>) -> PathError {
        PathError::Parse {
            expr: self.expr.to_string(),
            position: self.base + pos,
            message: message.into(),
        }
    }

    fn scan_scope(&mut self) -> Result<State, PathError> {
        if self.pos >= self.chars.len() {
            return Ok(State::Done);
        }
        if self.chars[self.pos] == '/' {
            if self.chars.get(self.pos + 1) == Some(&'/') {
                self.scope = Scope::Recursive;
                self.pos += 2;
            } else {
                self.scope = Scope::Normal;
                self.pos += 1;
            }
        } else {
            // First step of an alternative may omit the leading slash.
            self.scope = Scope::Normal;
        }
        Ok(State::Selector)
    }

    fn scan_selector(&mut self) -> Result<State, PathError> {
        let start = self.pos;
        while self.pos < self.chars.len()
            && self.chars[self.pos] != '/'
            && self.chars[self.pos] != '['
        {
            self.pos += 1;
        }
        let raw: String = self.chars[start..self.pos].iter().collect();
        let token = raw.trim();
        if token.is_empty() {
            return Err(self.err(start, "empty step"));
        }

        let (selector, axis) = if let Some(name) = token.strip_prefix('@') {
            if name.is_empty() {
                return Err(self.err(start, "empty attribute name"));
            }
            (Selector::Attribute(name.to_string()), None)
        } else if let Some(name) = token.strip_suffix("()") {
            if name.is_empty() {
                return Err(self.err(start, "empty function name"));
            }
            (Selector::Function(name.to_string()), None)
        } else if let Some((axis, tag)) = token.split_once("::") {
            let axis = axis.trim();
            let tag = tag.trim();
            if axis.is_empty() {
                return Err(self.err(start, "empty axis name"));
            }
            if tag.is_empty() {
                return Err(self.err(start, "empty step after axis"));
            }
            (Selector::Tag(tag.to_string()), Some(axis.to_string()))
        } else {
            (Selector::Tag(token.to_string()), None)
        };

        self.steps.push(Step {
            selector,
            axis,
            scope: self.scope,
            predicate: None,
        });

        match self.chars.get(self.pos).copied() {
            None => Ok(State::Done),
            Some('[') => Ok(State::Predicate),
            Some(_) => Ok(State::Scope),
        }
    }

    fn scan_predicate(&mut self) -> Result<State, PathError> {
        let open = self.pos;
        match self.steps.last() {
            None => return Err(self.err(open, "predicate without a preceding step")),
            Some(step) if step.predicate.is_some() => {
                return Err(self.err(open, "step already has a predicate"));
            }
            Some(_) => {}
        }

        self.pos += 1;
        let inner_start = self.pos;
        let mut depth = 1usize;
        let mut quote: Option<char> = None;
        while self.pos < self.chars.len() {
            let c = self.chars[self.pos];
            if let Some(q) = quote {
                if c == q {
                    quote = None;
                }
            } else {
                match c {
                    '\'' | '"' => quote = Some(c),
                    '[' => depth += 1,
                    ']' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
            }
            self.pos += 1;
        }
        if depth != 0 {
            let message = if quote.is_some() {
                "unterminated string literal in predicate"
            } else {
                "unterminated predicate"
            };
            return Err(self.err(open, message));
        }

        let inner: String = self.chars[inner_start..self.pos].iter().collect();
        self.pos += 1; // consume ']'
        let predicate = self.parse_predicate(&inner, inner_start)?;
        if let Some(step) = self.steps.last_mut() {
            step.predicate = predicate;
        }

        match self.chars.get(self.pos).copied() {
            None => Ok(State::Done),
            Some('/') => Ok(State::Scope),
            Some('[') => Ok(State::Predicate),
            Some(_) => Err(self.err(self.pos, "expected '/' or end of input after predicate")),
        }
    }

    /// Splits predicate text at the first top-level operator token; without
    /// one the predicate is a bare test. A blank predicate (`[]` or `[  ]`)
    /// is ignored entirely.
    fn parse_predicate(
        &self,
        inner: &str,
        base: usize,
    ) -> Result<Option<Predicate>, PathError> {
        let text = inner.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let lead = inner.chars().take_while(|c| c.is_whitespace()).count();
        let base = base + lead;
        let chars: Vec<char> = text.chars().collect();

        let mut quote: Option<char> = None;
        let mut depth = 0usize;
        let mut op_start = None;
        for (i, &c) in chars.iter().enumerate() {
            if let Some(q) = quote {
                if c == q {
                    quote = None;
                }
                continue;
            }
            match c {
                '\'' | '"' => quote = Some(c),
                '[' => depth += 1,
                ']' => depth = depth.saturating_sub(1),
                c if depth == 0 && OPERATOR_CHARS.contains(c) => {
                    op_start = Some(i);
                    break;
                }
                _ => {}
            }
        }

        let Some(start) = op_start else {
            return Ok(Some(Predicate::Bare(self.parse_bare(&chars, base)?)));
        };

        let mut end = start;
        while end < chars.len() && OPERATOR_CHARS.contains(chars[end]) {
            end += 1;
        }
        let op: String = chars[start..end].iter().collect();
        let left_text: String = chars[..start].iter().collect();
        let left_text = left_text.trim().to_string();
        let right_text: String = chars[end..].iter().collect();
        let right_text = right_text.trim().to_string();

        if left_text.is_empty() {
            return Err(self.err(base + start, "missing left operand"));
        }
        if right_text.is_empty() {
            return Err(self.err(base + end, "missing right operand"));
        }

        let left = if let Some(name) = left_text.strip_suffix("()") {
            if name.is_empty() {
                return Err(self.err(base, "empty function name"));
            }
            Operand::Call(name.to_string())
        } else if let Some(name) = left_text.strip_prefix('@') {
            if name.is_empty() {
                return Err(self.err(base, "empty attribute name"));
            }
            Operand::Attr(name.to_string())
        } else {
            Operand::SubQuery(Box::new(compile(&left_text)?))
        };

        Ok(Some(Predicate::Comparison {
            left,
            op,
            right: strip_quotes(&right_text),
        }))
    }

    fn parse_bare(&self, chars: &[char], base: usize) -> Result<BareTest, PathError> {
        let text: String = chars.iter().collect();
        if chars.iter().all(|c| c.is_ascii_digit()) {
            return text
                .parse::<usize>()
                .map(BareTest::Position)
                .map_err(|_| self.err(base, "invalid position literal"));
        }
        if let Some(name) = text.strip_suffix("()") {
            if name.is_empty() {
                return Err(self.err(base, "empty function name"));
            }
            return Ok(BareTest::Call(name.to_string()));
        }
        if let Some(name) = text.strip_prefix('@') {
            if name.is_empty() {
                return Err(self.err(base, "empty attribute name"));
            }
            return Ok(BareTest::Attr(name.to_string()));
        }
        Ok(BareTest::Literal(text))
    }
}

/// Strips one pair of matching surrounding quotes, if present.
fn strip_quotes(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() >= 2 {
        let first = chars[0];
        if (first == '\'' || first == '"') && chars[chars.len() - 1] == first {
            return chars[1..chars.len() - 1].iter().collect();
        }
    }
    text.to_string()
}
