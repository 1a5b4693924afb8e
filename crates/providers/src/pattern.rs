use regex::Regex;

/// Matcher for caller-supplied search terms against inventory names.
///
/// The term compiles as an unanchored regular expression; the `regex` crate
/// guarantees linear-time matching, so a caller-controlled pattern cannot
/// produce pathological match times. A term that is not valid regex syntax
/// degrades to a literal substring match instead of erroring.
#[derive(Clone, Debug)]
pub struct NamePattern {
    kind: PatternKind,
}

#[derive(Clone, Debug)]
enum PatternKind {
    Regex(Regex),
    Literal(String),
}

impl NamePattern {
    pub fn compile(term: &str) -> Self {
        let kind = match Regex::new(term) {
            Ok(regex) => PatternKind::Regex(regex),
            Err(_) => PatternKind::Literal(term.to_owned()),
        };
        Self { kind }
    }

    pub fn matches(&self, candidate: &str) -> bool {
        match &self.kind {
            PatternKind::Regex(regex) => regex.is_match(candidate),
            PatternKind::Literal(literal) => candidate.contains(literal.as_str()),
        }
    }
}
