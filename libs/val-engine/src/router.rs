//! Topic → schema routing with `*` / `**` wildcards.
//!
//! - `*` matches exactly one non-empty segment
//! - `**` matches zero or more segments, anywhere in the pattern
//! - literal segments match exactly

use std::fmt;

use crate::schema::SchemaDescriptor;
use crate::sink::SinkKind;

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("invalid topic pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("duplicate binding: {pattern} -> {schema} ({sink})")]
    DuplicateBinding {
        pattern: String,
        schema: &'static str,
        sink: SinkKind,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Single,
    Multi,
}

/// Parsed, validated topic pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl TopicPattern {
    pub fn parse(pattern: &str) -> Result<Self, RouterError> {
        let invalid = |reason: &str| RouterError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if pattern.is_empty() {
            return Err(invalid("empty pattern"));
        }

        let mut segments = Vec::new();
        for part in pattern.split('/') {
            let segment = match part {
                "" => return Err(invalid("empty segment")),
                "*" => Segment::Single,
                "**" => Segment::Multi,
                p if p.contains('*') => return Err(invalid("wildcards must span a whole segment")),
                p => Segment::Literal(p.to_string()),
            };
            // `**/**` is the same as `**`.
            if segment == Segment::Multi && segments.last() == Some(&Segment::Multi) {
                continue;
            }
            segments.push(segment);
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, topic: &str) -> bool {
        let parts: Vec<&str> = topic.split('/').collect();
        matches_segments(&self.segments, &parts)
    }

    /// True when every topic matched by `other` is also matched by `self`.
    ///
    /// Conservative: may answer `false` for exotic pairs such as `*/**`
    /// against `**/x`, never `true` for a pattern that escapes `self`.
    pub fn covers(&self, other: &TopicPattern) -> bool {
        covers_segments(&self.segments, &other.segments)
    }

    /// Same topic set as `other`, ignoring spelling (`a/**/**` vs `a/**`).
    pub fn same_as(&self, other: &TopicPattern) -> bool {
        self.segments == other.segments
    }
}

impl fmt::Display for TopicPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn matches_segments(pattern: &[Segment], topic: &[&str]) -> bool {
    match pattern.split_first() {
        None => topic.is_empty(),
        Some((Segment::Multi, rest)) => {
            // Try every split point: `**` swallows topic[..n].
            (0..=topic.len()).any(|n| matches_segments(rest, &topic[n..]))
        }
        Some((Segment::Single, rest)) => match topic.split_first() {
            Some((part, tail)) if !part.is_empty() => matches_segments(rest, tail),
            _ => false,
        },
        Some((Segment::Literal(lit), rest)) => match topic.split_first() {
            Some((part, tail)) if *part == lit.as_str() => matches_segments(rest, tail),
            _ => false,
        },
    }
}

fn covers_segments(outer: &[Segment], inner: &[Segment]) -> bool {
    match (outer.split_first(), inner.split_first()) {
        (None, None) => true,
        (None, Some(_)) => false,
        // `**` absorbs nothing, or the next inner segment whatever it is.
        (Some((Segment::Multi, rest)), _) => {
            covers_segments(rest, inner)
                || (!inner.is_empty() && covers_segments(outer, &inner[1..]))
        }
        (Some(_), None) => false,
        (Some((Segment::Single, rest)), Some((Segment::Single | Segment::Literal(_), tail))) => {
            covers_segments(rest, tail)
        }
        (Some((Segment::Literal(a), rest)), Some((Segment::Literal(b), tail))) if a == b => {
            covers_segments(rest, tail)
        }
        _ => false,
    }
}

/// Join a relative pattern onto a prefix (`val/amoc` + `**/value`).
pub fn join_prefix(prefix: &str, pattern: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        pattern.to_string()
    } else {
        format!("{prefix}/{pattern}")
    }
}

// ═══════════════════════════════════════════════════════════════
//  Router
// ═══════════════════════════════════════════════════════════════

/// One (pattern, schema, sink) association.
#[derive(Debug, Clone)]
pub struct Binding {
    pub pattern: TopicPattern,
    pub schema: &'static SchemaDescriptor,
    pub sink: SinkKind,
}

/// Ordered binding table. Built once at startup, read-only afterwards.
#[derive(Debug, Default)]
pub struct Router {
    bindings: Vec<Binding>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        pattern: &str,
        schema: &'static SchemaDescriptor,
        sink: SinkKind,
    ) -> Result<(), RouterError> {
        let pattern = TopicPattern::parse(pattern)?;
        let duplicate = self.bindings.iter().any(|b| {
            b.pattern.same_as(&pattern) && b.schema.name == schema.name && b.sink == sink
        });
        if duplicate {
            return Err(RouterError::DuplicateBinding {
                pattern: pattern.raw,
                schema: schema.name,
                sink,
            });
        }
        tracing::debug!(pattern = %pattern, schema = schema.name, sink = %sink, "binding registered");
        self.bindings.push(Binding { pattern, schema, sink });
        Ok(())
    }

    /// Every binding whose pattern matches `topic`, in registration order.
    pub fn route(&self, topic: &str) -> Vec<&Binding> {
        self.bindings
            .iter()
            .filter(|b| b.pattern.matches(topic))
            .collect()
    }

    /// Distinct patterns, in registration order.
    pub fn patterns(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for b in &self.bindings {
            if !out.contains(&b.pattern.as_str()) {
                out.push(b.pattern.as_str());
            }
        }
        out
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
