//! Parsing of `%(field)s` / `%(field)d` templates.

use crate::config::ConfigurationError;

/// How a placeholder renders its value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Conversion {
    /// `s`: any value, rendered as text.
    Text,
    /// `d`: integer values only.
    Integer,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Segment {
    Literal(String),
    Field { name: String, conversion: Conversion },
}

/// A parsed format template.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub(crate) fn parse(format: &str) -> Result<Self, ConfigurationError> {
        let error = |position: usize, reason: &'static str| ConfigurationError::Template {
            format: format.to_owned(),
            position,
            reason,
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = format;

        while let Some(percent) = rest.find('%') {
            literal.push_str(&rest[..percent]);
            let position = format.len() - rest.len() + percent;
            let after = &rest[percent + 1..];

            if let Some(tail) = after.strip_prefix('%') {
                literal.push('%');
                rest = tail;
                continue;
            }

            let Some(body) = after.strip_prefix('(') else {
                return Err(error(position, "expected '(' or '%' after '%'"));
            };
            let Some(close) = body.find(')') else {
                return Err(error(position, "unterminated placeholder"));
            };
            let name = &body[..close];
            if name.is_empty() {
                return Err(error(position, "empty placeholder name"));
            }

            let tail = &body[close + 1..];
            let conversion = match tail.chars().next() {
                Some('s') => Conversion::Text,
                Some('d' | 'i') => Conversion::Integer,
                Some(_) => return Err(error(position, "unsupported conversion; use 's' or 'd'")),
                None => return Err(error(position, "placeholder is missing its conversion")),
            };

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Field {
                name: name.to_owned(),
                conversion,
            });
            rest = &tail[1..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    pub(crate) fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Reports whether the template references the field `name`.
    pub(crate) fn uses(&self, name: &str) -> bool {
        self.field_names().any(|field| field == name)
    }

    pub(crate) fn field_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }
}
