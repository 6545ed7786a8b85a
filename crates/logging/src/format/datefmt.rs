//! strftime-style timestamp patterns rendered from [`OffsetDateTime`].

use std::fmt::Write as _;

use time::OffsetDateTime;

use crate::config::ConfigurationError;

#[derive(Clone, Debug, Eq, PartialEq)]
enum Item {
    Literal(String),
    Year,
    ShortYear,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Microsecond,
    Offset,
}

/// A compiled date pattern supporting `%Y %y %m %d %H %M %S %f %z %%`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct DateFormat {
    items: Vec<Item>,
}

impl DateFormat {
    pub(crate) fn parse(datefmt: &str) -> Result<Self, ConfigurationError> {
        let mut items = Vec::new();
        let mut literal = String::new();
        let mut chars = datefmt.chars();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            let item = match chars.next() {
                Some('%') => {
                    literal.push('%');
                    continue;
                }
                Some('Y') => Item::Year,
                Some('y') => Item::ShortYear,
                Some('m') => Item::Month,
                Some('d') => Item::Day,
                Some('H') => Item::Hour,
                Some('M') => Item::Minute,
                Some('S') => Item::Second,
                Some('f') => Item::Microsecond,
                Some('z') => Item::Offset,
                other => {
                    return Err(ConfigurationError::DateFormat {
                        datefmt: datefmt.to_owned(),
                        directive: other.unwrap_or('%'),
                    });
                }
            };
            if !literal.is_empty() {
                items.push(Item::Literal(std::mem::take(&mut literal)));
            }
            items.push(item);
        }
        if !literal.is_empty() {
            items.push(Item::Literal(literal));
        }

        Ok(Self { items })
    }

    pub(crate) fn render(&self, at: OffsetDateTime) -> String {
        let mut out = String::with_capacity(32);
        for item in &self.items {
            // Writing into a String cannot fail.
            let _ = match item {
                Item::Literal(text) => out.write_str(text),
                Item::Year => write!(out, "{:04}", at.year()),
                Item::ShortYear => write!(out, "{:02}", at.year().rem_euclid(100)),
                Item::Month => write!(out, "{:02}", u8::from(at.month())),
                Item::Day => write!(out, "{:02}", at.day()),
                Item::Hour => write!(out, "{:02}", at.hour()),
                Item::Minute => write!(out, "{:02}", at.minute()),
                Item::Second => write!(out, "{:02}", at.second()),
                Item::Microsecond => write!(out, "{:06}", at.microsecond()),
                Item::Offset => {
                    let offset = at.offset();
                    let (hours, minutes, _) = offset.as_hms();
                    let sign = if offset.is_negative() { '-' } else { '+' };
                    write!(
                        out,
                        "{sign}{:02}{:02}",
                        hours.unsigned_abs(),
                        minutes.unsigned_abs()
                    )
                }
            };
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_DATE_FORMAT;
    use time::macros::datetime;

    #[test]
    fn renders_default_pattern() {
        let format = DateFormat::parse(DEFAULT_DATE_FORMAT).unwrap();
        let at = datetime!(2021-12-05 09:04:07 +05:30);
        assert_eq!(format.render(at), "[2021-12-05 09:04:07 +0530]");
    }

    #[test]
    fn renders_negative_and_utc_offsets() {
        let format = DateFormat::parse("%z").unwrap();
        assert_eq!(format.render(datetime!(2021-01-01 0:00 -3:30)), "-0330");
        assert_eq!(format.render(datetime!(2021-01-01 0:00 UTC)), "+0000");
    }

    #[test]
    fn renders_short_year_and_microseconds() {
        let format = DateFormat::parse("%y/%m/%d %H:%M:%S.%f %%").unwrap();
        let at = datetime!(2009-02-03 04:05:06.000789 UTC);
        assert_eq!(format.render(at), "09/02/03 04:05:06.000789 %");
    }

    #[test]
    fn unsupported_directive_is_rejected() {
        let err = DateFormat::parse("%Y-%j").unwrap_err();
        assert!(matches!(err, ConfigurationError::DateFormat { directive: 'j', .. }));

        let err = DateFormat::parse("%H%").unwrap_err();
        assert!(matches!(err, ConfigurationError::DateFormat { directive: '%', .. }));
    }
}
