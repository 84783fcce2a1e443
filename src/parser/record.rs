// Record parser for the .gph edge-list format

use nom::{
    bytes::complete::take_while,
    character::complete::char,
    combinator::all_consuming,
    multi::separated_list0,
    IResult,
};

/// One well-formed `parent,child` line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub parent: &'a str,
    pub child: &'a str,
}

/// A single comma-free field, possibly empty
fn field(input: &str) -> IResult<&str, &str> {
    take_while(|c| c != ',')(input)
}

/// Split a line on every comma, keeping empty fields
pub fn fields(input: &str) -> IResult<&str, Vec<&str>> {
    all_consuming(separated_list0(char(','), field))(input)
}

/// Parse an already-trimmed line into a record.
///
/// Returns `None` unless the line splits into exactly two fields.
pub fn parse_record(line: &str) -> Option<Record<'_>> {
    match fields(line) {
        Ok((_, parts)) if parts.len() == 2 => Some(Record {
            parent: parts[0],
            child: parts[1],
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_keep_empty_parts() {
        let (rest, parts) = fields("A,,B").unwrap();
        assert_eq!(rest, "");
        assert_eq!(parts, vec!["A", "", "B"]);
    }

    #[test]
    fn test_two_fields() {
        assert_eq!(
            parse_record("A,B"),
            Some(Record {
                parent: "A",
                child: "B"
            })
        );
    }

    #[test]
    fn test_fields_are_not_trimmed() {
        assert_eq!(
            parse_record("A , B"),
            Some(Record {
                parent: "A ",
                child: " B"
            })
        );
    }

    #[test]
    fn test_trailing_comma_gives_empty_child() {
        assert_eq!(
            parse_record("A,"),
            Some(Record {
                parent: "A",
                child: ""
            })
        );
    }

    #[test]
    fn test_wrong_arity_rejected() {
        assert_eq!(parse_record("A"), None);
        assert_eq!(parse_record("A,B,C"), None);
        assert_eq!(parse_record(",,"), None);
    }
}
