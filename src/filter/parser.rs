//! Filter text parser
//!
//! Produces the raw [`FilterExpr`] AST; name resolution against a kind's
//! schema happens in the compile step, so the parser accepts any
//! identifier shape and leaves unknown-name errors to the compiler.

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, tag_no_case},
    character::complete::{alpha1, alphanumeric1, char, multispace0, multispace1},
    combinator::{all_consuming, opt, recognize},
    error::{context, convert_error, ContextError, ParseError as NomParseError, VerboseError},
    multi::{many0, many1, separated_list1},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use super::ast::{FilterExpr, Literal, Path};
use crate::{Error, Result};

/// Parse a complete filter expression from text
pub fn parse(input: &str) -> Result<FilterExpr> {
    if input.trim().is_empty() {
        return Err(Error::InvalidArgument("empty filter".to_string()));
    }
    match all_consuming(delimited(
        multispace0::<_, VerboseError<&str>>,
        expr,
        multispace0,
    ))(input)
    {
        Ok((_, parsed)) => Ok(parsed),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(Error::InvalidArgument(
            format!("malformed filter: {}", convert_error(input, e)),
        )),
        Err(nom::Err::Incomplete(_)) => {
            Err(Error::InvalidArgument("malformed filter: incomplete".to_string()))
        }
    }
}

fn expr<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, FilterExpr, E> {
    let (input, clauses) = separated_list1(and_separator, clause)(input)?;
    Ok((input, FilterExpr::And(clauses)))
}

fn and_separator<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, (), E> {
    let (input, _) = tuple((multispace1, tag_no_case("AND"), multispace1))(input)?;
    Ok((input, ()))
}

fn clause<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, FilterExpr, E> {
    alt((not_clause, has_clause, group, comparison))(input)
}

fn not_clause<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, FilterExpr, E> {
    let (input, inner) = preceded(pair(tag_no_case("NOT"), multispace1), clause)(input)?;
    Ok((input, FilterExpr::Not(Box::new(inner))))
}

fn has_clause<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, FilterExpr, E> {
    let (input, path) = preceded(
        tag("has"),
        delimited(
            tuple((multispace0, char('('), multispace0)),
            path,
            tuple((multispace0, char(')'))),
        ),
    )(input)?;
    Ok((input, FilterExpr::Has(path)))
}

fn group<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, FilterExpr, E> {
    delimited(
        pair(char('('), multispace0),
        expr,
        pair(multispace0, char(')')),
    )(input)
}

fn comparison<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, FilterExpr, E> {
    let (input, lhs) = path(input)?;
    let (input, _) = tuple((multispace0, char('='), multispace0))(input)?;
    let (input, rhs) = context("comparison value", literal)(input)?;
    Ok((input, FilterExpr::Eq(lhs, rhs)))
}

fn path<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, Path, E> {
    let (input, segments) = separated_list1(char('.'), identifier)(input)?;
    Ok((
        input,
        Path(segments.into_iter().map(str::to_string).collect()),
    ))
}

fn identifier<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, &'a str, E> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn literal<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, Literal, E> {
    alt((quoted, bareword))(input)
}

fn quoted<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, Literal, E> {
    let (input, contents) = delimited(char('"'), opt(is_not("\"")), char('"'))(input)?;
    Ok((
        input,
        Literal::Quoted(contents.unwrap_or_default().to_string()),
    ))
}

fn bareword<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, Literal, E> {
    let (input, word) = recognize(many1(alt((alphanumeric1, tag("_"), tag("-")))))(input)?;
    Ok((input, Literal::Bare(word.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq(path: &[&str], lit: Literal) -> FilterExpr {
        FilterExpr::Eq(Path(path.iter().map(|s| s.to_string()).collect()), lit)
    }

    #[test]
    fn test_simple_equality() {
        let parsed = parse(r#"name = "edge-1""#).unwrap();
        assert_eq!(
            parsed,
            FilterExpr::And(vec![eq(&["name"], Literal::Quoted("edge-1".to_string()))])
        );
    }

    #[test]
    fn test_bare_enum_value() {
        let parsed = parse("desired_state = RUNNING").unwrap();
        assert_eq!(
            parsed,
            FilterExpr::And(vec![eq(
                &["desired_state"],
                Literal::Bare("RUNNING".to_string())
            )])
        );
    }

    #[test]
    fn test_empty_string_comparison() {
        let parsed = parse(r#"note = """#).unwrap();
        assert_eq!(
            parsed,
            FilterExpr::And(vec![eq(&["note"], Literal::Quoted(String::new()))])
        );
    }

    #[test]
    fn test_dotted_path() {
        let parsed = parse(r#"site.region.name = "emea""#).unwrap();
        assert_eq!(
            parsed,
            FilterExpr::And(vec![eq(
                &["site", "region", "name"],
                Literal::Quoted("emea".to_string())
            )])
        );
    }

    #[test]
    fn test_has_and_not_has() {
        let parsed = parse("has(site) AND NOT has(provider)").unwrap();
        let FilterExpr::And(clauses) = parsed else {
            panic!("expected top-level And");
        };
        assert_eq!(clauses.len(), 2);
        assert_eq!(
            clauses[0],
            FilterExpr::Has(Path(vec!["site".to_string()]))
        );
        assert_eq!(
            clauses[1],
            FilterExpr::Not(Box::new(FilterExpr::Has(Path(vec![
                "provider".to_string()
            ]))))
        );
    }

    #[test]
    fn test_parenthesized_group() {
        let parsed = parse(r#"(name = "a" AND note = "b") AND has(site)"#).unwrap();
        let FilterExpr::And(clauses) = parsed else {
            panic!("expected top-level And");
        };
        assert_eq!(clauses.len(), 2);
        assert!(matches!(clauses[0], FilterExpr::And(_)));
    }

    #[test]
    fn test_field_starting_with_not_is_a_comparison() {
        // "note" shares a prefix with the NOT keyword
        let parsed = parse(r#"note = "x""#).unwrap();
        assert_eq!(
            parsed,
            FilterExpr::And(vec![eq(&["note"], Literal::Quoted("x".to_string()))])
        );
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse("").is_err());
        assert!(parse("name =").is_err());
        assert!(parse("= value").is_err());
        assert!(parse(r#"name = "a" extra"#).is_err());
        assert!(parse("has()").is_err());
    }
}
