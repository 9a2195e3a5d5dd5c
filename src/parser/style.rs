// Parser for CSS-like style values ("#ff0000", "10%", "1px", "url(...)", "solid")

use crate::style::{parse_color, StyleValue, Unit};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, char, hex_digit1, multispace0, multispace1},
    combinator::{all_consuming, map, map_opt, opt, recognize},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use super::lexer::number_literal;

fn hex_color(input: &str) -> IResult<&str, StyleValue> {
    map_opt(recognize(pair(char('#'), hex_digit1)), |s: &str| {
        parse_color(s).map(StyleValue::Color)
    })(input)
}

fn named_color(input: &str) -> IResult<&str, StyleValue> {
    map_opt(alpha1, |s: &str| parse_color(s).map(StyleValue::Color))(input)
}

fn color(input: &str) -> IResult<&str, StyleValue> {
    alt((hex_color, named_color))(input)
}

/// One color, or two colors separated by whitespace (gradient pairs)
fn colors(input: &str) -> IResult<&str, StyleValue> {
    let (input, first) = color(input)?;
    let (input, second) = opt(preceded(multispace1, color))(input)?;
    let value = match (first.as_color(), second.and_then(|s| s.as_color())) {
        (Some(a), Some(b)) => StyleValue::ColorPair(a, b),
        _ => first,
    };
    Ok((input, value))
}

fn length(input: &str) -> IResult<&str, StyleValue> {
    map(
        pair(
            number_literal,
            opt(alt((
                map(tag("px"), |_| Unit::Px),
                map(tag("pt"), |_| Unit::Pt),
                map(tag("%"), |_| Unit::Percent),
            ))),
        ),
        |(v, unit)| StyleValue::Length(v, unit.unwrap_or(Unit::Number)),
    )(input)
}

fn uri(input: &str) -> IResult<&str, StyleValue> {
    map(
        delimited(
            tuple((tag("url("), multispace0)),
            take_while1(|c: char| c != ')' && !c.is_whitespace()),
            tuple((multispace0, char(')'))),
        ),
        |s: &str| StyleValue::Uri(s.to_string()),
    )(input)
}

fn keyword(input: &str) -> IResult<&str, StyleValue> {
    map(
        take_while1(|c: char| c.is_alphanumeric() || c == '-' || c == '_'),
        |s: &str| StyleValue::Keyword(s.to_string()),
    )(input)
}

/// Parse the textual form of a style value
pub fn parse_style_value(input: &str) -> Result<StyleValue, String> {
    let trimmed = input.trim();
    alt((
        all_consuming(uri),
        all_consuming(colors),
        all_consuming(length),
        all_consuming(keyword),
    ))(trimmed)
    .map(|(_, value)| value)
    .map_err(|_| format!("Invalid style value '{}'", input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::rgb;
    use plotters::style::RGBColor;

    #[test]
    fn test_parse_colors() {
        assert_eq!(parse_style_value("#ff0000"), Ok(StyleValue::Color(RGBColor(255, 0, 0))));
        assert_eq!(parse_style_value("blue"), Ok(StyleValue::Color(RGBColor(0, 0, 255))));
        assert_eq!(
            parse_style_value("#fcfcfc #d7d8da"),
            Ok(StyleValue::ColorPair(rgb(0xfcfcfc), rgb(0xd7d8da)))
        );
    }

    #[test]
    fn test_parse_lengths() {
        assert_eq!(parse_style_value("10%"), Ok(StyleValue::percent(10.0)));
        assert_eq!(parse_style_value("1px"), Ok(StyleValue::px(1.0)));
        assert_eq!(parse_style_value(" 14pt "), Ok(StyleValue::pt(14.0)));
        assert_eq!(parse_style_value("1"), Ok(StyleValue::number(1.0)));
    }

    #[test]
    fn test_parse_keywords_and_uris() {
        assert_eq!(parse_style_value("solid"), Ok(StyleValue::keyword("solid")));
        assert_eq!(parse_style_value("sans-serif"), Ok(StyleValue::keyword("sans-serif")));
        assert_eq!(
            parse_style_value("url(http://localhost:8080/Pentaho/JPivot)"),
            Ok(StyleValue::Uri("http://localhost:8080/Pentaho/JPivot".to_string()))
        );
    }

    #[test]
    fn test_display_parses_back() {
        let values = [
            StyleValue::rgb(0x5d5d5d),
            StyleValue::ColorPair(rgb(0x010203), rgb(0xa0b0c0)),
            StyleValue::percent(90.0),
            StyleValue::px(2.0),
            StyleValue::keyword("horizontal"),
            StyleValue::Uri("http://example.com/drill".to_string()),
        ];
        for value in values {
            assert_eq!(value.to_string().parse::<StyleValue>(), Ok(value));
        }
    }

    #[test]
    fn test_invalid_values() {
        assert!(parse_style_value("").is_err());
        assert!(parse_style_value("10 px").is_err());
        assert!(parse_style_value("#12").is_err());
    }
}
