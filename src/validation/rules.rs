use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use time::Date;
use time::macros::format_description;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// One check applied to a field value.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Rule {
    /// Present and not blank.
    Required,
    Email,
    /// Minimum length in characters.
    MinLength(usize),
    /// Maximum length in characters.
    MaxLength(usize),
    /// Exactly this many digits once punctuation is stripped (`12.345.678/0001-90`).
    Digits(usize),
    /// A JSON number or a numeric string (`,` accepted as decimal separator).
    Numeric,
    /// Numeric and greater than zero.
    Positive,
    /// `YYYY-MM-DD`, optionally followed by a time part.
    Date,
    OneOf(&'static [&'static str]),
    Pattern {
        regex: Regex,
        message: Cow<'static, str>,
    },
}

impl Rule {
    /// Custom regex rule with its own message.
    ///
    /// # Errors
    ///
    /// Returns the regex error if `pattern` does not compile.
    pub fn pattern(
        pattern: &str,
        message: impl Into<Cow<'static, str>>,
    ) -> Result<Self, regex::Error> {
        Ok(Self::Pattern {
            regex: Regex::new(pattern)?,
            message: message.into(),
        })
    }

    /// Checks `value`, returning the user-facing message on failure.
    ///
    /// Blank values only fail [`Rule::Required`]; every other rule skips them.
    pub fn check(&self, value: &Value) -> Result<(), Cow<'static, str>> {
        if is_blank(value) {
            return match self {
                Self::Required => Err("obrigatório".into()),
                _ => Ok(()),
            };
        }

        match self {
            Self::Required => Ok(()),
            Self::Email => match value.as_str() {
                Some(s) if EMAIL.is_match(s.trim()) => Ok(()),
                _ => Err("inválido".into()),
            },
            Self::MinLength(min) => match text_len(value) {
                Some(len) if len >= *min => Ok(()),
                _ => Err(format!("deve ter pelo menos {min} caracteres").into()),
            },
            Self::MaxLength(max) => match text_len(value) {
                Some(len) if len <= *max => Ok(()),
                _ => Err(format!("deve ter no máximo {max} caracteres").into()),
            },
            Self::Digits(count) => {
                let digits = match value {
                    Value::String(s) => s.chars().filter(char::is_ascii_digit).count(),
                    Value::Number(n) => n.as_u64().map_or(0, |n| n.to_string().len()),
                    _ => 0,
                };
                if digits == *count {
                    Ok(())
                } else {
                    Err(format!("deve conter {count} dígitos").into())
                }
            }
            Self::Numeric => match as_number(value) {
                Some(_) => Ok(()),
                None => Err("deve ser numérico".into()),
            },
            Self::Positive => match as_number(value) {
                Some(n) if n > 0.0 => Ok(()),
                Some(_) => Err("deve ser maior que zero".into()),
                None => Err("deve ser numérico".into()),
            },
            Self::Date => match value.as_str().and_then(parse_date) {
                Some(_) => Ok(()),
                None => Err("data inválida".into()),
            },
            Self::OneOf(options) => match value.as_str() {
                Some(s) if options.contains(&s) => Ok(()),
                _ => Err("valor não permitido".into()),
            },
            Self::Pattern { regex, message } => match value.as_str() {
                Some(s) if regex.is_match(s) => Ok(()),
                _ => Err(message.clone()),
            },
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn text_len(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.trim().chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn parse_date(s: &str) -> Option<Date> {
    let day = s.get(..10)?;
    Date::parse(day, format_description!("[year]-[month]-[day]")).ok()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn ok(rule: &Rule, value: Value) -> bool {
        rule.check(&value).is_ok()
    }

    #[test]
    fn required_rejects_blank() {
        assert!(!ok(&Rule::Required, json!(null)));
        assert!(!ok(&Rule::Required, json!("   ")));
        assert!(!ok(&Rule::Required, json!([])));
        assert!(ok(&Rule::Required, json!("x")));
        assert!(ok(&Rule::Required, json!(0)));
        assert!(ok(&Rule::Required, json!(false)));
        assert_eq!(Rule::Required.check(&json!(null)).unwrap_err(), "obrigatório");
    }

    #[test]
    fn non_required_rules_skip_blank() {
        for rule in [Rule::Email, Rule::MinLength(3), Rule::Digits(11), Rule::Date, Rule::Positive] {
            assert!(ok(&rule, json!(null)), "{rule:?}");
            assert!(ok(&rule, json!("")), "{rule:?}");
        }
    }

    #[test]
    fn email() {
        assert!(ok(&Rule::Email, json!("ana@example.com")));
        assert!(!ok(&Rule::Email, json!("ana@example")));
        assert!(!ok(&Rule::Email, json!("ana example.com")));
        assert_eq!(Rule::Email.check(&json!("x")).unwrap_err(), "inválido");
    }

    #[test]
    fn lengths_count_characters() {
        assert!(ok(&Rule::MaxLength(4), json!("ação")));
        assert!(!ok(&Rule::MaxLength(3), json!("ação")));
        assert!(!ok(&Rule::MinLength(3), json!("ab")));
        assert!(!ok(&Rule::MinLength(3), json!(12345)));
    }

    #[test]
    fn digits_ignore_punctuation() {
        assert!(ok(&Rule::Digits(14), json!("12.345.678/0001-90")));
        assert!(ok(&Rule::Digits(11), json!("123.456.789-01")));
        assert!(!ok(&Rule::Digits(11), json!("123.456.789")));
    }

    #[test]
    fn digits_on_numbers_count_only_digits() {
        assert!(ok(&Rule::Digits(11), json!(12_345_678_901u64)));
        assert!(!ok(&Rule::Digits(11), json!(-1_234_567_890i64)));
        assert!(!ok(&Rule::Digits(11), json!(-12_345_678_901i64)));
        assert!(!ok(&Rule::Digits(11), json!(123_456_789.5)));
    }

    #[test]
    fn numbers() {
        assert!(ok(&Rule::Numeric, json!(10.5)));
        assert!(ok(&Rule::Numeric, json!("10,50")));
        assert!(!ok(&Rule::Numeric, json!("dez")));
        assert!(!ok(&Rule::Numeric, json!("NaN")));
        assert!(ok(&Rule::Positive, json!("0,01")));
        assert_eq!(Rule::Positive.check(&json!(0)).unwrap_err(), "deve ser maior que zero");
    }

    #[test]
    fn dates() {
        assert!(ok(&Rule::Date, json!("2024-02-29")));
        assert!(ok(&Rule::Date, json!("2024-02-29T10:00:00Z")));
        assert!(!ok(&Rule::Date, json!("2023-02-29")));
        assert!(!ok(&Rule::Date, json!("29/02/2024")));
    }

    #[test]
    fn one_of_and_pattern() {
        let rule = Rule::OneOf(&["CLT", "PJ"]);
        assert!(ok(&rule, json!("PJ")));
        assert!(!ok(&rule, json!("pj")));

        let cep = Rule::pattern(r"^\d{5}-?\d{3}$", "CEP inválido").unwrap();
        assert!(ok(&cep, json!("01310-100")));
        assert_eq!(cep.check(&json!("0131")).unwrap_err(), "CEP inválido");
        assert!(Rule::pattern("(", "x").is_err());
    }
}
