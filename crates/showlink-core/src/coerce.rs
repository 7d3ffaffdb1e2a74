//! Defensive coercion of OSC arguments.
//!
//! The show controller is not strict about argument types (a boolean may
//! arrive as an int, an index as a float or a string). Every helper here
//! accepts any argument, including a missing one, and never fails.

use rosc::OscType;

/// Numeric value of an argument, `None` when missing or not numeric.
pub fn number(arg: Option<&OscType>) -> Option<f64> {
    let value = match arg? {
        OscType::Int(i) => *i as f64,
        OscType::Long(l) => *l as f64,
        OscType::Float(f) => *f as f64,
        OscType::Double(d) => *d,
        OscType::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        OscType::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().ok()?
            }
        }
        OscType::Nil => 0.0,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

/// Integer value of an argument, truncated toward zero.
pub fn integer(arg: Option<&OscType>) -> Option<i64> {
    number(arg).map(|n| n.trunc() as i64)
}

/// Index value, where anything unusable means "none" (`-1`). Values
/// outside the `i32` range are unusable too.
pub fn index(arg: Option<&OscType>) -> i64 {
    integer(arg)
        .filter(|i| i32::try_from(*i).is_ok())
        .unwrap_or(-1)
}

/// Truthiness of an argument; missing arguments are false.
pub fn truthy(arg: Option<&OscType>) -> bool {
    match arg {
        None => false,
        Some(OscType::Bool(b)) => *b,
        Some(OscType::Int(i)) => *i != 0,
        Some(OscType::Long(l)) => *l != 0,
        Some(OscType::Float(f)) => *f != 0.0 && !f.is_nan(),
        Some(OscType::Double(d)) => *d != 0.0 && !d.is_nan(),
        Some(OscType::String(s)) => !s.is_empty(),
        Some(OscType::Nil) => false,
        Some(OscType::Inf) => true,
        Some(_) => true,
    }
}

/// Render a number without a trailing `.0` for whole values.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// String value of an argument; missing arguments become an empty string.
pub fn string(arg: Option<&OscType>) -> String {
    match arg {
        None | Some(OscType::Nil) => String::new(),
        Some(OscType::String(s)) => s.clone(),
        Some(OscType::Int(i)) => i.to_string(),
        Some(OscType::Long(l)) => l.to_string(),
        Some(OscType::Float(f)) => format_number(*f as f64),
        Some(OscType::Double(d)) => format_number(*d),
        Some(OscType::Bool(b)) => b.to_string(),
        Some(OscType::Char(c)) => c.to_string(),
        Some(other) => format!("{:?}", other),
    }
}

/// Every argument as a string, for list-valued topics.
pub fn string_list(args: &[OscType]) -> Vec<String> {
    args.iter().map(|a| string(Some(a))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_coercion() {
        assert_eq!(number(Some(&OscType::Int(3))), Some(3.0));
        assert_eq!(number(Some(&OscType::Float(1.5))), Some(1.5));
        assert_eq!(number(Some(&OscType::String(" 12.25 ".into()))), Some(12.25));
        assert_eq!(number(Some(&OscType::String("abc".into()))), None);
        assert_eq!(number(Some(&OscType::Bool(true))), Some(1.0));
        assert_eq!(number(Some(&OscType::Double(f64::NAN))), None);
        assert_eq!(number(None), None);
    }

    #[test]
    fn test_index_defaults_to_none() {
        assert_eq!(index(Some(&OscType::Int(4))), 4);
        assert_eq!(index(Some(&OscType::Float(2.9))), 2);
        assert_eq!(index(Some(&OscType::String("x".into()))), -1);
        assert_eq!(index(None), -1);
    }

    #[test]
    fn test_index_out_of_range_is_none() {
        assert_eq!(index(Some(&OscType::Float(1e30))), -1);
        assert_eq!(index(Some(&OscType::Double(-1e30))), -1);
        assert_eq!(index(Some(&OscType::Long(i64::MAX))), -1);
        assert_eq!(index(Some(&OscType::Double(f64::NAN))), -1);
        assert_eq!(index(Some(&OscType::Long(i32::MAX as i64))), i32::MAX as i64);
    }

    #[test]
    fn test_truthy() {
        assert!(truthy(Some(&OscType::Int(1))));
        assert!(!truthy(Some(&OscType::Int(0))));
        assert!(truthy(Some(&OscType::Bool(true))));
        assert!(!truthy(Some(&OscType::String(String::new()))));
        assert!(truthy(Some(&OscType::String("false".into()))));
        assert!(!truthy(None));
    }

    #[test]
    fn test_string_coercion() {
        assert_eq!(string(Some(&OscType::Float(2.0))), "2");
        assert_eq!(string(Some(&OscType::Float(2.5))), "2.5");
        assert_eq!(string(Some(&OscType::Bool(false))), "false");
        assert_eq!(string(None), "");
        assert_eq!(
            string_list(&[OscType::String("A".into()), OscType::Int(2)]),
            vec!["A".to_string(), "2".to_string()]
        );
    }
}
