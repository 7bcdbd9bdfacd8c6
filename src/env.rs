//! Environment variable decoding.
//!
//! Variables named `{PREFIX}__{PATH}` are decoded into a nested mapping, where
//! `PATH` is a `__`-separated list of segments, lower-cased:
//!
//! - `MY_APP__PORT=8080` → `{"port": 8080}`
//! - `MY_APP__DB__HOST=localhost` → `{"db": {"host": "localhost"}}`
//!
//! Values are coerced by [`parse_env_value`]. Decoding works on an explicit
//! snapshot of the environment so it can be tested without touching the
//! process environment.

use crate::types::{ConfigMap, value_kind};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Separator between the prefix and path segments.
pub const PATH_SEPARATOR: &str = "__";

/// Where environment variables are read from.
#[derive(Debug, Clone, Default)]
pub enum EnvSource {
    /// The live process environment, snapshotted at read time.
    #[default]
    Process,
    /// A fixed set of variables.
    Fixed(Arc<BTreeMap<String, String>>),
}

impl EnvSource {
    /// Create a fixed source from key-value pairs.
    pub fn fixed<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        EnvSource::Fixed(Arc::new(
            vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        ))
    }

    /// Get the value of a single variable.
    pub fn get(&self, name: &str) -> Option<String> {
        match self {
            EnvSource::Process => std::env::var(name).ok(),
            EnvSource::Fixed(vars) => vars.get(name).cloned(),
        }
    }

    /// Take a snapshot of all variables, sorted by name.
    ///
    /// Variables whose name or value is not valid Unicode are left out.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        match self {
            EnvSource::Process => std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
            EnvSource::Fixed(vars) => vars.as_ref().clone(),
        }
    }

    /// Decode the variables carrying `prefix` from this source.
    pub fn decode(&self, prefix: Option<&str>) -> ConfigMap {
        match prefix {
            Some(prefix) if !prefix.is_empty() => decode_env(prefix, &self.snapshot()),
            _ => ConfigMap::new(),
        }
    }
}

/// Decode every `{prefix}__…` variable of `vars` into a nested mapping.
///
/// The prefix match is case-sensitive. Variables are applied in ascending
/// order of their names, so when two paths collide (one needs a mapping where
/// the other put a scalar) the later name wins. Such collisions are logged.
/// Names with an empty path or an empty segment are skipped.
pub fn decode_env(prefix: &str, vars: &BTreeMap<String, String>) -> ConfigMap {
    let mut result = ConfigMap::new();
    if prefix.is_empty() {
        return result;
    }
    let full_prefix = format!("{prefix}{PATH_SEPARATOR}");

    for (name, raw) in vars {
        let Some(path) = name.strip_prefix(&full_prefix) else {
            continue;
        };
        let segments: Vec<String> = path
            .to_lowercase()
            .split(PATH_SEPARATOR)
            .map(str::to_string)
            .collect();
        if segments.iter().any(String::is_empty) {
            warn!(variable = %name, "Skipping environment variable with an empty path segment");
            continue;
        }
        debug!(variable = %name, path = %segments.join("."), "Decoded environment variable");
        assign(&mut result, &segments, parse_env_value(raw), name);
    }

    result
}

/// Set `value` at `segments` inside `map`, creating mappings along the way.
fn assign(map: &mut ConfigMap, segments: &[String], value: Value, variable: &str) {
    match segments {
        [] => {}
        [leaf] => {
            if let Some(previous @ Value::Object(_)) = map.insert(leaf.clone(), value) {
                warn!(
                    variable = %variable,
                    key = %leaf,
                    replaced = value_kind(&previous),
                    "Environment variable replaced a mapping with a scalar"
                );
            }
        }
        [head, rest @ ..] => {
            let child = map
                .entry(head.clone())
                .or_insert_with(|| Value::Object(ConfigMap::new()));
            if !child.is_object() {
                warn!(
                    variable = %variable,
                    key = %head,
                    replaced = value_kind(child),
                    "Environment variable replaced a scalar with a mapping"
                );
                *child = Value::Object(ConfigMap::new());
            }
            if let Value::Object(child_map) = child {
                assign(child_map, rest, value, variable);
            }
        }
    }
}

/// Coerce a raw environment value. First match wins:
///
/// 1. empty string → null
/// 2. wrapped in matching `'` or `"` quotes → the inner text, uncoerced
/// 3. `true` / `false` (any case) → boolean
/// 4. base-10 integer → integer
/// 5. finite float → float
/// 6. anything else → the string unchanged
pub fn parse_env_value(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    if let Some(inner) = strip_quotes(raw) {
        return Value::String(inner.to_string());
    }
    if raw.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(int) = raw.parse::<i64>() {
        return Value::from(int);
    }
    if let Ok(float) = raw.parse::<f64>()
        && float.is_finite()
    {
        return Value::from(float);
    }
    Value::String(raw.to_string())
}

fn strip_quotes(raw: &str) -> Option<&str> {
    if raw.len() < 2 {
        return None;
    }
    ['"', '\'']
        .into_iter()
        .find_map(|quote| raw.strip_prefix(quote)?.strip_suffix(quote))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_env_value() {
        assert_eq!(parse_env_value(""), Value::Null);
        assert_eq!(parse_env_value("test_string"), json!("test_string"));
        assert_eq!(parse_env_value("'quoted_string'"), json!("quoted_string"));
        assert_eq!(parse_env_value("\"another\""), json!("another"));
        assert_eq!(parse_env_value("true"), json!(true));
        assert_eq!(parse_env_value("TRUE"), json!(true));
        assert_eq!(parse_env_value("False"), json!(false));
        assert_eq!(parse_env_value("123"), json!(123));
        assert_eq!(parse_env_value("-45"), json!(-45));
        assert_eq!(parse_env_value("1.23"), json!(1.23));
        assert_eq!(parse_env_value("-0.5"), json!(-0.5));
        assert_eq!(parse_env_value("MixedCase"), json!("MixedCase"));
    }

    #[test]
    fn test_quotes_disable_coercion() {
        assert_eq!(parse_env_value("'true'"), json!("true"));
        assert_eq!(parse_env_value("\"42\""), json!("42"));
        assert_eq!(parse_env_value("''"), json!(""));
    }

    #[test]
    fn test_unmatched_quotes_stay_literal() {
        assert_eq!(parse_env_value("'"), json!("'"));
        assert_eq!(parse_env_value("\"abc'"), json!("\"abc'"));
        assert_eq!(parse_env_value("'abc"), json!("'abc"));
    }

    #[test]
    fn test_non_finite_floats_stay_strings() {
        assert_eq!(parse_env_value("inf"), json!("inf"));
        assert_eq!(parse_env_value("NaN"), json!("NaN"));
    }

    #[test]
    fn test_integer_overflow_falls_back_to_float() {
        assert_eq!(
            parse_env_value("99999999999999999999"),
            json!(99999999999999999999.0_f64)
        );
    }

    #[test]
    fn test_decode_without_prefix_is_empty() {
        let source = EnvSource::fixed([("APP__A", "1")]);
        assert!(source.decode(None).is_empty());
        assert!(source.decode(Some("")).is_empty());
        assert!(source.decode(Some("NON_EXISTENT")).is_empty());
    }

    #[test]
    fn test_decode_env() {
        let env = vars(&[
            ("TEST_APP__FOO__BAR", "baz"),
            ("TEST_APP__FOO__QUOTED", "'quoted'"),
            ("TEST_APP__A_BOOL", "TRUE"),
            ("TEST_APP__ANOTHER_BOOL", "false"),
            ("TEST_APP__AN_EMPTY_VALUE", ""),
            ("TEST_APP__AN_INT", "123"),
            ("TEST_APP__A_NEG_INT", "-45"),
            ("TEST_APP__A_FLOAT", "1.23"),
            ("TEST_APP__A_NEG_FLOAT", "-0.5"),
            ("TEST_APP__CAMELCASE_VAR", "camelCaseValue"),
            ("TEST_APP__WITH_UNDERSCORE__VAR", "with_underscore_value"),
            ("UNRELATED_VAR", "unrelated"),
            ("test_app__LOWER_PREFIX", "ignored"),
        ]);

        let result = decode_env("TEST_APP", &env);
        assert_eq!(
            Value::Object(result),
            json!({
                "foo": {"bar": "baz", "quoted": "quoted"},
                "a_bool": true,
                "another_bool": false,
                "an_empty_value": null,
                "an_int": 123,
                "a_neg_int": -45,
                "a_float": 1.23,
                "a_neg_float": -0.5,
                "camelcase_var": "camelCaseValue",
                "with_underscore": {"var": "with_underscore_value"},
            })
        );
    }

    #[test]
    fn test_decode_type_ladder() {
        let env = vars(&[
            ("PREFIX__A_BOOL", "TRUE"),
            ("PREFIX__A_FLOAT", "-0.5"),
            ("PREFIX__QUOTED", "'lit'"),
            ("PREFIX__EMPTY", ""),
        ]);
        assert_eq!(
            Value::Object(decode_env("PREFIX", &env)),
            json!({"a_bool": true, "a_float": -0.5, "quoted": "lit", "empty": null})
        );
    }

    #[test]
    fn test_collision_later_name_wins() {
        // "APP__DB" sorts before "APP__DB__HOST", so the mapping replaces the scalar.
        let env = vars(&[("APP__DB", "sqlite"), ("APP__DB__HOST", "localhost")]);
        assert_eq!(
            Value::Object(decode_env("APP", &env)),
            json!({"db": {"host": "localhost"}})
        );

        // Case-folded duplicates: lower-case names sort after upper-case ones.
        let env = vars(&[("APP__PORT", "1"), ("APP__port", "2")]);
        assert_eq!(Value::Object(decode_env("APP", &env)), json!({"port": 2}));
    }

    #[test]
    fn test_scalar_replaces_mapping_at_leaf() {
        let env = vars(&[("APP__A__B__C", "1"), ("APP__A__B", "flat")]);
        // "APP__A__B" < "APP__A__B__C": the scalar is written first, then replaced.
        assert_eq!(
            Value::Object(decode_env("APP", &env)),
            json!({"a": {"b": {"c": 1}}})
        );

        let mut map = ConfigMap::new();
        assign(&mut map, &["a".into(), "b".into()], json!(1), "X");
        assign(&mut map, &["a".into()], json!("flat"), "Y");
        assert_eq!(Value::Object(map), json!({"a": "flat"}));
    }

    #[test]
    fn test_empty_segments_are_skipped() {
        let env = vars(&[("APP__", "x"), ("APP__A____B", "y"), ("APP__OK", "z")]);
        assert_eq!(Value::Object(decode_env("APP", &env)), json!({"ok": "z"}));
    }

    #[test]
    fn test_fixed_source_get() {
        let source = EnvSource::fixed([("SAMPLE_ENV_KEY", "sample_value")]);
        assert_eq!(source.get("SAMPLE_ENV_KEY").as_deref(), Some("sample_value"));
        assert_eq!(source.get("MISSING"), None);
    }
}
