use serde::Serialize;
use serde_json::Value;

/// Serialize CLI overrides and drop every unset entry.
///
/// Nulls, empty arrays and objects that end up empty are removed so a flag the
/// user did not pass never shadows a value from a config file or the environment.
pub fn strip_unset<T: Serialize>(input: T) -> Value {
    let mut value = serde_json::to_value(input).unwrap_or(Value::Null);
    strip_unset_recursive(&mut value);
    value
}

fn strip_unset_recursive(value: &mut Value) {
    if let Value::Object(map) = value {
        for (_, nested) in map.iter_mut() {
            strip_unset_recursive(nested);
        }

        map.retain(|_, v| match v {
            Value::Null => false,
            Value::Array(arr) => !arr.is_empty(),
            Value::Object(obj) => !obj.is_empty(),
            _ => true,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_unset_removes_nulls_and_empty_sections() {
        let input = json!({
            "run": { "parallel": true, "docker": null, "output_dir": null },
            "container": { "image": null },
            "discovery": { "indicators": [] },
            "parallel": { "max_workers": 2 }
        });

        let stripped = strip_unset(input);
        assert_eq!(
            stripped,
            json!({
                "run": { "parallel": true },
                "parallel": { "max_workers": 2 }
            })
        );
    }

    #[test]
    fn test_strip_unset_keeps_false_and_zero() {
        let stripped = strip_unset(json!({ "run": { "dry_run": false }, "parallel": { "max_workers": 0 } }));
        assert_eq!(stripped["run"]["dry_run"], json!(false));
        assert_eq!(stripped["parallel"]["max_workers"], json!(0));
    }
}
