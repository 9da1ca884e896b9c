//! Rison 编码（URL 友好的 JSON 变体），用于 `?q=` 查询参数
//!
//! 规则：
//! - `null` / `true` / `false` 编码为 `!n` / `!t` / `!f`
//! - 对象编码为 `(k:v,...)`，键按字典序排列
//! - 数组编码为 `!(v,...)`
//! - 合法标识符形式的字符串原样输出，其余用单引号包裹，`'` 和 `!` 前加 `!`

use serde_json::Value;

/// 不能出现在标识符中的字符
const NOT_ID_CHAR: &str = " '!:(),*@$";
/// 不能作为标识符首字符的字符
const NOT_ID_START: &str = "-0123456789";

/// 编码 JSON 值
pub fn encode(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("!n"),
        Value::Bool(true) => out.push_str("!t"),
        Value::Bool(false) => out.push_str("!f"),
        Value::Number(n) => out.push_str(&n.to_string().replace('+', "")),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push_str("!(");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(')');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            out.push('(');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_value(out, &map[key]);
            }
            out.push(')');
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    if is_id(s) {
        out.push_str(s);
        return;
    }

    out.push('\'');
    for c in s.chars() {
        if c == '\'' || c == '!' {
            out.push('!');
        }
        out.push(c);
    }
    out.push('\'');
}

fn is_id(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        None => false,
        Some(first) if NOT_ID_START.contains(first) || NOT_ID_CHAR.contains(first) => false,
        Some(_) => chars.all(|c| !NOT_ID_CHAR.contains(c)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_table_query_params() {
        let q = encode(&json!({ "schema_name": "schema1", "force": false }));
        assert_eq!(q, "(force:!f,schema_name:schema1)");

        let q = encode(&json!({ "force": true, "schema_name": "schema1" }));
        assert_eq!(q, "(force:!t,schema_name:schema1)");
    }

    #[test]
    fn test_quoted_strings() {
        assert_eq!(encode(&json!("invalid schema")), "'invalid schema'");
        assert_eq!(encode(&json!("it's")), "'it!'s'");
        assert_eq!(encode(&json!("wow!")), "'wow!!'");
        assert_eq!(encode(&json!("")), "''");
        assert_eq!(encode(&json!("1abc")), "'1abc'");
        assert_eq!(encode(&json!("-x")), "'-x'");
    }

    #[test]
    fn test_identifier_strings() {
        assert_eq!(encode(&json!("a-b_c.d")), "a-b_c.d");
        assert_eq!(encode(&json!("public%20data")), "public%20data");
    }

    #[test]
    fn test_scalars_and_arrays() {
        assert_eq!(encode(&Value::Null), "!n");
        assert_eq!(encode(&json!(42)), "42");
        assert_eq!(encode(&json!(-1.5)), "-1.5");
        assert_eq!(encode(&json!([1, "a b", true])), "!(1,'a b',!t)");
        assert_eq!(encode(&json!([])), "!()");
        assert_eq!(encode(&json!({})), "()");
    }

    #[test]
    fn test_nested_object() {
        let q = encode(&json!({ "filters": [{ "col": "name", "value": "x y" }], "page": 0 }));
        assert_eq!(q, "(filters:!((col:name,value:'x y')),page:0)");
    }
}
