use matcher::Value;

/// Convert a TOML value into a match candidate.
///
/// Arrays become lists; tables and datetimes have no counterpart.
pub fn toml_to_value(val: &toml::Value) -> Result<Value, String> {
    match val {
        toml::Value::Integer(n) => Ok(Value::Int(*n)),
        toml::Value::Float(f) => Ok(Value::Float(*f)),
        toml::Value::Boolean(b) => Ok(Value::Bool(*b)),
        toml::Value::String(s) => Ok(Value::Str(s.clone())),
        toml::Value::Array(items) => items
            .iter()
            .map(toml_to_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        toml::Value::Table(_) => Err("tables cannot be matched".into()),
        toml::Value::Datetime(dt) => Err(format!("datetime '{}' cannot be matched", dt)),
    }
}

/// Parse a command-line value argument.
///
/// The text is read as a TOML value (`[1, "a", [2]]`, `42`, `"quoted"`); if it
/// isn't valid TOML it is taken as a bare string.
pub fn parse_value_arg(s: &str) -> Result<Value, String> {
    match toml::from_str::<toml::Table>(&format!("value = {}", s)) {
        Ok(table) => match table.get("value") {
            Some(val) => toml_to_value(val),
            None => Ok(Value::Str(s.to_string())),
        },
        Err(_) => Ok(Value::Str(s.to_string())),
    }
}
