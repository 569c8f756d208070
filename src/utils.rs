// src/utils.rs
use crate::import::TargetField;

/// Parse a `COLUMN=FIELD` mapping override. `none` or an empty field unmaps the column.
pub fn parse_column_override(raw: &str) -> Result<(String, Option<TargetField>), String> {
    let (column, field) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected COLUMN=FIELD, got '{}'", raw))?;

    let column = column.trim();
    if column.is_empty() {
        return Err(format!("missing column name in '{}'", raw));
    }

    let field = field.trim().to_lowercase();
    let target = match field.as_str() {
        "" | "none" | "skip" => None,
        key => Some(TargetField::from_key(key).ok_or_else(|| {
            format!(
                "unknown field '{}'. Known fields: {}",
                key,
                known_fields().join(", ")
            )
        })?),
    };

    Ok((column.to_string(), target))
}

fn known_fields() -> Vec<&'static str> {
    TargetField::ALL.iter().map(|f| f.key()).collect()
}

/// Human-readable byte size for upload summaries
pub fn format_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;

    let bytes_f = bytes as f64;
    if bytes_f >= MIB {
        format!("{:.1} MB", bytes_f / MIB)
    } else if bytes_f >= KIB {
        format!("{:.1} KB", bytes_f / KIB)
    } else {
        format!("{} B", bytes)
    }
}
