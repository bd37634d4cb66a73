//! Dialect type spelling to canonical type mapping

/// Map a dialect type spelling to the canonical lowercase type vocabulary.
///
/// Matching is case-insensitive and whitespace-insensitive for multi-word
/// phrases (`DOUBLE  PRECISION`). Spellings are only collapsed within a family;
/// unrecognized spellings pass through unchanged.
pub fn normalize_type(raw: &str) -> String {
    let key = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase();

    let canonical = match key.as_str() {
        // Character
        "VARCHAR2" | "VARCHAR" | "CHARACTER VARYING" | "CHAR VARYING" => "varchar",
        "NVARCHAR2"
        | "NVARCHAR"
        | "NATIONAL CHARACTER VARYING"
        | "NATIONAL CHAR VARYING" => "nvarchar",
        "CHAR" | "CHARACTER" => "char",
        "NCHAR" | "NATIONAL CHARACTER" | "NATIONAL CHAR" => "nchar",
        "CLOB" => "clob",
        "NCLOB" => "nclob",
        "LONG" => "long",

        // Numeric
        "NUMBER" | "NUMERIC" => "numeric",
        "DECIMAL" | "DEC" => "decimal",
        "INTEGER" | "INT" => "int",
        "SMALLINT" => "smallint",
        "BIGINT" => "bigint",
        "FLOAT" | "BINARY_FLOAT" => "float",
        "REAL" => "real",
        "DOUBLE PRECISION" | "DOUBLE" | "BINARY_DOUBLE" => "double",

        // Date and time
        "DATE" => "date",
        "TIMESTAMP" => "timestamp",
        "TIMESTAMP WITH TIME ZONE" => "timestamptz",
        "TIMESTAMP WITH LOCAL TIME ZONE" => "timestampltz",
        "INTERVAL" => "interval",

        // Binary and large objects
        "BLOB" => "blob",
        "RAW" => "raw",
        "LONG RAW" => "long raw",
        "BFILE" => "bfile",

        // Vendor special
        "ROWID" | "UROWID" => "rowid",
        "XMLTYPE" | "SYS.XMLTYPE" => "xml",
        "JSON" => "json",
        "SDO_GEOMETRY" | "MDSYS.SDO_GEOMETRY" => "geometry",
        "BOOLEAN" => "boolean",

        _ => return raw.to_string(),
    };

    canonical.to_string()
}
