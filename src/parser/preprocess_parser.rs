//! Vendor-syntax preprocessing for the grammar-based extractor
//!
//! The raw script is pushed through an ordered list of independent rewrite
//! rules, each a pure `&str -> String` function. The rules strip constructs the
//! generic grammar cannot digest and rewrite a few vendor-only spellings into
//! portable equivalents. Nothing here fails: text no rule recognizes is left in
//! place, and the grammar parser may later reject that one statement.
//!
//! ## Rules, in application order
//!
//! 1. procedural blocks (`CREATE [OR REPLACE] PROCEDURE|FUNCTION|PACKAGE|TRIGGER|TYPE ... END [name];`)
//! 2. anonymous blocks (`DECLARE|BEGIN ... END;`)
//! 3. dynamic SQL (`EXECUTE IMMEDIATE '...'`, `EXEC proc(...)`)
//! 4. SQL*Plus session commands (`SET`, `SPOOL`, `PROMPT`, `REM`, `WHENEVER`, `EXIT`, `/`)
//! 5. identity columns -> `AUTO_INCREMENT`
//! 6. `DEFAULT seq.NEXTVAL` -> sentinel literal
//! 7. default pseudo-functions (`SYSDATE`, `SYS_GUID()`, ...) -> quoted sentinels
//! 8. `(n BYTE|CHAR)` length semantics -> `(n)`
//! 9. storage and physical clauses
//! 10. `CHECK (...)` constraints -> inert comment
//!
//! After the rules, only `CREATE TABLE`, `CREATE [UNIQUE] INDEX` and
//! `ALTER TABLE` statements are kept.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::identifier_utils::{normalize_identifier, IDENT};
use super::statement_splitter::retain_schema_statements;
use crate::util::extract_balanced_parens;

/// Sentinel default written in place of `seq.NEXTVAL`
pub const SEQUENCE_DEFAULT_SENTINEL: &str = "'SEQUENCE_NEXTVAL'";

/// Placeholder left where a CHECK constraint was removed
pub const CHECK_PLACEHOLDER: &str = " /* check constraint */ ";

/// A named, pure text rewrite
#[derive(Debug, Clone, Copy)]
pub struct RewriteRule {
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

/// All rewrite rules, applied left to right by [`preprocess`]
pub const REWRITE_RULES: &[RewriteRule] = &[
    RewriteRule {
        name: "procedural_blocks",
        apply: strip_procedural_blocks,
    },
    RewriteRule {
        name: "anonymous_blocks",
        apply: strip_anonymous_blocks,
    },
    RewriteRule {
        name: "dynamic_sql",
        apply: strip_dynamic_sql,
    },
    RewriteRule {
        name: "session_commands",
        apply: strip_session_commands,
    },
    RewriteRule {
        name: "identity_columns",
        apply: rewrite_identity_columns,
    },
    RewriteRule {
        name: "sequence_defaults",
        apply: rewrite_sequence_defaults,
    },
    RewriteRule {
        name: "default_functions",
        apply: rewrite_default_functions,
    },
    RewriteRule {
        name: "length_semantics",
        apply: strip_length_semantics,
    },
    RewriteRule {
        name: "storage_clauses",
        apply: strip_storage_clauses,
    },
    RewriteRule {
        name: "check_constraints",
        apply: neutralize_check_constraints,
    },
];

/// Run every rewrite rule, then keep only schema statements.
pub fn preprocess(text: &str) -> String {
    let rewritten = REWRITE_RULES
        .iter()
        .fold(text.to_string(), |sql, rule| (rule.apply)(&sql));
    retain_schema_statements(&rewritten)
}

// ---------------------------------------------------------------------------
// Procedural code
// ---------------------------------------------------------------------------

static PROCEDURAL_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?is)\bCREATE\s+(?:OR\s+REPLACE\s+)?(?:(?:NON)?EDITIONABLE\s+)?(PACKAGE\s+BODY|PACKAGE|TYPE\s+BODY|TYPE|PROCEDURE|FUNCTION|TRIGGER)\s+(?:{id}\s*\.\s*)?({id})",
        id = IDENT
    ))
    .unwrap()
});

static BLOCK_END_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\bEND\b(?:\s*({id}))?\s*;", id = IDENT)).unwrap()
});

/// Object types (`CREATE TYPE t AS OBJECT (...)`) carry no body and end at
/// their own terminator.
static TYPE_SPEC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*(?:FORCE\s+)?(?:AUTHID\s+\w+\s+)?(?:AS|IS|UNDER)\s+(?:OBJECT|TABLE\s+OF|VARRAY|VARYING|[A-Za-z_])")
        .unwrap()
});

/// Byte offset just past the `END [name];` closing the block whose header ends
/// at `body_start`, or `None` when no terminator exists.
fn find_block_end(sql: &str, body_start: usize, block_name: &str) -> Option<usize> {
    let mut first_plain = None;
    for caps in BLOCK_END_RE.captures_iter(&sql[body_start..]) {
        let whole = caps.get(0)?;
        match caps.get(1).map(|m| normalize_identifier(m.as_str())) {
            Some(name) if name.eq_ignore_ascii_case(block_name) => {
                return Some(body_start + whole.end());
            }
            Some(name)
                if ["IF", "LOOP", "CASE"]
                    .iter()
                    .any(|kw| name.eq_ignore_ascii_case(kw)) => {}
            _ => {
                if first_plain.is_none() {
                    first_plain = Some(body_start + whole.end());
                }
            }
        }
    }
    first_plain
}

fn statement_end(sql: &str, from: usize) -> usize {
    sql[from..].find(';').map(|i| from + i + 1).unwrap_or(sql.len())
}

/// Remove stored procedure, function, package, trigger, and type definitions.
pub fn strip_procedural_blocks(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut pos = 0;

    while let Some(caps) = PROCEDURAL_HEADER_RE.captures_at(sql, pos) {
        let (Some(header), Some(kind), Some(name)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            break;
        };
        out.push_str(&sql[pos..header.start()]);

        let is_type_spec = kind.as_str().eq_ignore_ascii_case("TYPE")
            && TYPE_SPEC_RE.is_match(&sql[header.end()..])
            && !BLOCK_END_RE.is_match(&sql[header.end()..statement_end(sql, header.end())]);
        let end = if is_type_spec {
            statement_end(sql, header.end())
        } else {
            let block_name = normalize_identifier(name.as_str());
            find_block_end(sql, header.end(), &block_name)
                .unwrap_or_else(|| statement_end(sql, header.end()))
        };

        out.push('\n');
        pos = end;
    }

    out.push_str(&sql[pos..]);
    out
}

static ANON_BLOCK_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^[ \t]*(?:DECLARE|BEGIN)\b").unwrap());

static ANON_BLOCK_END_TOP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^END\s*;").unwrap());

static ANON_BLOCK_END_ANY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^[ \t]*END\s*;").unwrap());

/// Remove anonymous PL/SQL blocks that start at the beginning of a line.
pub fn strip_anonymous_blocks(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut pos = 0;

    while let Some(start) = ANON_BLOCK_START_RE.find_at(sql, pos) {
        let end = ANON_BLOCK_END_TOP_RE
            .find_at(sql, start.end())
            .or_else(|| ANON_BLOCK_END_ANY_RE.find_at(sql, start.end()));
        let Some(end) = end else {
            break;
        };
        out.push_str(&sql[pos..start.start()]);
        out.push('\n');
        pos = end.end();
    }

    out.push_str(&sql[pos..]);
    out
}

static DYNAMIC_SQL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bEXEC(?:UTE)?\s+IMMEDIATE\s+(?:'(?:[^']|'')*'|[^;]*)[^;]*;?").unwrap()
});

static EXEC_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^[ \t]*EXEC(?:UTE)?\b[^\n]*$").unwrap());

/// Remove `EXECUTE IMMEDIATE` statements and SQL*Plus `EXEC` calls.
pub fn strip_dynamic_sql(sql: &str) -> String {
    let sql = DYNAMIC_SQL_RE.replace_all(sql, "");
    EXEC_CALL_RE.replace_all(&sql, "").into_owned()
}

// ---------------------------------------------------------------------------
// Script administration
// ---------------------------------------------------------------------------

static SESSION_COMMAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^[ \t]*(?:SET[ \t]+\w+[^\n]*|SPOOL\b[^\n]*|PROMPT\b[^\n]*|REM(?:ARK)?\b[^\n]*|WHENEVER[ \t]+(?:SQLERROR|OSERROR)\b[^\n]*|EXIT\b[^\n]*|QUIT\b[^\n]*|CONNECT\b[^\n]*|(?:UN)?DEFINE\b[^\n]*|/[ \t]*\r?)$",
    )
    .unwrap()
});

/// Remove SQL*Plus session-control lines and `/` script delimiters.
pub fn strip_session_commands(sql: &str) -> String {
    SESSION_COMMAND_RE.replace_all(sql, "").into_owned()
}

// ---------------------------------------------------------------------------
// Column-level rewrites
// ---------------------------------------------------------------------------

static IDENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)\bGENERATED\s+(?:ALWAYS|BY\s+DEFAULT(?:\s+ON\s+NULL)?)\s+AS\s+IDENTITY(?:\s*\((?:[^()]|\([^()]*\))*\))?",
    )
    .unwrap()
});

/// Rewrite identity column syntax to `AUTO_INCREMENT`.
pub fn rewrite_identity_columns(sql: &str) -> String {
    IDENTITY_RE.replace_all(sql, "AUTO_INCREMENT").into_owned()
}

static SEQUENCE_DEFAULT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\bDEFAULT\s+(?:ON\s+NULL\s+)?(?:{id}\s*\.\s*)?{id}\s*\.\s*NEXTVAL\b",
        id = IDENT
    ))
    .unwrap()
});

/// Rewrite `DEFAULT seq.NEXTVAL` to a literal sentinel default.
pub fn rewrite_sequence_defaults(sql: &str) -> String {
    SEQUENCE_DEFAULT_RE
        .replace_all(sql, format!("DEFAULT {}", SEQUENCE_DEFAULT_SENTINEL))
        .into_owned()
}

static DEFAULT_FUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bDEFAULT\s+(?:ON\s+NULL\s+)?(SYSDATE|SYSTIMESTAMP|CURRENT_TIMESTAMP|CURRENT_DATE|LOCALTIMESTAMP|SYS_GUID|USER)\b(\s*\(\s*\d*\s*\))?",
    )
    .unwrap()
});

/// Rewrite date/user/guid pseudo-functions in defaults to quoted sentinels.
pub fn rewrite_default_functions(sql: &str) -> String {
    DEFAULT_FUNCTION_RE
        .replace_all(sql, |caps: &Captures| {
            let function = caps[1].to_ascii_uppercase();
            match caps.get(2) {
                Some(_) if function == "SYS_GUID" => format!("DEFAULT '{}()'", function),
                _ => format!("DEFAULT '{}'", function),
            }
        })
        .into_owned()
}

static LENGTH_SEMANTICS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(\s*(\d+)\s+(?:BYTE|CHAR)\s*\)").unwrap());

/// Rewrite `VARCHAR2(50 BYTE)` style lengths to `(50)`.
pub fn strip_length_semantics(sql: &str) -> String {
    LENGTH_SEMANTICS_RE.replace_all(sql, "($1)").into_owned()
}

// ---------------------------------------------------------------------------
// Physical clauses
// ---------------------------------------------------------------------------

/// Words a trailing physical keyword may follow: a closing paren, the end of
/// a constraint or referential action, or another physical keyword.
const PHYSICAL_CONTEXT: &str = r"(\)\s*|\b(?:NULL|KEY|UNIQUE|CASCADE|ACTION|RESTRICT|LOCAL|REVERSE|IMMEDIATE|DEFERRED|MOVEMENT|(?:NO)?LOGGING|(?:NO)?COMPRESS|BASIC|ADVANCED|OLTP|QUERY|ARCHIVE|LOW|HIGH|(?:NO)?PARALLEL|(?:NO)?CACHE|(?:NO)?MONITORING|ENABLE|DISABLE|(?:NO)?VALIDATE|(?:NO)?RELY|\d+)\s+)";

/// Ordered: LOB storage before STORAGE, TABLESPACE before USING INDEX.
/// Patterns with a capture group keep the context they matched after.
static STORAGE_CLAUSE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        format!(
            r"(?is)\bLOB\s*\([^)]*\)\s*STORE\s+AS\b(?:\s+(?:SECUREFILE|BASICFILE))?(?:\s+{id})?(?:\s*\((?:[^()]|\([^()]*\))*\))?",
            id = IDENT
        ),
        r"(?is)\bSTORAGE\s*\([^)]*\)".to_string(),
        format!(r"(?i)\bTABLESPACE\s+{id}", id = IDENT),
        r"(?i)\b(?:PCTFREE|PCTUSED|INITRANS|MAXTRANS|PCTTHRESHOLD)\s+\d+".to_string(),
        r"(?i)\bSEGMENT\s+CREATION\s+(?:IMMEDIATE|DEFERRED)\b".to_string(),
        r"(?i)\b(?:ENABLE|DISABLE)\s+ROW\s+MOVEMENT\b".to_string(),
        format!(
            r"(?is)\bSUPPLEMENTAL\s+LOG\s+(?:DATA\s*\([^)]*\)\s*COLUMNS|GROUP\s+{id}\s*\([^)]*\)(?:\s*ALWAYS)?)",
            id = IDENT
        ),
        format!(
            r"(?is)\bUSING\s+INDEX\b(?:\s*\((?:[^()]|\([^()]*\))*\)|\s+(?:{id}\s*\.\s*)?{id})?",
            id = IDENT
        ),
        format!(r"(?i){ctx}(?:NO)?LOGGING\b", ctx = PHYSICAL_CONTEXT),
        format!(
            r"(?i){ctx}(?:NO)?COMPRESS\b(?:\s+(?:BASIC|ADVANCED(?:\s+(?:LOW|HIGH))?|FOR\s+(?:OLTP|QUERY|ARCHIVE)(?:\s+(?:LOW|HIGH))?|\d+))?",
            ctx = PHYSICAL_CONTEXT
        ),
        format!(
            r"(?i){ctx}(?:NOPARALLEL\b|PARALLEL\b(?:\s+\d+)?)",
            ctx = PHYSICAL_CONTEXT
        ),
        format!(r"(?i){ctx}(?:NOCACHE|(?:NO)?MONITORING)\b", ctx = PHYSICAL_CONTEXT),
        format!(
            r"(?i){ctx}(?:(?:ENABLE|DISABLE)(?:\s+(?:NO)?VALIDATE)?|(?:NO)?VALIDATE|(?:NO)?RELY)\b",
            ctx = PHYSICAL_CONTEXT
        ),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// Remove storage, tablespace, logging, compression, parallelism, constraint
/// state, `USING INDEX`, LOB storage, and supplemental-log clauses.
///
/// Each pattern is applied until the text stops changing, so a run such as
/// `) NOCOMPRESS NOLOGGING ENABLE NOVALIDATE` is removed one keyword at a time
/// while a column named `logging` is left alone.
pub fn strip_storage_clauses(sql: &str) -> String {
    STORAGE_CLAUSE_RES.iter().fold(sql.to_string(), |mut acc, re| {
        loop {
            let next = re.replace_all(&acc, "${1}").into_owned();
            if next == acc {
                return acc;
            }
            acc = next;
        }
    })
}

static CHECK_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(,\s*)?(?:\bCONSTRAINT\s+{id}\s+)?\bCHECK\s*\(",
        id = IDENT
    ))
    .unwrap()
});

/// Replace `[CONSTRAINT name] CHECK (...)` with an inert comment. A table-level
/// check clause loses its leading comma as well.
pub fn neutralize_check_constraints(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut pos = 0;

    while let Some(m) = CHECK_START_RE.find_at(sql, pos) {
        let paren = m.end() - 1;
        let Some((_, consumed)) = extract_balanced_parens(&sql[paren..]) else {
            break;
        };
        out.push_str(&sql[pos..m.start()]);
        out.push_str(CHECK_PLACEHOLDER);
        pos = paren + consumed;
    }

    out.push_str(&sql[pos..]);
    out
}
