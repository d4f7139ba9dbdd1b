use anyx::FilterOp;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Select,
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl QueryKind {
    fn help(self) -> HelpTopic {
        match self {
            QueryKind::Select => HelpTopic::Select,
            QueryKind::Insert => HelpTopic::Insert,
            QueryKind::Update => HelpTopic::Update,
            QueryKind::Delete => HelpTopic::Delete,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Query(QueryArgs),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterArg {
    pub column: String,
    pub op: FilterOp,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderArg {
    pub column: String,
    pub ascending: bool,
}

#[derive(Debug, Clone)]
pub struct QueryArgs {
    pub kind: QueryKind,
    pub table: String,
    pub columns: Option<String>,
    pub filters: Vec<FilterArg>,
    pub order: Vec<OrderArg>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub single: bool,
    pub values: Option<Value>,
    pub env_file: Option<PathBuf>,
    pub dry_run: bool,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    let kind = match first.as_str() {
        "-h" | "--help" => return Ok(Command::Help(HelpTopic::Root)),
        "select" => QueryKind::Select,
        "insert" => QueryKind::Insert,
        "update" => QueryKind::Update,
        "delete" => QueryKind::Delete,
        _ => anyhow::bail!("unknown command: {first}"),
    };

    parse_query(kind, it.map(|s| s.as_str()))
}

/// Value of `--name <v>` or `--name=<v>`, if `token` is that flag.
fn flag_value<'a>(
    token: &'a str,
    name: &str,
    it: &mut impl Iterator<Item = &'a str>,
) -> anyhow::Result<Option<&'a str>> {
    if token == name {
        let Some(v) = it.next() else {
            anyhow::bail!("{name} requires a value");
        };
        return Ok(Some(v));
    }
    Ok(token
        .strip_prefix(name)
        .and_then(|rest| rest.strip_prefix('=')))
}

const FILTER_FLAGS: [(&str, FilterOp); 9] = [
    ("--eq", FilterOp::Eq),
    ("--neq", FilterOp::Neq),
    ("--gt", FilterOp::Gt),
    ("--gte", FilterOp::Gte),
    ("--lt", FilterOp::Lt),
    ("--lte", FilterOp::Lte),
    ("--like", FilterOp::Like),
    ("--ilike", FilterOp::Ilike),
    ("--in", FilterOp::In),
];

fn parse_query<'a>(kind: QueryKind, mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut table: Option<String> = None;
    let mut columns: Option<String> = None;
    let mut filters: Vec<FilterArg> = Vec::new();
    let mut order: Vec<OrderArg> = Vec::new();
    let mut limit: Option<i64> = None;
    let mut offset: Option<i64> = None;
    let mut single = false;
    let mut values: Option<Value> = None;
    let mut env_file: Option<PathBuf> = None;
    let mut dry_run = false;

    'tokens: while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(kind.help())),
            "--single" => {
                single = true;
                continue;
            }
            "--dry-run" => {
                dry_run = true;
                continue;
            }
            _ => {}
        }

        for (name, op) in FILTER_FLAGS {
            if let Some(v) = flag_value(token, name, &mut it)? {
                filters.push(parse_filter(name, op, v)?);
                continue 'tokens;
            }
        }

        if let Some(v) = flag_value(token, "--is-null", &mut it)? {
            filters.push(FilterArg {
                column: v.to_string(),
                op: FilterOp::Is,
                value: Value::Null,
            });
        } else if let Some(v) = flag_value(token, "--columns", &mut it)? {
            columns = Some(v.to_string());
        } else if let Some(v) = flag_value(token, "--order", &mut it)? {
            order.push(parse_order(v)?);
        } else if let Some(v) = flag_value(token, "--limit", &mut it)? {
            limit = Some(parse_int("--limit", v)?);
        } else if let Some(v) = flag_value(token, "--offset", &mut it)? {
            offset = Some(parse_int("--offset", v)?);
        } else if let Some(v) = flag_value(token, "--values", &mut it)? {
            let parsed: Value = serde_json::from_str(v)
                .map_err(|e| anyhow::anyhow!("--values must be valid JSON: {e}"))?;
            values = Some(parsed);
        } else if let Some(v) = flag_value(token, "--env-file", &mut it)? {
            env_file = Some(PathBuf::from(v));
        } else if token.starts_with('-') {
            anyhow::bail!("unknown argument: {token}");
        } else if table.is_none() {
            table = Some(token.to_string());
        } else {
            anyhow::bail!("unexpected argument: {token}");
        }
    }

    let Some(table) = table else {
        anyhow::bail!("missing table name");
    };

    match kind {
        QueryKind::Select => {
            if values.is_some() {
                anyhow::bail!("--values is not supported for select");
            }
        }
        QueryKind::Insert | QueryKind::Update | QueryKind::Delete => {
            if !order.is_empty() || limit.is_some() || offset.is_some() || single {
                anyhow::bail!("--order, --limit, --offset and --single only apply to select");
            }
            if kind == QueryKind::Insert && !filters.is_empty() {
                anyhow::bail!("filters are not supported for insert");
            }
            if kind == QueryKind::Delete && (values.is_some() || columns.is_some()) {
                anyhow::bail!("--values and --columns are not supported for delete");
            }
            if kind != QueryKind::Delete && values.is_none() {
                anyhow::bail!("--values is required");
            }
        }
    }

    Ok(Command::Query(QueryArgs {
        kind,
        table,
        columns,
        filters,
        order,
        limit,
        offset,
        single,
        values,
        env_file,
        dry_run,
    }))
}

/// Parse `column=value`. Values that parse as JSON keep their type; anything else is a string.
fn parse_filter(flag: &str, op: FilterOp, raw: &str) -> anyhow::Result<FilterArg> {
    let Some((column, value)) = raw.split_once('=') else {
        anyhow::bail!("{flag} expects COLUMN=VALUE, got `{raw}`");
    };
    if column.is_empty() {
        anyhow::bail!("{flag} expects a column name");
    }

    let value = if op == FilterOp::In {
        Value::Array(
            value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(parse_scalar)
                .collect(),
        )
    } else {
        parse_scalar(value)
    };

    Ok(FilterArg {
        column: column.to_string(),
        op,
        value,
    })
}

fn parse_scalar(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Parse `column`, `column:asc` or `column:desc`.
fn parse_order(raw: &str) -> anyhow::Result<OrderArg> {
    let (column, ascending) = match raw.rsplit_once(':') {
        Some((column, "asc")) => (column, true),
        Some((column, "desc")) => (column, false),
        Some((_, other)) => anyhow::bail!("--order direction must be asc or desc, got `{other}`"),
        None => (raw, true),
    };
    if column.is_empty() {
        anyhow::bail!("--order expects a column name");
    }
    Ok(OrderArg {
        column: column.to_string(),
        ascending,
    })
}

fn parse_int(flag: &str, raw: &str) -> anyhow::Result<i64> {
    raw.parse()
        .map_err(|e| anyhow::anyhow!("{flag} expects an integer, got `{raw}`: {e}"))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
anyx - run queries against the Anyx backend

USAGE:
  anyx <COMMAND> <TABLE> [OPTIONS]

COMMANDS:
  select        Read rows
  insert        Insert one or more rows
  update        Update rows matching filters
  delete        Delete rows matching filters

CONFIGURATION:
  VITE_PROJECT_ID or NEXT_PUBLIC_PROJECT_ID
  VITE_ANYX_SERVER_URL or NEXT_PUBLIC_ANYX_SERVER_URL
  Read from the environment first, then from a .env file.

Run `anyx <command> --help` for more."
            );
        }
        HelpTopic::Select => {
            println!(
                "\
USAGE:
  anyx select <TABLE> [OPTIONS]

OPTIONS:
  --columns <COLS>          Select clause, passed through verbatim (default: *)
{FILTER_HELP}
  --order <COL[:asc|desc]>  Order by column (repeatable, default: asc)
  --limit <N>               Maximum rows
  --offset <N>              Rows to skip
  --single                  Ask for a single record
{COMMON_HELP}"
            );
        }
        HelpTopic::Insert => {
            println!(
                "\
USAGE:
  anyx insert <TABLE> --values <JSON> [OPTIONS]

OPTIONS:
  --values <JSON>           Object or array of objects to insert
  --columns <COLS>          Columns to return
{COMMON_HELP}"
            );
        }
        HelpTopic::Update => {
            println!(
                "\
USAGE:
  anyx update <TABLE> --values <JSON> [FILTERS] [OPTIONS]

OPTIONS:
  --values <JSON>           Object of column values to set
  --columns <COLS>          Columns to return
{FILTER_HELP}
{COMMON_HELP}"
            );
        }
        HelpTopic::Delete => {
            println!(
                "\
USAGE:
  anyx delete <TABLE> [FILTERS] [OPTIONS]

OPTIONS:
{FILTER_HELP}
{COMMON_HELP}"
            );
        }
    }
}

const FILTER_HELP: &str = "\
  --eq <COL=VAL>            column = value (also --neq --gt --gte --lt --lte)
  --like <COL=PATTERN>      LIKE match (also --ilike)
  --in <COL=A,B,C>          column IN list
  --is-null <COL>           column IS NULL";

const COMMON_HELP: &str = "\
  --env-file <FILE>         Read settings from this file instead of a discovered .env
  --dry-run                 Print the request payload without sending it
  -h, --help                Print help";

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("anyx")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    fn query(list: &[&str]) -> QueryArgs {
        let Command::Query(q) = parse_args(&args(list)).unwrap() else {
            panic!("expected query command");
        };
        q
    }

    #[test]
    fn no_args_prints_help() {
        assert!(matches!(
            parse_args(&args(&[])).unwrap(),
            Command::Help(HelpTopic::Root)
        ));
    }

    #[test]
    fn subcommand_help() {
        assert!(matches!(
            parse_args(&args(&["update", "--help"])).unwrap(),
            Command::Help(HelpTopic::Update)
        ));
    }

    #[test]
    fn parse_select_with_everything() {
        let q = query(&[
            "select",
            "links",
            "--columns",
            "id, url",
            "--eq",
            "active=true",
            "--gt=clicks=10",
            "--ilike",
            "url=%example%",
            "--in",
            "id=1,2,3",
            "--is-null",
            "deleted_at",
            "--order",
            "clicks:desc",
            "--order=id",
            "--limit",
            "20",
            "--offset=40",
            "--single",
            "--dry-run",
        ]);

        assert_eq!(q.kind, QueryKind::Select);
        assert_eq!(q.table, "links");
        assert_eq!(q.columns.as_deref(), Some("id, url"));
        assert_eq!(
            q.filters,
            vec![
                FilterArg {
                    column: "active".into(),
                    op: FilterOp::Eq,
                    value: json!(true)
                },
                FilterArg {
                    column: "clicks".into(),
                    op: FilterOp::Gt,
                    value: json!(10)
                },
                FilterArg {
                    column: "url".into(),
                    op: FilterOp::Ilike,
                    value: json!("%example%")
                },
                FilterArg {
                    column: "id".into(),
                    op: FilterOp::In,
                    value: json!([1, 2, 3])
                },
                FilterArg {
                    column: "deleted_at".into(),
                    op: FilterOp::Is,
                    value: Value::Null
                },
            ]
        );
        assert_eq!(
            q.order,
            vec![
                OrderArg {
                    column: "clicks".into(),
                    ascending: false
                },
                OrderArg {
                    column: "id".into(),
                    ascending: true
                },
            ]
        );
        assert_eq!(q.limit, Some(20));
        assert_eq!(q.offset, Some(40));
        assert!(q.single);
        assert!(q.dry_run);
    }

    #[test]
    fn filter_flag_prefix_does_not_shadow_longer_flag() {
        let q = query(&["select", "t", "--gte", "a=1", "--lte=b=2"]);
        assert_eq!(q.filters[0].op, FilterOp::Gte);
        assert_eq!(q.filters[1].op, FilterOp::Lte);
    }

    #[test]
    fn parse_insert_values() {
        let q = query(&["insert", "links", "--values", r#"[{"url":"a"},{"url":"b"}]"#]);
        assert_eq!(q.kind, QueryKind::Insert);
        assert_eq!(q.values, Some(json!([{"url": "a"}, {"url": "b"}])));
    }

    #[test]
    fn insert_requires_values() {
        let err = parse_args(&args(&["insert", "links"])).unwrap_err();
        assert!(err.to_string().contains("--values is required"));
    }

    #[test]
    fn delete_rejects_pagination() {
        let err = parse_args(&args(&["delete", "links", "--limit", "1"])).unwrap_err();
        assert!(err.to_string().contains("only apply to select"));
    }

    #[test]
    fn filter_requires_key_value() {
        let err = parse_args(&args(&["select", "links", "--eq", "active"])).unwrap_err();
        assert!(err.to_string().contains("COLUMN=VALUE"));
    }

    #[test]
    fn missing_table_is_an_error() {
        let err = parse_args(&args(&["select", "--single"])).unwrap_err();
        assert!(err.to_string().contains("missing table name"));
    }

    #[test]
    fn unknown_flag_is_an_error() {
        let err = parse_args(&args(&["select", "links", "--bogus"])).unwrap_err();
        assert!(err.to_string().contains("unknown argument"));
    }

    #[test]
    fn non_json_filter_value_is_a_string() {
        let q = query(&["select", "links", "--eq", "slug=hello-world"]);
        assert_eq!(q.filters[0].value, json!("hello-world"));
    }
}
