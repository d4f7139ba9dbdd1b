use crate::cli::{FilterArg, QueryArgs, QueryKind};
use anyx::{
    AnyxClient, ClientOptions, DotenvSource, EnvSource, FilterOp, LayeredSource, OrderOptions,
    QueryBuilder, ReqwestTransport, TracingMonitor,
};
use serde_json::Value;

pub async fn run(args: QueryArgs) -> anyhow::Result<()> {
    let client = build_client(&args)?;
    let qb = build_query(&client, &args);

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&qb.to_payload())?);
        return Ok(());
    }

    let rows = qb.execute().await?;
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn build_client(args: &QueryArgs) -> anyhow::Result<AnyxClient> {
    let dotenv = match &args.env_file {
        Some(path) => DotenvSource::from_path(path)?,
        None => DotenvSource::discover(),
    };
    tracing::debug!(entries = dotenv.len(), "loaded .env values");

    let config = LayeredSource::new()
        .with_source(EnvSource)
        .with_source(dotenv);
    let options = ClientOptions::new().monitor(TracingMonitor::new().level(tracing::Level::DEBUG));

    Ok(AnyxClient::with_options(
        ReqwestTransport::new(),
        config,
        options,
    ))
}

pub(crate) fn build_query(client: &AnyxClient, args: &QueryArgs) -> QueryBuilder {
    let mut qb = client.from(&args.table);

    if let Some(columns) = &args.columns {
        qb = qb.select(columns);
    }

    qb = match args.kind {
        QueryKind::Select => qb,
        QueryKind::Insert => qb.insert(args.values.clone().unwrap_or(Value::Null)),
        QueryKind::Update => qb.update(args.values.clone().unwrap_or(Value::Null)),
        QueryKind::Delete => qb.delete(),
    };

    for filter in &args.filters {
        qb = apply_filter(qb, filter);
    }
    for order in &args.order {
        qb = qb.order(&order.column, OrderOptions::ascending(order.ascending));
    }
    if let Some(limit) = args.limit {
        qb = qb.limit(limit);
    }
    if let Some(offset) = args.offset {
        qb = qb.offset(offset);
    }
    if args.single {
        qb = qb.single();
    }
    qb
}

fn apply_filter(qb: QueryBuilder, filter: &FilterArg) -> QueryBuilder {
    let column = filter.column.as_str();
    let value = filter.value.clone();
    match filter.op {
        FilterOp::Eq => qb.eq(column, value),
        FilterOp::Neq => qb.neq(column, value),
        FilterOp::Gt => qb.gt(column, value),
        FilterOp::Gte => qb.gte(column, value),
        FilterOp::Lt => qb.lt(column, value),
        FilterOp::Lte => qb.lte(column, value),
        FilterOp::Like => qb.like(column, &pattern(value)),
        FilterOp::Ilike => qb.ilike(column, &pattern(value)),
        FilterOp::In => match value {
            Value::Array(items) => qb.in_list(column, items),
            other => qb.in_list(column, [other]),
        },
        FilterOp::Is => qb.is(column, value),
    }
}

fn pattern(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Command, parse_args};
    use anyx::StaticSource;
    use serde_json::json;

    fn payload(list: &[&str]) -> Value {
        let args: Vec<String> = std::iter::once("anyx")
            .chain(list.iter().copied())
            .map(String::from)
            .collect();
        let Command::Query(q) = parse_args(&args).unwrap() else {
            panic!("expected query command");
        };
        let client = AnyxClient::new(ReqwestTransport::new(), StaticSource::new());
        build_query(&client, &q).to_payload().to_json().unwrap()
    }

    #[test]
    fn select_payload_from_args() {
        assert_eq!(
            payload(&[
                "select", "links", "--columns", "id", "--eq", "owner=7", "--in", "tag=a,b",
                "--order", "clicks:desc", "--limit", "5", "--single",
            ]),
            json!({
                "table": "links",
                "operation": "select",
                "select": "id",
                "filters": [
                    {"column": "owner", "operator": "eq", "value": 7},
                    {"column": "tag", "operator": "in", "value": ["a", "b"]}
                ],
                "order": [{"column": "clicks", "ascending": false}],
                "limit": 5,
                "single": true
            })
        );
    }

    #[test]
    fn numeric_like_pattern_is_sent_as_string() {
        let p = payload(&["select", "codes", "--like", "code=42"]);
        assert_eq!(p["filters"][0]["value"], json!("42"));
    }

    #[test]
    fn update_payload_from_args() {
        assert_eq!(
            payload(&[
                "update", "links", "--values", r#"{"clicks":0}"#, "--is-null", "deleted_at",
            ]),
            json!({
                "table": "links",
                "operation": "update",
                "values": {"clicks": 0},
                "filters": [{"column": "deleted_at", "operator": "is", "value": null}],
                "select": "*"
            })
        );
    }

    #[test]
    fn insert_single_object_is_wrapped() {
        let p = payload(&["insert", "links", "--values", r#"{"url":"a"}"#]);
        assert_eq!(p["values"], json!([{"url": "a"}]));
    }
}
