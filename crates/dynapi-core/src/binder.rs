//! Turns a loosely-typed argument bag into path, query, header and body
//! values for one operation.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::catalog::Operation;
use crate::error::ClientError;
use crate::parse::parameter::ParameterLocation;

/// Well-known argument key that always carries the request body.
pub const BODY_KEY: &str = "body";

/// Named arguments for one call. Names are case-sensitive; insertion order is
/// kept so body selection by elimination is deterministic.
pub type Arguments = IndexMap<String, Value>;

/// Build an argument bag from anything that serialises to a JSON object.
pub fn arguments_from<T: Serialize>(args: &T) -> Result<Arguments, ClientError> {
    match serde_json::to_value(args) {
        Ok(Value::Object(map)) => Ok(map.into_iter().collect()),
        Ok(other) => Err(ClientError::encoding(
            "arguments",
            format!("expected a map of named arguments, got {}", type_name(&other)),
        )),
        Err(e) => Err(ClientError::encoding("arguments", e.to_string())),
    }
}

/// Pair positional values with the operation's parameters in declaration
/// order. Extra values are dropped.
pub fn name_positional(op: &Operation, args: &[Value]) -> Arguments {
    if args.len() > op.parameters.len() {
        log::debug!(
            "{}: dropping {} positional argument(s) beyond the declared parameters",
            op.operation_id,
            args.len() - op.parameters.len()
        );
    }
    op.parameters
        .iter()
        .zip(args)
        .map(|(param, value)| (param.name.clone(), value.clone()))
        .collect()
}

/// Argument values classified by where they go in the request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArguments {
    /// Path variables, stringified.
    pub path: IndexMap<String, String>,
    /// Query pairs, stringified, in parameter declaration order.
    pub query: Vec<(String, String)>,
    /// Header parameters, stringified.
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// Classify `args` against the parameters of `op`.
///
/// A `null` value counts as absent. Required parameters (all path
/// parameters, plus query and header parameters marked required) that are
/// absent fail with [`ClientError::MissingRequiredParameter`]. Keys that are
/// neither parameters nor the body are ignored.
pub fn bind(op: &Operation, args: &Arguments) -> Result<BoundArguments, ClientError> {
    let mut bound = BoundArguments::default();

    for param in &op.parameters {
        let value = args.get(&param.name).filter(|v| !v.is_null());
        let Some(value) = value else {
            if param.is_required() && param.location != ParameterLocation::Cookie {
                return Err(ClientError::MissingRequiredParameter(param.name.clone()));
            }
            continue;
        };

        match param.location {
            ParameterLocation::Path => {
                let text = scalar_to_string(value, "path parameter", &param.name)?;
                bound.path.insert(param.name.clone(), text);
            }
            ParameterLocation::Query => {
                let text = scalar_to_string(value, "query parameter", &param.name)?;
                bound.query.push((param.name.clone(), text));
            }
            ParameterLocation::Header => {
                let text = scalar_to_string(value, "header parameter", &param.name)?;
                bound.headers.push((param.name.clone(), text));
            }
            ParameterLocation::Cookie => {
                log::warn!(
                    "{}: cookie parameter '{}' is not supported and was not sent",
                    op.operation_id,
                    param.name
                );
            }
        }
    }

    bound.body = select_body(op, args);
    Ok(bound)
}

/// The explicit `body` key wins, unless a declared parameter is itself named
/// `body`. Otherwise, for operations that declare a request body, the first
/// argument that is not a declared parameter is used. A `null` body is no body.
fn select_body(op: &Operation, args: &Arguments) -> Option<Value> {
    if !op.is_declared(BODY_KEY) {
        if let Some(body) = args.get(BODY_KEY) {
            return (!body.is_null()).then(|| body.clone());
        }
    }

    if !op.has_request_body() {
        return None;
    }

    let picked = args
        .iter()
        .find(|(key, value)| !op.is_declared(key) && !value.is_null());
    match picked {
        Some((key, value)) => {
            log::debug!(
                "{}: using argument '{key}' as the request body",
                op.operation_id
            );
            Some(value.clone())
        }
        None => {
            if op.request_body.as_ref().is_some_and(|rb| rb.required) {
                log::debug!("{}: required request body not supplied", op.operation_id);
            }
            None
        }
    }
}

/// Render a scalar argument as text. Sequences and maps have no agreed
/// encoding in a path, query string or header and are rejected.
pub fn scalar_to_string(value: &Value, what: &str, name: &str) -> Result<String, ClientError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        Value::Array(_) | Value::Object(_) => Err(ClientError::encoding(
            format!("{what} '{name}'"),
            format!("{} values are not supported", type_name(value)),
        )),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "map",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{HttpMethod, Parameter, RequestBodyInfo};
    use serde_json::json;

    fn param(name: &str, location: ParameterLocation, required: bool) -> Parameter {
        Parameter {
            name: name.to_string(),
            location,
            required,
            description: None,
        }
    }

    fn make_op(
        method: HttpMethod,
        path: &str,
        parameters: Vec<Parameter>,
        body: bool,
    ) -> Operation {
        Operation {
            operation_id: "testOp".to_string(),
            synthesized_id: false,
            method,
            path: path.to_string(),
            summary: None,
            description: None,
            tags: Vec::new(),
            deprecated: false,
            parameters,
            request_body: body.then(|| RequestBodyInfo {
                required: false,
                content_type: Some("application/json".to_string()),
                description: None,
            }),
        }
    }

    fn args(value: Value) -> Arguments {
        arguments_from(&value).unwrap()
    }

    #[test]
    fn test_positional_pairs_in_order_and_drops_excess() {
        let op = make_op(
            HttpMethod::Get,
            "/users/{id}",
            vec![
                param("id", ParameterLocation::Path, true),
                param("verbose", ParameterLocation::Query, false),
            ],
            false,
        );
        let named = name_positional(&op, &[json!(42), json!(true), json!("extra")]);
        assert_eq!(named.len(), 2);
        assert_eq!(named["id"], json!(42));
        assert_eq!(named["verbose"], json!(true));

        assert!(name_positional(&op, &[]).is_empty());
    }

    #[test]
    fn test_classifies_locations() {
        let op = make_op(
            HttpMethod::Get,
            "/users/{id}",
            vec![
                param("id", ParameterLocation::Path, true),
                param("q", ParameterLocation::Query, false),
                param("X-Trace", ParameterLocation::Header, false),
            ],
            false,
        );
        let bound = bind(
            &op,
            &args(json!({"id": 7, "q": "term", "X-Trace": 99, "unrelated": 1})),
        )
        .unwrap();
        assert_eq!(bound.path["id"], "7");
        assert_eq!(bound.query, vec![("q".to_string(), "term".to_string())]);
        assert_eq!(
            bound.headers,
            vec![("X-Trace".to_string(), "99".to_string())]
        );
        assert!(bound.body.is_none());
    }

    #[test]
    fn test_missing_path_parameter() {
        let op = make_op(
            HttpMethod::Get,
            "/users/{id}",
            vec![param("id", ParameterLocation::Path, false)],
            false,
        );
        let err = bind(&op, &args(json!({"id": null}))).unwrap_err();
        assert!(matches!(err, ClientError::MissingRequiredParameter(name) if name == "id"));
    }

    #[test]
    fn test_missing_required_query_parameter() {
        let op = make_op(
            HttpMethod::Get,
            "/search",
            vec![param("q", ParameterLocation::Query, true)],
            false,
        );
        assert!(matches!(
            bind(&op, &Arguments::new()),
            Err(ClientError::MissingRequiredParameter(_))
        ));
    }

    #[test]
    fn test_argument_names_are_case_sensitive() {
        let op = make_op(
            HttpMethod::Get,
            "/users/{id}",
            vec![param("id", ParameterLocation::Path, true)],
            false,
        );
        assert!(bind(&op, &args(json!({"ID": 1}))).is_err());
    }

    #[test]
    fn test_explicit_body_key_wins() {
        let op = make_op(
            HttpMethod::Post,
            "/items",
            vec![param("tenant", ParameterLocation::Query, false)],
            true,
        );
        let bound = bind(
            &op,
            &args(json!({"payload": {"a": 1}, "body": {"name": "X"}})),
        )
        .unwrap();
        assert_eq!(bound.body, Some(json!({"name": "X"})));
    }

    #[test]
    fn test_body_by_elimination() {
        let op = make_op(
            HttpMethod::Post,
            "/items",
            vec![param("tenant", ParameterLocation::Query, false)],
            true,
        );
        let bound = bind(
            &op,
            &args(json!({"tenant": "acme", "payload": {"name": "X"}})),
        )
        .unwrap();
        assert_eq!(bound.query, vec![("tenant".to_string(), "acme".to_string())]);
        assert_eq!(bound.body, Some(json!({"name": "X"})));
    }

    #[test]
    fn test_null_body_is_absent() {
        let op = make_op(HttpMethod::Post, "/items", Vec::new(), true);
        let bound = bind(&op, &args(json!({"body": null}))).unwrap();
        assert!(bound.body.is_none());

        let bound = bind(&op, &args(json!({"skip": null, "payload": {"a": 1}}))).unwrap();
        assert_eq!(bound.body, Some(json!({"a": 1})));
    }

    #[test]
    fn test_no_body_without_request_body() {
        let op = make_op(HttpMethod::Get, "/items", Vec::new(), false);
        let bound = bind(&op, &args(json!({"payload": {"name": "X"}}))).unwrap();
        assert!(bound.body.is_none());
    }

    #[test]
    fn test_parameter_named_body_is_not_the_request_body() {
        let op = make_op(
            HttpMethod::Get,
            "/search",
            vec![param("body", ParameterLocation::Query, false)],
            false,
        );
        let bound = bind(&op, &args(json!({"body": "text"}))).unwrap();
        assert_eq!(bound.query, vec![("body".to_string(), "text".to_string())]);
        assert!(bound.body.is_none());
    }

    #[test]
    fn test_composite_query_value_rejected() {
        let op = make_op(
            HttpMethod::Get,
            "/search",
            vec![param("tags", ParameterLocation::Query, false)],
            false,
        );
        let err = bind(&op, &args(json!({"tags": ["a", "b"]}))).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Encoding);
        assert!(err.to_string().contains("query parameter 'tags'"));
    }

    #[test]
    fn test_cookie_parameters_are_skipped() {
        let op = make_op(
            HttpMethod::Get,
            "/session",
            vec![param("sid", ParameterLocation::Cookie, true)],
            false,
        );
        let bound = bind(&op, &args(json!({"sid": "abc"}))).unwrap();
        assert_eq!(bound, BoundArguments::default());
        assert!(bind(&op, &Arguments::new()).is_ok());
    }

    #[test]
    fn test_arguments_from_rejects_non_maps() {
        assert!(arguments_from(&json!([1, 2])).is_err());
        assert!(arguments_from(&std::collections::BTreeMap::from([(1, 2)])).is_ok());
        let err = arguments_from(&std::collections::HashMap::from([((1, 2), 3)])).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Encoding);
    }
}
