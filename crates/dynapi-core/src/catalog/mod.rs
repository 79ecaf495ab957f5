pub mod naming;
pub mod operation;

use indexmap::IndexMap;

use crate::parse;
use crate::parse::operation::PathItem;
use crate::parse::parameter::ParameterOrRef;
use crate::parse::request_body::RequestBodyOrRef;
use crate::parse::spec::OpenApiSpec;

pub use naming::synthesize_operation_id;
pub use operation::{
    HttpMethod, Operation, OperationInfo, Parameter, ParameterInfo, RequestBodyInfo,
};

use naming::relaxed_key;

/// Registry of callable operations keyed by lower-cased operationId.
///
/// Read-only after [`Catalog::build`]; safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    operations: IndexMap<String, Operation>,
}

impl Catalog {
    /// Register every (path, method) pair of a dereferenced spec.
    ///
    /// Paths are visited in document order and methods in [`HttpMethod::ALL`]
    /// order. When two operations share a key the later one replaces the
    /// earlier, keeping the earlier position.
    pub fn build(spec: &OpenApiSpec) -> Self {
        let mut operations: IndexMap<String, Operation> = IndexMap::new();

        for (path, item) in &spec.paths {
            if item.trace.is_some() {
                log::debug!("skipping TRACE {path}: method not supported");
            }
            let path_params = resolve_parameters(&item.parameters);
            for (method, op) in path_operations(item) {
                let operation = build_operation(method, path, op, &path_params);
                let key = operation.key();
                if let Some(previous) = operations.get(&key) {
                    log::warn!(
                        "operationId '{}' ({} {}) replaces '{}' ({} {})",
                        operation.operation_id,
                        operation.method.as_str(),
                        operation.path,
                        previous.operation_id,
                        previous.method.as_str(),
                        previous.path
                    );
                }
                operations.insert(key, operation);
            }
        }

        Self { operations }
    }

    /// Case-insensitive lookup. Falls back to the camelCase spelling of
    /// snake- or kebab-case names.
    pub fn lookup(&self, name: &str) -> Option<&Operation> {
        self.operations
            .get(&name.to_lowercase())
            .or_else(|| self.operations.get(&relaxed_key(name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Lower-cased keys in registration order.
    pub fn names(&self) -> Vec<String> {
        self.operations.keys().cloned().collect()
    }

    pub fn info(&self, name: &str) -> Option<OperationInfo> {
        self.lookup(name).map(Operation::info)
    }

    /// Info records for every operation, keyed like [`Catalog::names`].
    pub fn infos(&self) -> IndexMap<String, OperationInfo> {
        self.operations
            .iter()
            .map(|(key, op)| (key.clone(), op.info()))
            .collect()
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

fn path_operations(item: &PathItem) -> Vec<(HttpMethod, &parse::operation::Operation)> {
    HttpMethod::ALL
        .into_iter()
        .filter_map(|method| item.operation(method.as_str()).map(|op| (method, op)))
        .collect()
}

fn build_operation(
    method: HttpMethod,
    path: &str,
    op: &parse::operation::Operation,
    path_params: &[Parameter],
) -> Operation {
    let (operation_id, synthesized_id) = match op.operation_id.as_deref() {
        Some(id) if !id.trim().is_empty() => (id.to_string(), false),
        _ => {
            let id = synthesize_operation_id(method.as_str(), path);
            log::debug!("synthesised operationId '{id}' for {} {path}", method.as_str());
            (id, true)
        }
    };

    // Operation-level parameters override path-level ones with the same name and location.
    let mut parameters = path_params.to_vec();
    for param in resolve_parameters(&op.parameters) {
        match parameters
            .iter_mut()
            .find(|p| p.name == param.name && p.location == param.location)
        {
            Some(existing) => *existing = param,
            None => parameters.push(param),
        }
    }

    let request_body = op.request_body.as_ref().and_then(|body| match body {
        RequestBodyOrRef::RequestBody(rb) => Some(RequestBodyInfo {
            required: rb.required,
            content_type: rb.preferred_content_type().map(String::from),
            description: rb.description.clone(),
        }),
        RequestBodyOrRef::Ref { .. } => None, // Should already be resolved
    });

    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    Operation {
        operation_id,
        synthesized_id,
        method,
        path,
        summary: op.summary.clone(),
        description: op.description.clone(),
        tags: op.tags.clone(),
        deprecated: op.deprecated,
        parameters,
        request_body,
    }
}

fn resolve_parameters(params: &[ParameterOrRef]) -> Vec<Parameter> {
    params
        .iter()
        .filter_map(|p| match p {
            ParameterOrRef::Parameter(param) => Some(Parameter {
                name: param.name.clone(),
                location: param.location,
                required: param.required,
                description: param.description.clone(),
            }),
            ParameterOrRef::Ref { .. } => None, // Should already be resolved
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_str;
    use crate::parse::parameter::ParameterLocation;

    const SPEC: &str = r#"
openapi: "3.0.3"
info:
  title: Shop
  version: "1"
paths:
  /users/{id}:
    parameters:
      - name: id
        in: path
        required: true
      - name: X-Tenant
        in: header
    get:
      parameters:
        - name: X-Tenant
          in: header
          required: true
          description: tenant id
        - name: fields
          in: query
      responses: {}
    delete:
      operationId: removeUser
      responses: {}
    trace:
      responses: {}
  /items:
    post:
      operationId: CreateItem
      summary: Create an item
      requestBody:
        content:
          application/json:
            schema:
              type: object
      responses: {}
"#;

    fn catalog() -> Catalog {
        Catalog::build(&load_str(SPEC).unwrap())
    }

    #[test]
    fn test_registers_every_operation() {
        let catalog = catalog();
        assert_eq!(
            catalog.names(),
            vec!["getusersbyid", "removeuser", "createitem"]
        );
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = catalog();
        let op = catalog.lookup("CREATEITEM").unwrap();
        assert_eq!(op.operation_id, "CreateItem");
        assert_eq!(op.method, HttpMethod::Post);
        assert!(op.has_request_body());
        assert!(catalog.contains("createItem"));
        assert!(catalog.contains("get_users_by_id"));
        assert!(!catalog.contains("doesNotExist"));
    }

    #[test]
    fn test_path_parameters_merge() {
        let catalog = catalog();
        let op = catalog.lookup("getUsersById").unwrap();
        assert!(op.synthesized_id);
        let names: Vec<_> = op.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["id", "X-Tenant", "fields"]);
        let tenant = &op.parameters[1];
        assert!(tenant.required);
        assert_eq!(tenant.location, ParameterLocation::Header);

        // DELETE inherits only the path-level parameters.
        let delete = catalog.lookup("removeuser").unwrap();
        assert_eq!(delete.parameters.len(), 2);
        assert!(!delete.parameters[1].required);
    }

    #[test]
    fn test_info_record() {
        let catalog = catalog();
        let info = catalog.info("createitem").unwrap();
        assert_eq!(info.operation_id, "CreateItem");
        assert_eq!(info.method, "POST");
        assert_eq!(info.path, "/items");
        assert_eq!(info.summary, "Create an item");
        assert_eq!(info.description, "");
        assert!(info.parameters.is_empty());

        let value = serde_json::to_value(catalog.info("getusersbyid").unwrap()).unwrap();
        assert_eq!(value["operationId"], "getUsersById");
        assert_eq!(value["parameters"][1]["in"], "header");
        assert_eq!(value["parameters"][1]["description"], "tenant id");
        assert_eq!(value["parameters"][2]["required"], false);
    }

    #[test]
    fn test_collision_later_wins() {
        let yaml = r#"
openapi: "3.0.3"
info: {title: C, version: "1"}
paths:
  /a:
    get:
      operationId: fetch
      responses: {}
  /b:
    get:
      operationId: FETCH
      responses: {}
"#;
        let catalog = Catalog::build(&load_str(yaml).unwrap());
        assert_eq!(catalog.names(), vec!["fetch"]);
        let op = catalog.lookup("fetch").unwrap();
        assert_eq!(op.path, "/b");
        assert_eq!(op.operation_id, "FETCH");
    }

    #[test]
    fn test_empty_operation_id_is_synthesised() {
        let yaml = r#"
openapi: "3.0.3"
info: {title: E, version: "1"}
paths:
  /health:
    head:
      operationId: ""
      responses: {}
"#;
        let catalog = Catalog::build(&load_str(yaml).unwrap());
        assert_eq!(catalog.names(), vec!["headhealth"]);
        assert_eq!(catalog.lookup("headHealth").unwrap().method, HttpMethod::Head);
    }
}
