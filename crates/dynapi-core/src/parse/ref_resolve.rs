use super::components::Components;
use super::operation::{Operation, PathItem};
use super::parameter::{Parameter, ParameterOrRef};
use super::request_body::{RequestBody, RequestBodyOrRef};
use super::spec::OpenApiSpec;
use crate::error::ResolveError;

/// Resolves the `$ref` pointers the client needs: parameters and request
/// bodies, at path and operation level. Schema references are left alone.
pub struct RefResolver<'a> {
    components: Option<&'a Components>,
}

impl<'a> RefResolver<'a> {
    pub fn new(spec: &'a OpenApiSpec) -> Self {
        Self {
            components: spec.components.as_ref(),
        }
    }

    /// Return a copy of the spec with every parameter and request body inlined.
    pub fn resolve_spec(&self, spec: &OpenApiSpec) -> Result<OpenApiSpec, ResolveError> {
        let mut resolved = spec.clone();
        for item in resolved.paths.values_mut() {
            self.resolve_path_item(item)?;
        }
        Ok(resolved)
    }

    fn resolve_path_item(&self, item: &mut PathItem) -> Result<(), ResolveError> {
        item.parameters = self.resolve_parameters(&item.parameters)?;
        for op in item.operations_mut() {
            self.resolve_operation(op)?;
        }
        Ok(())
    }

    fn resolve_operation(&self, op: &mut Operation) -> Result<(), ResolveError> {
        op.parameters = self.resolve_parameters(&op.parameters)?;
        if let Some(RequestBodyOrRef::Ref { ref_path }) = &op.request_body {
            let body = self.lookup_request_body(ref_path)?;
            op.request_body = Some(RequestBodyOrRef::RequestBody(body));
        }
        Ok(())
    }

    fn resolve_parameters(
        &self,
        params: &[ParameterOrRef],
    ) -> Result<Vec<ParameterOrRef>, ResolveError> {
        params
            .iter()
            .map(|p| match p {
                ParameterOrRef::Ref { ref_path } => {
                    self.lookup_parameter(ref_path).map(ParameterOrRef::Parameter)
                }
                ParameterOrRef::Parameter(_) => Ok(p.clone()),
            })
            .collect()
    }

    fn lookup_parameter(&self, ref_path: &str) -> Result<Parameter, ResolveError> {
        let name = parse_ref_name(ref_path, "parameters")?;
        match self.components.and_then(|c| c.parameters.get(name)) {
            Some(ParameterOrRef::Parameter(param)) => Ok(param.clone()),
            // A component that is itself a reference is followed one level.
            Some(ParameterOrRef::Ref { ref_path: inner }) => {
                let inner_name = parse_ref_name(inner, "parameters")?;
                match self.components.and_then(|c| c.parameters.get(inner_name)) {
                    Some(ParameterOrRef::Parameter(param)) => Ok(param.clone()),
                    _ => Err(ResolveError::UnresolvedRef(ref_path.to_string())),
                }
            }
            None => Err(ResolveError::RefTargetNotFound(ref_path.to_string())),
        }
    }

    fn lookup_request_body(&self, ref_path: &str) -> Result<RequestBody, ResolveError> {
        let name = parse_ref_name(ref_path, "requestBodies")?;
        match self.components.and_then(|c| c.request_bodies.get(name)) {
            Some(RequestBodyOrRef::RequestBody(body)) => Ok(body.clone()),
            Some(RequestBodyOrRef::Ref { ref_path: inner }) => {
                let inner_name = parse_ref_name(inner, "requestBodies")?;
                match self.components.and_then(|c| c.request_bodies.get(inner_name)) {
                    Some(RequestBodyOrRef::RequestBody(body)) => Ok(body.clone()),
                    _ => Err(ResolveError::UnresolvedRef(ref_path.to_string())),
                }
            }
            None => Err(ResolveError::RefTargetNotFound(ref_path.to_string())),
        }
    }
}

/// Parse a `$ref` path like `#/components/parameters/Foo` and extract the name.
fn parse_ref_name<'a>(ref_path: &'a str, expected_section: &str) -> Result<&'a str, ResolveError> {
    let stripped = ref_path
        .strip_prefix("#/components/")
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    let (section, name) = stripped
        .split_once('/')
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    if section != expected_section {
        return Err(ResolveError::InvalidRefFormat(format!(
            "expected section '{}', got '{}' in {}",
            expected_section, section, ref_path
        )));
    }
    Ok(name)
}
