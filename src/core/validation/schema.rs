//! Per-operation validation schemas
//!
//! A [`Schema`] is an ordered list of [`FieldRules`]. Each field runs its
//! sanitizers, then every validator, then at most one store lookup. Errors
//! from all fields are collected; nothing short-circuits except a store
//! failure inside a lookup.

use serde_json::Value;
use std::sync::Arc;

use super::RequestInput;
use super::filters;
use super::lookup::Lookup;
use super::validators;
use crate::core::error::{ApiError, FieldError, Location};
use crate::core::store::StoreError;

/// Type-erased field validator
pub type FieldValidator = Arc<dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync>;

/// Type-erased field sanitizer
pub type FieldFilter = Arc<dyn Fn(&str, Value) -> Value + Send + Sync>;

/// Rules for one request field
#[derive(Clone)]
pub struct FieldRules {
    location: Location,
    name: &'static str,
    label: &'static str,
    optional: bool,
    filters: Vec<FieldFilter>,
    validators: Vec<FieldValidator>,
    lookup: Option<Arc<dyn Lookup>>,
}

impl FieldRules {
    fn new(location: Location, name: &'static str, label: &'static str) -> Self {
        Self {
            location,
            name,
            label,
            optional: false,
            filters: Vec::new(),
            validators: Vec::new(),
            lookup: None,
        }
    }

    /// A body field; `label` is the human-readable name used in messages
    pub fn body(name: &'static str, label: &'static str) -> Self {
        Self::new(Location::Body, name, label)
    }

    /// A path parameter
    pub fn param(name: &'static str) -> Self {
        Self::new(Location::Params, name, name)
    }

    /// A query parameter
    pub fn query(name: &'static str) -> Self {
        Self::new(Location::Query, name, name)
    }

    /// Skip every rule when the field is absent
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Make the field optional for partial updates
    pub fn optional_if(self, partial: bool) -> Self {
        if partial { self.optional() } else { self }
    }

    /// Add a sanitizer
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str, Value) -> Value + Send + Sync + 'static,
    {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Add a validator
    pub fn validate<V>(mut self, validator: V) -> Self
    where
        V: Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Set the store lookup run once the validators pass
    pub fn lookup<L: Lookup + 'static>(mut self, lookup: L) -> Self {
        self.lookup = Some(Arc::new(lookup));
        self
    }

    /// `<Label> field is required`
    pub fn required(self) -> Self {
        let msg = format!("{} field is required", self.label);
        self.validate(validators::required(msg))
    }

    /// `<Label> field cannot be empty`
    pub fn not_empty(self) -> Self {
        let msg = format!("{} field cannot be empty", self.label);
        self.validate(validators::not_empty(msg))
    }

    /// Free text: trimmed, control characters stripped, HTML-escaped
    pub fn text(self) -> Self {
        let msg = format!("Invalid {}", self.name);
        self.filter(filters::trim())
            .filter(filters::strip_low())
            .filter(filters::escape())
            .validate(validators::string(msg))
    }

    /// Decimal number, coerced from its string form
    pub fn numeric(self) -> Self {
        self.filter(filters::trim())
            .filter(filters::to_number())
            .validate(validators::decimal("Invalid numeric"))
    }

    /// Record identifier, reported as `Invalid <name>` when malformed
    pub fn record_id(self) -> Self {
        self.filter(filters::trim())
            .validate(validators::record_id())
    }

    /// Boolean flag, coerced from `true` / `false`
    pub fn boolean(self) -> Self {
        let msg = format!("Invalid {}", self.name);
        self.filter(filters::to_boolean())
            .validate(validators::boolean(msg))
    }

    /// Run the rules for this field, sanitizing the input in place
    async fn apply(
        &self,
        input: &mut RequestInput,
        errors: &mut Vec<FieldError>,
    ) -> Result<(), StoreError> {
        let present = input.get(self.location, self.name).cloned();
        if present.is_none() && self.optional {
            return Ok(());
        }

        let sent = present.is_some();
        let value = match present {
            Some(raw) => {
                let cleaned = self
                    .filters
                    .iter()
                    .fold(raw, |value, filter| filter(self.name, value));
                input.set(self.location, self.name, cleaned.clone());
                cleaned
            }
            None => Value::Null,
        };

        let before = errors.len();
        for validator in &self.validators {
            if let Err(msg) = validator(self.name, &value) {
                errors.push(FieldError::new(self.location, self.name, value.clone(), msg));
            }
        }

        // A sent `null` is never a usable value, even where absence is allowed.
        if errors.len() == before && sent && value.is_null() {
            errors.push(FieldError::new(
                self.location,
                self.name,
                Value::Null,
                format!("Invalid {}", self.name),
            ));
        }

        if errors.len() == before
            && !value.is_null()
            && let Some(lookup) = &self.lookup
            && let Some(msg) = lookup.check(&value, input).await?
        {
            errors.push(FieldError::new(self.location, self.name, value, msg));
        }

        Ok(())
    }
}

/// Validation schema for one named operation
#[derive(Clone)]
pub struct Schema {
    operation: String,
    fields: Vec<FieldRules>,
}

impl Schema {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field
    pub fn field(mut self, rules: FieldRules) -> Self {
        self.fields.push(rules);
        self
    }

    /// Name of the operation this schema guards
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Validate and sanitize `input`.
    ///
    /// Returns every field error at once. A store failure during a lookup
    /// aborts with a persistence error.
    pub async fn check(&self, input: &mut RequestInput) -> Result<(), ApiError> {
        let mut errors = Vec::new();

        for rules in &self.fields {
            rules.apply(input, &mut errors).await.map_err(|e| {
                ApiError::persistence("There was a problem validating the request.", e)
            })?;
        }

        if errors.is_empty() {
            Ok(())
        } else {
            tracing::debug!(
                operation = %self.operation,
                errors = errors.len(),
                "request failed validation"
            );
            Err(ApiError::Validation(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct Reject(&'static str);

    #[async_trait]
    impl Lookup for Reject {
        async fn check(
            &self,
            _value: &Value,
            _input: &RequestInput,
        ) -> Result<Option<String>, StoreError> {
            Ok(Some(self.0.to_string()))
        }
    }

    struct Broken;

    #[async_trait]
    impl Lookup for Broken {
        async fn check(
            &self,
            _value: &Value,
            _input: &RequestInput,
        ) -> Result<Option<String>, StoreError> {
            Err(StoreError::Backend("down".into()))
        }
    }

    fn message_schema(partial: bool) -> Schema {
        Schema::new("createThing").field(
            FieldRules::body("message", "Message")
                .optional_if(partial)
                .required()
                .not_empty()
                .text(),
        )
    }

    fn errors_of(result: Result<(), ApiError>) -> Vec<FieldError> {
        match result {
            Err(ApiError::Validation(errors)) => errors,
            other => panic!("expected validation errors, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_required_field_reports_each_presence_rule() {
        let mut input = RequestInput::new();
        let errors = errors_of(message_schema(false).check(&mut input).await);

        let msgs: Vec<_> = errors.iter().map(|e| e.msg.as_str()).collect();
        assert_eq!(
            msgs,
            vec!["Message field is required", "Message field cannot be empty"]
        );
        assert!(errors.iter().all(|e| e.param == "message"));
    }

    #[tokio::test]
    async fn test_whitespace_only_is_empty_after_trim() {
        let mut input = RequestInput::new().with(Location::Body, "message", "   ");
        let errors = errors_of(message_schema(false).check(&mut input).await);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].msg, "Message field cannot be empty");
    }

    #[tokio::test]
    async fn test_sanitized_value_replaces_raw_input() {
        let mut input = RequestInput::new().with(Location::Body, "message", "  <hi>\n");
        message_schema(false).check(&mut input).await.unwrap();

        assert_eq!(input.text(Location::Body, "message"), Some("&lt;hi&gt;"));
    }

    #[tokio::test]
    async fn test_partial_schema_skips_absent_fields_but_checks_present_ones() {
        let mut input = RequestInput::new();
        assert!(message_schema(true).check(&mut input).await.is_ok());

        let mut input = RequestInput::new().with(Location::Body, "message", "");
        let errors = errors_of(message_schema(true).check(&mut input).await);
        assert_eq!(errors[0].msg, "Message field cannot be empty");
    }

    #[tokio::test]
    async fn test_errors_from_all_fields_are_collected() {
        let schema = Schema::new("createThing")
            .field(FieldRules::body("bid", "Bid").required().numeric())
            .field(FieldRules::body("weight", "Weight").required().numeric())
            .field(FieldRules::param("thingId").record_id());

        let mut input = RequestInput::new()
            .with(Location::Body, "bid", "abc")
            .with(Location::Params, "thingId", "zzz");
        let errors = errors_of(schema.check(&mut input).await);

        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].msg, "Invalid numeric");
        assert_eq!(errors[0].value, json!("abc"));
        assert_eq!(errors[1].msg, "Weight field is required");
        assert_eq!(errors[2].msg, "Invalid thingId");
        assert_eq!(errors[2].location, Location::Params);
    }

    #[tokio::test]
    async fn test_numeric_coerces_strings() {
        let schema = Schema::new("createThing").field(FieldRules::body("bid", "Bid").numeric());
        let mut input = RequestInput::new().with(Location::Body, "bid", " 5 ");
        schema.check(&mut input).await.unwrap();

        assert_eq!(input.number(Location::Body, "bid").unwrap(), 5.0);
    }

    #[tokio::test]
    async fn test_lookup_runs_only_after_validators_pass() {
        let schema = Schema::new("createThing").field(
            FieldRules::body("userId", "User Id")
                .required()
                .record_id()
                .lookup(Reject("User is not defined")),
        );

        let mut malformed = RequestInput::new().with(Location::Body, "userId", "x");
        let errors = errors_of(schema.check(&mut malformed).await);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].msg, "Invalid userId");

        let mut unknown =
            RequestInput::new().with(Location::Body, "userId", "000000000000000000000000");
        let errors = errors_of(schema.check(&mut unknown).await);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].msg, "User is not defined");
    }

    #[tokio::test]
    async fn test_lookup_store_failure_is_persistence_error() {
        let schema = Schema::new("createThing")
            .field(FieldRules::body("userId", "User Id").lookup(Broken));
        let mut input =
            RequestInput::new().with(Location::Body, "userId", "000000000000000000000000");

        let err = schema.check(&mut input).await.unwrap_err();
        assert!(matches!(err, ApiError::Persistence { .. }));
    }

    #[tokio::test]
    async fn test_boolean_query_flag() {
        let schema = Schema::new("listThings").field(FieldRules::query("isActive").optional().boolean());

        let mut ok = RequestInput::new().with(Location::Query, "isActive", "false");
        schema.check(&mut ok).await.unwrap();
        assert_eq!(ok.flag(Location::Query, "isActive"), Some(false));

        let mut bad = RequestInput::new().with(Location::Query, "isActive", "yes");
        let errors = errors_of(schema.check(&mut bad).await);
        assert_eq!(errors[0].msg, "Invalid isActive");
    }

    #[tokio::test]
    async fn test_text_rejects_non_string_values_with_other_errors() {
        let schema = message_schema(false)
            .field(FieldRules::body("phone", "Phone").optional().text());
        let mut input = RequestInput::new()
            .with(Location::Body, "message", 42)
            .with(Location::Body, "phone", 5);

        let errors = errors_of(schema.check(&mut input).await);
        let found: Vec<_> = errors
            .iter()
            .map(|e| (e.param.as_str(), e.msg.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![("message", "Invalid message"), ("phone", "Invalid phone")]
        );
    }

    #[tokio::test]
    async fn test_sent_null_is_rejected_on_optional_fields() {
        let schema = Schema::new("updateThing")
            .field(FieldRules::body("isActive", "Is active").optional().boolean())
            .field(FieldRules::body("phone", "Phone").optional().text());
        let mut input = RequestInput::new()
            .with(Location::Body, "isActive", Value::Null)
            .with(Location::Body, "phone", Value::Null);

        let errors = errors_of(schema.check(&mut input).await);
        let msgs: Vec<_> = errors.iter().map(|e| e.msg.as_str()).collect();
        assert_eq!(msgs, vec!["Invalid isActive", "Invalid phone"]);
    }

    #[tokio::test]
    async fn test_sent_null_on_required_field_reports_presence_rules_only() {
        let mut input = RequestInput::new().with(Location::Body, "message", Value::Null);
        let errors = errors_of(message_schema(true).check(&mut input).await);

        let msgs: Vec<_> = errors.iter().map(|e| e.msg.as_str()).collect();
        assert_eq!(
            msgs,
            vec!["Message field is required", "Message field cannot be empty"]
        );
    }
}
