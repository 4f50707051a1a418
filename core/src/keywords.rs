//! Keyword validators and the recursive validation walk.
//!
//! Validators run in a fixed order for each (schema, instance, path) triple:
//! `type, disallow, minimum, maximum, minItems, maxItems, uniqueItems,
//! pattern, minLength, maxLength, divisibleBy, enum, properties,
//! patternProperties, additionalProperties, items, additionalItems,
//! dependencies, extends, $ref`. A validator executes only when its keyword
//! is present, and the order is observable: the first failure determines the
//! reported error.
//!
//! Every validator is a guard. If the instance is not of the applicable case
//! (say, `minimum` against a string) the validator silently succeeds; type
//! gating belongs to `type` alone.

use std::collections::HashSet;
use std::str::FromStr;

use bigdecimal::{num_bigint::BigInt, BigDecimal, Zero};
use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::error::{Result, ValidatorError};
use crate::path::InstancePath;
use crate::registry::SchemaRegistry;
use crate::resolver::{navigate_fragment, registry_key, resolve_reference, without_fragment};
use crate::value::{deep_equal, type_name, PrimitiveType};

/// State for one top-level validation run.
///
/// Holds the registry (read-only), the instance path buffer, and the visited
/// set used to cut `$ref` cycles. The path buffer begins and ends empty for
/// every run regardless of outcome.
pub(crate) struct ValidationContext<'a> {
    registry: &'a SchemaRegistry,
    path: InstancePath,
    visited: HashSet<(usize, usize)>,
}

impl<'a> ValidationContext<'a> {
    pub(crate) fn new(registry: &'a SchemaRegistry) -> Self {
        Self {
            registry,
            path: InstancePath::new(),
            visited: HashSet::new(),
        }
    }

    pub(crate) fn path_depth(&self) -> usize {
        self.path.depth()
    }

    /// Validates `instance` against the schema node, failing fast on the
    /// first violation.
    pub(crate) fn validate(&mut self, schema: &Value, base: &Url, instance: &Value) -> Result<()> {
        let Some(map) = schema.as_object() else {
            return Ok(());
        };

        // An `id` rebases every reference resolved beneath this node.
        let rebased;
        let base = if let Some(id) = map.get("id").and_then(Value::as_str) {
            rebased = without_fragment(&resolve_reference(id, base));
            &rebased
        } else {
            base
        };

        self.validate_type("type", schema, base, instance, false)?;
        self.validate_type("disallow", schema, base, instance, true)?;
        self.validate_minimum(schema, instance)?;
        self.validate_maximum(schema, instance)?;
        self.validate_min_items(schema, instance)?;
        self.validate_max_items(schema, instance)?;
        self.validate_unique_items(schema, instance)?;
        self.validate_pattern(schema, instance)?;
        self.validate_min_length(schema, instance)?;
        self.validate_max_length(schema, instance)?;
        self.validate_divisible_by(schema, instance)?;
        self.validate_enum(schema, instance)?;
        self.validate_properties(schema, base, instance)?;
        self.validate_pattern_properties(schema, base, instance)?;
        self.validate_additional_properties(schema, base, instance)?;
        self.validate_items(schema, base, instance)?;
        self.validate_additional_items(schema, base, instance)?;
        self.validate_dependencies(schema, base, instance)?;
        self.validate_extends(schema, base, instance)?;
        self.validate_ref(schema, base, instance)?;
        Ok(())
    }

    /// Trial validation: a conformance failure becomes `false` instead of an
    /// error. Schema errors keep propagating. This is the only place where
    /// validation failures are swallowed inside the engine.
    fn try_validate(&mut self, schema: &Value, base: &Url, instance: &Value) -> Result<bool> {
        match self.validate(schema, base, instance) {
            Ok(()) => Ok(true),
            Err(error) if error.is_validation() => Ok(false),
            Err(error) => Err(error),
        }
    }

    /// Recurses into a child instance node, keeping the path balanced on
    /// every exit, failure included.
    fn descend(
        &mut self,
        segment: String,
        schema: &Value,
        base: &Url,
        instance: &Value,
    ) -> Result<()> {
        self.path.push(segment);
        let outcome = self.validate(schema, base, instance);
        self.path.pop();
        outcome
    }

    fn fail(&self, message: String, schema: &Value) -> ValidatorError {
        ValidatorError::Validation {
            message,
            path: self.path.render(),
            schema: schema.clone(),
        }
    }

    // type / disallow

    fn validate_type(
        &mut self,
        keyword: &str,
        schema: &Value,
        base: &Url,
        instance: &Value,
        forbid: bool,
    ) -> Result<()> {
        let Some(declaration) = schema.get(keyword) else {
            return Ok(());
        };

        let matched = match declaration {
            Value::Array(declarations) => {
                let mut matched = false;
                for candidate in declarations {
                    if self.declaration_matches(candidate, base, instance)? {
                        matched = true;
                        break;
                    }
                }
                matched
            }
            single => self.declaration_matches(single, base, instance)?,
        };

        if forbid && matched {
            Err(self.fail(
                format!(
                    "value of type {} matched the disallowed type: {}",
                    type_name(instance),
                    describe_declaration(declaration)
                ),
                schema,
            ))
        } else if !forbid && !matched {
            Err(self.fail(
                format!(
                    "value of type {} did not match the following type: {}",
                    type_name(instance),
                    describe_declaration(declaration)
                ),
                schema,
            ))
        } else {
            Ok(())
        }
    }

    fn declaration_matches(
        &mut self,
        declaration: &Value,
        base: &Url,
        instance: &Value,
    ) -> Result<bool> {
        match declaration {
            // Unrecognized names match, for forward compatibility.
            Value::String(name) => {
                Ok(PrimitiveType::from_name(name).is_none_or(|class| class.matches(instance)))
            }
            // A subschema alternative is a trial: its failure only means
            // "try the next declaration".
            Value::Object(_) => self.try_validate(declaration, base, instance),
            _ => Ok(false),
        }
    }

    // numeric bounds

    fn validate_minimum(&mut self, schema: &Value, instance: &Value) -> Result<()> {
        let (Some(value), Some(minimum)) = (
            instance.as_f64(),
            schema.get("minimum").and_then(Value::as_f64),
        ) else {
            return Ok(());
        };
        let exclusive = schema
            .get("exclusiveMinimum")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if exclusive && value <= minimum {
            Err(self.fail(
                format!("value {instance} must be strictly greater than the exclusive minimum of {minimum}"),
                schema,
            ))
        } else if !exclusive && value < minimum {
            Err(self.fail(
                format!("value {instance} is less than the minimum of {minimum}"),
                schema,
            ))
        } else {
            Ok(())
        }
    }

    fn validate_maximum(&mut self, schema: &Value, instance: &Value) -> Result<()> {
        let (Some(value), Some(maximum)) = (
            instance.as_f64(),
            schema.get("maximum").and_then(Value::as_f64),
        ) else {
            return Ok(());
        };
        let exclusive = schema
            .get("exclusiveMaximum")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if exclusive && value >= maximum {
            Err(self.fail(
                format!("value {instance} must be strictly less than the exclusive maximum of {maximum}"),
                schema,
            ))
        } else if !exclusive && value > maximum {
            Err(self.fail(
                format!("value {instance} is greater than the maximum of {maximum}"),
                schema,
            ))
        } else {
            Ok(())
        }
    }

    // sequence bounds

    fn validate_min_items(&mut self, schema: &Value, instance: &Value) -> Result<()> {
        let (Some(elements), Some(minimum)) = (
            instance.as_array(),
            schema.get("minItems").and_then(Value::as_u64),
        ) else {
            return Ok(());
        };
        if (elements.len() as u64) < minimum {
            return Err(self.fail(
                format!(
                    "array has {} items, fewer than the minimum number of items ({minimum})",
                    elements.len()
                ),
                schema,
            ));
        }
        Ok(())
    }

    fn validate_max_items(&mut self, schema: &Value, instance: &Value) -> Result<()> {
        let (Some(elements), Some(maximum)) = (
            instance.as_array(),
            schema.get("maxItems").and_then(Value::as_u64),
        ) else {
            return Ok(());
        };
        if (elements.len() as u64) > maximum {
            return Err(self.fail(
                format!(
                    "array has {} items, more than the maximum number of items ({maximum})",
                    elements.len()
                ),
                schema,
            ));
        }
        Ok(())
    }

    fn validate_unique_items(&mut self, schema: &Value, instance: &Value) -> Result<()> {
        let Some(elements) = instance.as_array() else {
            return Ok(());
        };
        if schema.get("uniqueItems").and_then(Value::as_bool) != Some(true) {
            return Ok(());
        }
        for (first, a) in elements.iter().enumerate() {
            for (second, b) in elements.iter().enumerate().skip(first + 1) {
                if deep_equal(a, b) {
                    return Err(self.fail(
                        format!("array items at positions {first} and {second} are duplicates"),
                        schema,
                    ));
                }
            }
        }
        Ok(())
    }

    // string constraints

    fn validate_pattern(&mut self, schema: &Value, instance: &Value) -> Result<()> {
        let (Some(text), Some(pattern)) = (
            instance.as_str(),
            schema.get("pattern").and_then(Value::as_str),
        ) else {
            return Ok(());
        };
        let regex = compile_pattern(pattern)?;
        if !regex.is_match(text) {
            return Err(self.fail(
                format!("value '{text}' did not match the pattern '{pattern}'"),
                schema,
            ));
        }
        Ok(())
    }

    fn validate_min_length(&mut self, schema: &Value, instance: &Value) -> Result<()> {
        let (Some(text), Some(minimum)) = (
            instance.as_str(),
            schema.get("minLength").and_then(Value::as_u64),
        ) else {
            return Ok(());
        };
        let length = text.chars().count() as u64;
        if length < minimum {
            return Err(self.fail(
                format!("string has {length} characters, fewer than the minimum length of {minimum}"),
                schema,
            ));
        }
        Ok(())
    }

    fn validate_max_length(&mut self, schema: &Value, instance: &Value) -> Result<()> {
        let (Some(text), Some(maximum)) = (
            instance.as_str(),
            schema.get("maxLength").and_then(Value::as_u64),
        ) else {
            return Ok(());
        };
        let length = text.chars().count() as u64;
        if length > maximum {
            return Err(self.fail(
                format!("string has {length} characters, more than the maximum length of {maximum}"),
                schema,
            ));
        }
        Ok(())
    }

    // divisibleBy

    fn validate_divisible_by(&mut self, schema: &Value, instance: &Value) -> Result<()> {
        let Value::Number(value) = instance else {
            return Ok(());
        };
        let Some(Value::Number(divisor)) = schema.get("divisibleBy") else {
            return Ok(());
        };
        let Some(divisor_decimal) = decimal_of(divisor) else {
            return Ok(());
        };
        if divisor_decimal.is_zero() {
            return Err(self.fail(format!("value {instance} cannot be divisible by 0"), schema));
        }
        let Some(value_decimal) = decimal_of(value) else {
            return Ok(());
        };
        if !is_exact_multiple(&value_decimal, &divisor_decimal) {
            return Err(self.fail(
                format!("value {instance} is not divisible by {divisor}"),
                schema,
            ));
        }
        Ok(())
    }

    // enum

    fn validate_enum(&mut self, schema: &Value, instance: &Value) -> Result<()> {
        let Some(allowed) = schema.get("enum").and_then(Value::as_array) else {
            return Ok(());
        };
        if !allowed.iter().any(|candidate| deep_equal(candidate, instance)) {
            return Err(self.fail(
                format!("value {instance} is not one of the enumerated values"),
                schema,
            ));
        }
        Ok(())
    }

    // object keywords

    fn validate_properties(&mut self, schema: &Value, base: &Url, instance: &Value) -> Result<()> {
        let Some(object) = instance.as_object() else {
            return Ok(());
        };
        let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
            return Ok(());
        };
        for (name, subschema) in properties {
            let required = subschema
                .get("required")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            match object.get(name) {
                Some(child) => self.descend(name.clone(), subschema, base, child)?,
                None if required => {
                    return Err(self.fail(
                        format!("required property '{name}' was not present"),
                        subschema,
                    ));
                }
                None => {}
            }
        }
        Ok(())
    }

    fn validate_pattern_properties(
        &mut self,
        schema: &Value,
        base: &Url,
        instance: &Value,
    ) -> Result<()> {
        let Some(object) = instance.as_object() else {
            return Ok(());
        };
        let Some(patterns) = schema.get("patternProperties").and_then(Value::as_object) else {
            return Ok(());
        };
        for (pattern, subschema) in patterns {
            let regex = compile_pattern(pattern)?;
            for (key, child) in object {
                if regex.is_match(key) {
                    self.descend(key.clone(), subschema, base, child)?;
                }
            }
        }
        Ok(())
    }

    fn validate_additional_properties(
        &mut self,
        schema: &Value,
        base: &Url,
        instance: &Value,
    ) -> Result<()> {
        let Some(object) = instance.as_object() else {
            return Ok(());
        };
        let Some(additional) = schema.get("additionalProperties") else {
            return Ok(());
        };

        let declared = schema.get("properties").and_then(Value::as_object);
        let mut patterns = Vec::new();
        if let Some(pattern_properties) = schema.get("patternProperties").and_then(Value::as_object)
        {
            for pattern in pattern_properties.keys() {
                patterns.push(compile_pattern(pattern)?);
            }
        }

        let extras: Vec<&String> = object
            .keys()
            .filter(|key| !declared.is_some_and(|map| map.contains_key(key.as_str())))
            .filter(|key| !patterns.iter().any(|regex| regex.is_match(key)))
            .collect();

        match additional {
            Value::Bool(false) => {
                if !extras.is_empty() {
                    let listed = extras
                        .iter()
                        .map(|key| format!("'{key}'"))
                        .collect::<Vec<_>>()
                        .join(", ");
                    return Err(self.fail(
                        format!("additional properties {listed} are not permitted"),
                        schema,
                    ));
                }
            }
            subschema @ Value::Object(_) => {
                for key in extras {
                    if let Some(child) = object.get(key.as_str()) {
                        self.descend(key.clone(), subschema, base, child)?;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    // sequence keywords

    fn validate_items(&mut self, schema: &Value, base: &Url, instance: &Value) -> Result<()> {
        let Some(elements) = instance.as_array() else {
            return Ok(());
        };
        match schema.get("items") {
            Some(item_schema @ Value::Object(_)) => {
                for (index, element) in elements.iter().enumerate() {
                    self.descend(index.to_string(), item_schema, base, element)?;
                }
            }
            Some(Value::Array(positional)) => {
                // Pairwise up to the shorter side; the excess is the business
                // of additionalItems.
                for (index, (element, item_schema)) in elements.iter().zip(positional).enumerate() {
                    self.descend(index.to_string(), item_schema, base, element)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn validate_additional_items(
        &mut self,
        schema: &Value,
        base: &Url,
        instance: &Value,
    ) -> Result<()> {
        let Some(elements) = instance.as_array() else {
            return Ok(());
        };
        let Some(Value::Array(positional)) = schema.get("items") else {
            return Ok(());
        };
        match schema.get("additionalItems") {
            Some(Value::Bool(false)) => {
                if elements.len() > positional.len() {
                    return Err(self.fail(
                        format!(
                            "array has {} items, but only {} are described and additional items are not permitted",
                            elements.len(),
                            positional.len()
                        ),
                        schema,
                    ));
                }
            }
            Some(extra_schema @ Value::Object(_)) => {
                for index in positional.len()..elements.len() {
                    self.descend(index.to_string(), extra_schema, base, &elements[index])?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    // dependencies / extends

    fn validate_dependencies(
        &mut self,
        schema: &Value,
        base: &Url,
        instance: &Value,
    ) -> Result<()> {
        let Some(object) = instance.as_object() else {
            return Ok(());
        };
        let Some(dependencies) = schema.get("dependencies").and_then(Value::as_object) else {
            return Ok(());
        };
        for (name, dependency) in dependencies {
            if !object.contains_key(name.as_str()) {
                continue;
            }
            match dependency {
                Value::String(other) => {
                    if !object.contains_key(other.as_str()) {
                        return Err(self.fail(
                            format!("property '{name}' requires companion property '{other}'"),
                            schema,
                        ));
                    }
                }
                Value::Array(others) => {
                    for required in others {
                        if let Some(other) = required.as_str() {
                            if !object.contains_key(other) {
                                return Err(self.fail(
                                    format!(
                                        "property '{name}' requires companion property '{other}'"
                                    ),
                                    schema,
                                ));
                            }
                        }
                    }
                }
                // A schema dependency constrains the whole instance; the
                // path does not descend.
                subschema @ Value::Object(_) => self.validate(subschema, base, instance)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn validate_extends(&mut self, schema: &Value, base: &Url, instance: &Value) -> Result<()> {
        match schema.get("extends") {
            Some(parent @ Value::Object(_)) => self.validate(parent, base, instance)?,
            Some(Value::Array(parents)) => {
                for parent in parents {
                    if parent.is_object() {
                        self.validate(parent, base, instance)?;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    // $ref

    fn validate_ref(&mut self, schema: &Value, base: &Url, instance: &Value) -> Result<()> {
        let Some(reference) = schema.get("$ref").and_then(Value::as_str) else {
            return Ok(());
        };
        let target = resolve_reference(reference, base);
        let key = registry_key(&target);

        let registry = self.registry;
        let Some(document) = registry.get(&key) else {
            return Err(self.fail(
                format!("referenced schema '{key}' is not registered and could not be loaded"),
                schema,
            ));
        };
        let resolved = navigate_fragment(document.root(), target.fragment().unwrap_or(""))?;

        // Self- or mutually-referential schemas revisit the same
        // (subschema, instance) pair; that pair is already being checked
        // higher up the stack, so it passes here.
        let guard = (
            resolved as *const Value as usize,
            instance as *const Value as usize,
        );
        if !self.visited.insert(guard) {
            return Ok(());
        }
        let new_base = without_fragment(&target);
        let outcome = self.validate(resolved, &new_base, instance);
        self.visited.remove(&guard);
        outcome
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|error| {
        ValidatorError::Schema(format!("invalid regular expression '{pattern}': {error}"))
    })
}

fn describe_declaration(declaration: &Value) -> String {
    match declaration {
        Value::String(name) => name.clone(),
        Value::Array(declarations) => declarations
            .iter()
            .map(describe_declaration)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => "(schema)".to_string(),
        other => other.to_string(),
    }
}

fn decimal_of(number: &serde_json::Number) -> Option<BigDecimal> {
    BigDecimal::from_str(&number.to_string()).ok()
}

/// Exact decimal multiplicity check.
///
/// Both operands are rescaled to a common decimal exponent so the test
/// reduces to arbitrary-precision integer remainder; binary floating-point
/// remainder would misjudge divisors like `0.1`.
fn is_exact_multiple(value: &BigDecimal, divisor: &BigDecimal) -> bool {
    let (value_int, value_scale) = value.as_bigint_and_exponent();
    let (divisor_int, divisor_scale) = divisor.as_bigint_and_exponent();
    let scale = value_scale.max(divisor_scale);
    let value_int = value_int * pow10(scale - value_scale);
    let divisor_int = divisor_int * pow10(scale - divisor_scale);
    if divisor_int.is_zero() {
        return false;
    }
    (value_int % divisor_int).is_zero()
}

fn pow10(exponent: i64) -> BigInt {
    let mut result = BigInt::from(1);
    let ten = BigInt::from(10);
    for _ in 0..exponent {
        result *= &ten;
    }
    result
}
