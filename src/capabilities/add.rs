//! Action that adds two numbers.

use crate::capability::domain::{
    ActionCapability, ActionDefinition, BehaviourError, DefinitionError,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Input of the `add` action.
#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct AddInput {
    /// First number.
    pub a: Number,
    /// Second number.
    pub b: Number,
}

/// Output of the `add` action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AddOutput {
    /// Sum of the two numbers.
    pub result: Number,
}

/// Builds the `add` action.
///
/// # Errors
///
/// Returns [`DefinitionError`] when the derived schemas fail to compile.
pub fn capability() -> Result<ActionCapability<AddInput, AddOutput>, DefinitionError> {
    let definition = ActionDefinition::new("add", "Adds two numbers")?;
    Ok(ActionCapability::new(definition, |input: AddInput| async move {
        let result = sum(&input.a, &input.b)?;
        Ok::<_, BehaviourError>(AddOutput { result })
    }))
}

/// Adds exactly when both operands are integers and falls back to doubles.
///
/// # Errors
///
/// Fails when the floating-point sum is not finite.
pub fn sum(a: &Number, b: &Number) -> Result<Number, BehaviourError> {
    if let (Some(left), Some(right)) = (a.as_i64(), b.as_i64())
        && let Some(total) = left.checked_add(right)
    {
        return Ok(Number::from(total));
    }
    let (Some(left), Some(right)) = (a.as_f64(), b.as_f64()) else {
        return Err(format!("cannot add {a} and {b}").into());
    };
    Number::from_f64(add_doubles(left, right))
        .ok_or_else(|| format!("sum of {a} and {b} is not a finite number").into())
}

#[expect(
    clippy::float_arithmetic,
    reason = "non-integral JSON numbers are IEEE 754 doubles"
)]
const fn add_doubles(left: f64, right: f64) -> f64 {
    left + right
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn number(value: serde_json::Value) -> Number {
        serde_json::from_value(value).expect("value should be a number")
    }

    #[rstest]
    #[case(json!(2), json!(3), json!(5))]
    #[case(json!(-4), json!(1), json!(-3))]
    #[case(json!(0.5), json!(2), json!(2.5))]
    #[case(json!(i64::MAX), json!(1), json!(9_223_372_036_854_775_808.0))]
    fn sums_keep_integers_exact(
        #[case] a: serde_json::Value,
        #[case] b: serde_json::Value,
        #[case] expected: serde_json::Value,
    ) {
        let total = sum(&number(a), &number(b)).expect("sum should succeed");

        assert_eq!(json!(total), expected);
    }

    #[test]
    fn overflowing_doubles_are_rejected() {
        let error = sum(&number(json!(f64::MAX)), &number(json!(f64::MAX)))
            .expect_err("infinite sum should fail");

        assert!(error.to_string().contains("not a finite number"));
    }
}
