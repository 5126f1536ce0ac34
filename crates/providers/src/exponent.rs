//! Exponentiation and root operations.

use abacus_rpc::{OpSet, Operation, WireError};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Deserialize, JsonSchema)]
struct PowerInput {
    #[schemars(description = "The base.")]
    base: i64,
    #[schemars(description = "The exponent, must be non-negative.")]
    exponent: i64,
}

#[derive(Deserialize, JsonSchema)]
struct NumberInput {
    #[schemars(description = "The number to operate on.")]
    number: i64,
}

fn out_of_range(what: &str) -> WireError {
    WireError::invalid_argument(format!(
        "{what} does not fit in a 64-bit integer"
    ))
}

struct PowerOp {
    parameter_schema: Value,
}

impl Operation for PowerOp {
    type Input = PowerInput;

    fn name(&self) -> &str {
        "power"
    }

    fn description(&self) -> &str {
        "Raise an integer base to a non-negative integer exponent."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn call(&self, input: PowerInput) -> Result<Value, WireError> {
        let exponent = u32::try_from(input.exponent).map_err(|_| {
            WireError::invalid_argument(
                "negative exponents are not supported",
            )
        })?;
        let result = input
            .base
            .checked_pow(exponent)
            .ok_or_else(|| out_of_range("the power"))?;
        info!("{}^{exponent} = {result}", input.base);
        Ok(json!(result))
    }
}

struct SquareOp {
    parameter_schema: Value,
}

impl Operation for SquareOp {
    type Input = NumberInput;

    fn name(&self) -> &str {
        "square"
    }

    fn description(&self) -> &str {
        "Square an integer."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn call(&self, input: NumberInput) -> Result<Value, WireError> {
        let n = input.number;
        let result =
            n.checked_mul(n).ok_or_else(|| out_of_range("the square"))?;
        info!("{n}² = {result}");
        Ok(json!(result))
    }
}

struct CubeOp {
    parameter_schema: Value,
}

impl Operation for CubeOp {
    type Input = NumberInput;

    fn name(&self) -> &str {
        "cube"
    }

    fn description(&self) -> &str {
        "Cube an integer."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn call(&self, input: NumberInput) -> Result<Value, WireError> {
        let n = input.number;
        let result = n
            .checked_mul(n)
            .and_then(|sq| sq.checked_mul(n))
            .ok_or_else(|| out_of_range("the cube"))?;
        info!("{n}³ = {result}");
        Ok(json!(result))
    }
}

struct SquareRootOp {
    parameter_schema: Value,
}

impl Operation for SquareRootOp {
    type Input = NumberInput;

    fn name(&self) -> &str {
        "square_root"
    }

    fn description(&self) -> &str {
        "Compute the square root of a non-negative integer."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn call(&self, input: NumberInput) -> Result<Value, WireError> {
        let n = input.number;
        if n < 0 {
            return Err(WireError::invalid_argument(
                "cannot take the square root of a negative number",
            ));
        }
        let result = (n as f64).sqrt();
        info!("√{n} = {result}");
        Ok(json!(result))
    }
}

/// Builds the exponentiation operation set.
pub fn ops() -> OpSet {
    let number_schema = schema_for!(NumberInput).to_value();
    let mut opset = OpSet::default();
    opset.register(PowerOp {
        parameter_schema: schema_for!(PowerInput).to_value(),
    });
    opset.register(SquareOp {
        parameter_schema: number_schema.clone(),
    });
    opset.register(CubeOp {
        parameter_schema: number_schema.clone(),
    });
    opset.register(SquareRootOp {
        parameter_schema: number_schema,
    });
    opset
}
