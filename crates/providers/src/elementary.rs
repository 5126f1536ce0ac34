//! Elementary arithmetic operations.

use abacus_rpc::{OpSet, Operation, WireError};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Deserialize, JsonSchema)]
struct IntPair {
    #[schemars(description = "First integer.")]
    a: i64,
    #[schemars(description = "Second integer.")]
    b: i64,
}

#[derive(Deserialize, JsonSchema)]
struct DividePair {
    #[schemars(description = "Dividend.")]
    a: i64,
    #[schemars(description = "Divisor, must not be zero.")]
    b: i64,
}

fn out_of_range(what: &str) -> WireError {
    WireError::invalid_argument(format!(
        "{what} does not fit in a 64-bit integer"
    ))
}

struct AddOp {
    parameter_schema: Value,
}

impl Operation for AddOp {
    type Input = IntPair;

    fn name(&self) -> &str {
        "add"
    }

    fn description(&self) -> &str {
        "Add two integers and return the sum."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn call(&self, input: IntPair) -> Result<Value, WireError> {
        let result = input
            .a
            .checked_add(input.b)
            .ok_or_else(|| out_of_range("the sum"))?;
        info!("{} + {} = {result}", input.a, input.b);
        Ok(json!(result))
    }
}

struct MultiplyOp {
    parameter_schema: Value,
}

impl Operation for MultiplyOp {
    type Input = IntPair;

    fn name(&self) -> &str {
        "multiply"
    }

    fn description(&self) -> &str {
        "Multiply two integers and return the product."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn call(&self, input: IntPair) -> Result<Value, WireError> {
        let result = input
            .a
            .checked_mul(input.b)
            .ok_or_else(|| out_of_range("the product"))?;
        info!("{} × {} = {result}", input.a, input.b);
        Ok(json!(result))
    }
}

struct SubtractOp {
    parameter_schema: Value,
}

impl Operation for SubtractOp {
    type Input = IntPair;

    fn name(&self) -> &str {
        "subtract"
    }

    fn description(&self) -> &str {
        "Subtract the second integer from the first and return the \
         difference."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn call(&self, input: IntPair) -> Result<Value, WireError> {
        let result = input
            .a
            .checked_sub(input.b)
            .ok_or_else(|| out_of_range("the difference"))?;
        info!("{} - {} = {result}", input.a, input.b);
        Ok(json!(result))
    }
}

struct DivideOp {
    parameter_schema: Value,
}

impl Operation for DivideOp {
    type Input = DividePair;

    fn name(&self) -> &str {
        "divide"
    }

    fn description(&self) -> &str {
        "Divide the first integer by the second and return the quotient \
         and remainder."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn call(&self, input: DividePair) -> Result<Value, WireError> {
        let (a, b) = (input.a, input.b);
        if b == 0 {
            return Err(WireError::division_by_zero(
                "division by zero is not allowed",
            ));
        }
        let Some(mut quotient) = a.checked_div(b) else {
            return Err(out_of_range("the quotient"));
        };
        let mut remainder = a % b;
        // Flooring division: the remainder takes the divisor's sign.
        if remainder != 0 && (remainder < 0) != (b < 0) {
            quotient -= 1;
            remainder += b;
        }
        info!("{a} ÷ {b} = {quotient} remainder {remainder}");
        Ok(json!({
            "quotient": quotient,
            "remainder": remainder,
            "original_dividend": a,
            "original_divisor": b,
        }))
    }
}

/// Builds the elementary arithmetic operation set.
pub fn ops() -> OpSet {
    let int_pair_schema = schema_for!(IntPair).to_value();
    let mut opset = OpSet::default();
    opset.register(AddOp {
        parameter_schema: int_pair_schema.clone(),
    });
    opset.register(MultiplyOp {
        parameter_schema: int_pair_schema.clone(),
    });
    opset.register(SubtractOp {
        parameter_schema: int_pair_schema,
    });
    opset.register(DivideOp {
        parameter_schema: schema_for!(DividePair).to_value(),
    });
    opset
}

#[cfg(test)]
mod tests {
    use abacus_rpc::WireErrorKind;

    use super::*;

    #[test]
    fn test_basic_identities() {
        let opset = ops();
        for (a, b) in [(3, 5), (-4, 9), (0, 0), (-7, -2)] {
            let args = json!({ "a": a, "b": b });
            assert_eq!(
                opset.invoke("add", args.clone()).unwrap(),
                json!(a + b)
            );
            assert_eq!(
                opset.invoke("multiply", args.clone()).unwrap(),
                json!(a * b)
            );
            assert_eq!(opset.invoke("subtract", args).unwrap(), json!(a - b));
        }
    }

    #[test]
    fn test_divide_round_trip_law() {
        let opset = ops();
        for (a, b) in [(17, 5), (-17, 5), (17, -5), (-17, -5), (0, 3)] {
            let result = opset
                .invoke("divide", json!({ "a": a, "b": b }))
                .unwrap();
            let quotient = result["quotient"].as_i64().unwrap();
            let remainder = result["remainder"].as_i64().unwrap();
            assert_eq!(
                quotient * b + remainder,
                a,
                "law failed for {a} / {b}"
            );
            assert_eq!(result["original_dividend"], json!(a));
            assert_eq!(result["original_divisor"], json!(b));
        }
    }

    #[test]
    fn test_divide_floors() {
        let opset = ops();
        let result = opset
            .invoke("divide", json!({ "a": -7, "b": 2 }))
            .unwrap();
        assert_eq!(result["quotient"], json!(-4));
        assert_eq!(result["remainder"], json!(1));
    }

    #[test]
    fn test_divide_by_zero() {
        let err = ops()
            .invoke("divide", json!({ "a": 1, "b": 0 }))
            .unwrap_err();
        assert_eq!(err.kind, WireErrorKind::DivisionByZero);
    }

    #[test]
    fn test_overflow_is_rejected() {
        let err = ops()
            .invoke("add", json!({ "a": i64::MAX, "b": 1 }))
            .unwrap_err();
        assert_eq!(err.kind, WireErrorKind::InvalidArgument);
    }
}
