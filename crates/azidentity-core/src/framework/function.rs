//! Provider function contract

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::schema::AttributeKind;

/// Errors returned by a function call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FunctionError {
    #[error("argument must not be null")]
    NullArgument,

    #[error("expected {expected} argument(s), got {got}")]
    Arity { expected: usize, got: usize },

    #[error("argument {name} must be a {kind}")]
    ArgumentType { name: &'static str, kind: &'static str },

    #[error("{0}")]
    Failed(String),
}

impl FunctionError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

pub type FunctionResult<T> = Result<T, FunctionError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: &'static str,
    pub kind: AttributeKind,
    pub description: &'static str,
    pub allow_null: bool,
}

/// Signature and documentation of a function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDefinition {
    pub summary: &'static str,
    pub description: &'static str,
    pub parameters: Vec<Parameter>,
    pub return_kind: AttributeKind,
}

impl FunctionDefinition {
    /// Check argument count and per-parameter nullability
    pub fn check_args(&self, args: &[Value]) -> FunctionResult<()> {
        if args.len() != self.parameters.len() {
            return Err(FunctionError::Arity {
                expected: self.parameters.len(),
                got: args.len(),
            });
        }
        for (param, arg) in self.parameters.iter().zip(args) {
            if arg.is_null() && !param.allow_null {
                return Err(FunctionError::NullArgument);
            }
        }
        Ok(())
    }
}

/// A pure function callable from configuration
#[async_trait]
pub trait Function: Send + Sync {
    fn name(&self) -> &'static str;

    fn definition(&self) -> FunctionDefinition;

    async fn run(&self, args: Vec<Value>) -> FunctionResult<Value>;
}
