//! `unsafe_parse_jwt`: decode JWT claims without verifying anything

use async_trait::async_trait;
use jsonwebtoken::dangerous::insecure_decode;
use serde_json::Value;

use crate::framework::{
    AttributeKind, Function, FunctionDefinition, FunctionError, FunctionResult, Parameter,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct UnsafeParseJwt;

impl UnsafeParseJwt {
    pub fn new() -> Self {
        Self
    }
}

/// Claims of `token` as compact JSON
///
/// The header must name a known algorithm but no key is resolved for it, so tokens
/// signed with any RSA, EC or HMAC key parse alike.
pub fn parse_claims(token: &str) -> FunctionResult<String> {
    let data = insecure_decode::<Value>(token)
        .map_err(|e| FunctionError::failed(format!("failed to parse JWT: {}", e)))?;
    serde_json::to_string(&data.claims)
        .map_err(|e| FunctionError::failed(format!("failed to marshal token to JSON: {}", e)))
}

#[async_trait]
impl Function for UnsafeParseJwt {
    fn name(&self) -> &'static str {
        "unsafe_parse_jwt"
    }

    fn definition(&self) -> FunctionDefinition {
        FunctionDefinition {
            summary: "Parse a JWT without validating it",
            description: "The `unsafe_parse_jwt` function parses a JSON Web Token (JWT) without validating its signature or verifying its authenticity. Use it to inspect claims, never for security-sensitive decisions.",
            parameters: vec![Parameter {
                name: "jwt",
                kind: AttributeKind::String,
                description: "The JWT to parse.",
                allow_null: false,
            }],
            return_kind: AttributeKind::String,
        }
    }

    async fn run(&self, args: Vec<Value>) -> FunctionResult<Value> {
        self.definition().check_args(&args)?;
        let token = args[0].as_str().ok_or(FunctionError::ArgumentType {
            name: "jwt",
            kind: "string",
        })?;
        parse_claims(token).map(Value::String)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn signed_token() -> String {
        let claims = json!({
            "iss": "ze-issuer",
            "sub": "ze-subject",
            "aud": ["ze-audience"],
            "ze-claim": "ze-value",
            "exp": 1_000,
            "nbf": 4_102_444_800u64,
        });
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"not-the-verifier-key")).unwrap()
    }

    #[tokio::test]
    async fn test_returns_claims_verbatim() {
        let out = UnsafeParseJwt::new().run(vec![json!(signed_token())]).await.unwrap();
        let claims: Value = serde_json::from_str(out.as_str().unwrap()).unwrap();
        assert_eq!(claims["iss"], "ze-issuer");
        assert_eq!(claims["sub"], "ze-subject");
        assert_eq!(claims["aud"][0], "ze-audience");
        assert_eq!(claims["ze-claim"], "ze-value");
    }

    #[test]
    fn test_output_is_compact() {
        let out = parse_claims(&signed_token()).unwrap();
        assert!(!out.contains(' '));
        assert!(!out.contains('\n'));
    }

    #[test]
    fn test_expired_and_not_yet_valid_tokens_still_parse() {
        assert!(parse_claims(&signed_token()).is_ok());
    }

    // Entra ID access tokens are RS256; the signature is never looked at.
    const RS256_TOKEN: &str = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCIsImtpZCI6InplLWtpZCJ9.\
        eyJhdWQiOiJodHRwczovL21hbmFnZW1lbnQuYXp1cmUuY29tIiwiaXNzIjoiaHR0cHM6Ly9zdHMud2luZG93cy5uZXQvemUtdGVuYW50LyIsInRpZCI6InplLXRlbmFudCIsIm9pZCI6InplLW9iamVjdCJ9.\
        c2lnbmF0dXJl";

    const ES384_TOKEN: &str = "eyJhbGciOiJFUzM4NCIsInR5cCI6IkpXVCJ9.\
        eyJpc3MiOiJ6ZS1pc3N1ZXIiLCJhdWQiOlsiemUtYXVkaWVuY2UiXSwic3ViIjoiemUtc3ViamVjdCJ9.\
        c2lnbmF0dXJl";

    #[test]
    fn test_parses_rs256_token() {
        let claims: Value = serde_json::from_str(&parse_claims(RS256_TOKEN).unwrap()).unwrap();
        assert_eq!(claims["tid"], "ze-tenant");
        assert_eq!(claims["oid"], "ze-object");
        assert_eq!(claims["aud"], "https://management.azure.com");
    }

    #[tokio::test]
    async fn test_parses_es384_token() {
        let out = UnsafeParseJwt::new().run(vec![json!(ES384_TOKEN)]).await.unwrap();
        let claims: Value = serde_json::from_str(out.as_str().unwrap()).unwrap();
        assert_eq!(
            claims,
            json!({"iss": "ze-issuer", "aud": ["ze-audience"], "sub": "ze-subject"})
        );
    }

    #[tokio::test]
    async fn test_null_argument() {
        let err = UnsafeParseJwt::new().run(vec![Value::Null]).await.unwrap_err();
        assert_eq!(err.to_string(), "argument must not be null");
    }

    #[tokio::test]
    async fn test_invalid_token() {
        let err = UnsafeParseJwt::new().run(vec![json!("not-a-jwt")]).await.unwrap_err();
        assert!(err.to_string().starts_with("failed to parse JWT: "));

        let err = parse_claims("a.b.c").unwrap_err();
        assert!(err.to_string().starts_with("failed to parse JWT: "));
    }

    #[tokio::test]
    async fn test_wrong_argument_type() {
        let err = UnsafeParseJwt::new().run(vec![json!(42)]).await.unwrap_err();
        assert_eq!(err.to_string(), "argument jwt must be a string");
    }
}
