use crate::models::{Claims, TokenType};
use jsonwebtoken::{DecodingKey, Validation, decode};

/// Decodes an access token. Refresh tokens are refused here.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())?;

    if claims.token_type != TokenType::Access {
        return Err("not an access token".to_string());
    }
    Ok(claims)
}


#[cfg(test)]
mod tests {
    use super::test_tokens::{access_token, token};
    use super::*;
    use crate::model::role::Role;

    #[test]
    fn access_tokens_verify() {
        let t = access_token(Role::Hr, Some(4), "s3cret");
        let claims = verify_token(&t, "s3cret").unwrap();
        assert_eq!(claims.role, Role::Hr as u8);
        assert_eq!(claims.employee_id, Some(4));
    }

    #[test]
    fn wrong_secret_and_refresh_tokens_are_refused() {
        let t = access_token(Role::Admin, None, "s3cret");
        assert!(verify_token(&t, "other").is_err());

        let refresh = token(Role::Admin, None, TokenType::Refresh, "s3cret");
        assert!(verify_token(&refresh, "s3cret").is_err());
    }
}
