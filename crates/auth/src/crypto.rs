use super::*;
use booking_core::BEARER;
use booking_core::ID;
use booking_core::Unique;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

/// Issues and verifies HS256 access tokens with a server-held secret.
///
/// Verification is split so each failure is reported on its own:
/// the header is inspected first, then the signature, then expiry.
/// Expiry is checked here rather than by the JWT library so that a
/// forged or truncated token is never reported as merely expired.
pub struct Crypto {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: std::time::Duration,
}

impl Crypto {
    pub fn new(secret: &[u8], ttl: std::time::Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }
    pub fn ttl(&self) -> std::time::Duration {
        self.ttl
    }
    pub fn issue(&self, member: &Member) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(member, booking_core::unix())
    }
    pub fn issue_at(
        &self,
        member: &Member,
        now: u64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims::new(member.id(), now, self.ttl);
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }
    /// Signature and structure only; expiry is left to the caller.
    pub fn decode(&self, token: &str) -> Result<Claims, Rejection> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("token rejected: {}", e);
                Rejection::InvalidToken
            })
    }
    /// Resolves an `Authorization` header value to the subject it binds.
    pub fn check(&self, header: Option<&str>) -> Result<ID<Member>, Rejection> {
        self.check_at(header, booking_core::unix())
    }
    pub fn check_at(&self, header: Option<&str>, now: u64) -> Result<ID<Member>, Rejection> {
        let token = bearer(header).ok_or(Rejection::MissingToken)?;
        let claims = self.decode(token)?;
        if claims.expired(now) {
            return Err(Rejection::ExpiredToken);
        }
        claims.user().ok_or(Rejection::InvalidToken)
    }
}

/// Extracts the token from a `Bearer <token>` header value.
pub fn bearer(header: Option<&str>) -> Option<&str> {
    header?
        .strip_prefix(BEARER)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = booking_core::SECONDS_PER_DAY;
    const NOW: u64 = 1_700_000_000;

    fn crypto() -> Crypto {
        Crypto::new(b"test-secret", std::time::Duration::from_secs(7 * DAY))
    }
    fn member() -> Member {
        Member::new(ID::from(1), "A".into(), "a@x.com".into())
    }
    fn header(token: &str) -> String {
        format!("Bearer {}", token)
    }

    #[test]
    fn fresh_token_resolves_subject() {
        let crypto = crypto();
        let token = crypto.issue_at(&member(), NOW).unwrap();
        assert_eq!(crypto.check_at(Some(&header(&token)), NOW), Ok(ID::from(1)));
    }

    #[test]
    fn token_expires_after_ttl() {
        let crypto = crypto();
        let token = crypto.issue_at(&member(), NOW).unwrap();
        let ref header = header(&token);
        assert!(crypto.check_at(Some(header), NOW + 7 * DAY).is_ok());
        assert_eq!(
            crypto.check_at(Some(header), NOW + 7 * DAY + 1),
            Err(Rejection::ExpiredToken)
        );
    }

    #[test]
    fn claims_bind_issue_and_expiry() {
        let crypto = crypto();
        let token = crypto.issue_at(&member(), NOW).unwrap();
        let claims = crypto.decode(&token).unwrap();
        assert_eq!(claims.sub, "1");
        assert_eq!(claims.issued_at(), NOW);
        assert_eq!(claims.expires_at(), NOW + 7 * DAY);
    }

    #[test]
    fn altered_signature_is_invalid_not_expired() {
        let crypto = crypto();
        let token = crypto.issue_at(&member(), NOW).unwrap();
        let (body, signature) = token.rsplit_once('.').unwrap();
        let mut bytes = signature.as_bytes().to_vec();
        bytes[0] = if bytes[0] == b'A' { b'B' } else { b'A' };
        let forged = format!("{}.{}", body, String::from_utf8(bytes).unwrap());
        // even long after expiry the forgery must read as invalid
        for now in [NOW, NOW + 30 * DAY] {
            assert_eq!(
                crypto.check_at(Some(&header(&forged)), now),
                Err(Rejection::InvalidToken)
            );
        }
    }

    #[test]
    fn trailing_garbage_is_invalid() {
        let crypto = crypto();
        let token = crypto.issue_at(&member(), NOW).unwrap();
        let corrupted = format!("{}x", token);
        assert_eq!(
            crypto.check_at(Some(&header(&corrupted)), NOW),
            Err(Rejection::InvalidToken)
        );
    }

    #[test]
    fn foreign_secret_is_invalid() {
        let other = Crypto::new(b"other-secret", crypto().ttl());
        let token = other.issue_at(&member(), NOW).unwrap();
        assert_eq!(
            crypto().check_at(Some(&header(&token)), NOW),
            Err(Rejection::InvalidToken)
        );
    }

    #[test]
    fn absent_or_malformed_header_is_missing() {
        let crypto = crypto();
        let token = crypto.issue_at(&member(), NOW).unwrap();
        let basic = format!("Basic {}", token);
        for header in [None, Some(""), Some("Bearer"), Some("Bearer   "), Some(basic.as_str())] {
            assert_eq!(crypto.check_at(header, NOW), Err(Rejection::MissingToken));
        }
    }

    #[test]
    fn non_jwt_bearer_is_invalid() {
        assert_eq!(
            crypto().check_at(Some("Bearer not-a-token"), NOW),
            Err(Rejection::InvalidToken)
        );
    }
}
