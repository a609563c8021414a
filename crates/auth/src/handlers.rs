use super::*;
use booking_core::Unique;
use actix_web::HttpResponse;
use actix_web::web;

pub async fn register(
    db: web::Data<dyn AuthRepository>,
    tokens: web::Data<Crypto>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AuthError> {
    let RegisterRequest {
        name,
        email,
        password,
    } = req.into_inner();
    let (name, email) = (name.trim(), email.trim());
    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields("Missing required fields"));
    }
    let hashword = password::hash(&password)?;
    let member = db
        .create(name, email, &hashword)
        .await?
        .ok_or(AuthError::DuplicateEmail)?;
    let token = tokens.issue(&member).map_err(anyhow::Error::from)?;
    log::info!("registered member {}", member.id());
    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user: member,
    }))
}

pub async fn login(
    db: web::Data<dyn AuthRepository>,
    tokens: web::Data<Crypto>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, AuthError> {
    let LoginRequest { email, password } = req.into_inner();
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields("Missing email or password"));
    }
    let (member, hashword) = db
        .lookup(email)
        .await?
        .ok_or(AuthError::BadCredentials)?;
    if !password::verify(&password, &hashword) {
        log::debug!("bad password for member {}", member.id());
        return Err(AuthError::BadCredentials);
    }
    let token = tokens.issue(&member).map_err(anyhow::Error::from)?;
    log::info!("member {} logged in", member.id());
    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user: member,
    }))
}

pub async fn me(auth: Auth) -> HttpResponse {
    HttpResponse::Ok().json(MeResponse { user: auth.0 })
}
