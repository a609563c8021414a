use super::*;
use actix_web::HttpResponse;
use actix_web::web;
use serde_json::Value;
use serde_json::json;

#[derive(Debug, serde::Deserialize)]
pub struct Page {
    pub limit: Option<usize>,
    pub facilitator_id: Option<i64>,
}

pub async fn notify(_: Caller, inbox: web::Data<Inbox>, body: web::Json<Value>) -> HttpResponse {
    match Notice::parse(&body) {
        Err(e) => {
            log::warn!("[crm] rejected notice: {}", e);
            let (key, fields) = e.required();
            let mut reply = serde_json::Map::new();
            reply.insert("error".into(), Value::from(e.to_string()));
            reply.insert(key.into(), Value::from(fields.to_vec()));
            HttpResponse::BadRequest().json(reply)
        }
        Ok(notice) => HttpResponse::Ok().json(json!({
            "message": "Booking notification received successfully",
            "notification_id": inbox.receive(notice),
            "status": "success",
        })),
    }
}

pub async fn notifications(
    _: Caller,
    inbox: web::Data<Inbox>,
    page: web::Query<Page>,
) -> HttpResponse {
    let limit = page.limit.unwrap_or(booking_core::CRM_PAGE);
    let (notifications, total) = inbox.recent(page.facilitator_id, limit);
    HttpResponse::Ok().json(json!({
        "notifications": notifications,
        "total": total,
    }))
}

pub async fn health(inbox: web::Data<Inbox>) -> HttpResponse {
    let timestamp = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default();
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "CRM Notification Service",
        "timestamp": timestamp,
        "total_notifications": inbox.len(),
    }))
}
