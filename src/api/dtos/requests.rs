use crate::domain::models::service::ServiceConfig;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: Option<String>,
    pub config: ServiceConfig,
}

#[derive(Deserialize)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub config: Option<ServiceConfig>,
}

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub date: String,
    pub time: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub participants: Option<i32>,
}

#[derive(Deserialize)]
pub struct RescheduleBookingRequest {
    pub token: String,
    pub date: String,
    pub time: String,
}

#[derive(Deserialize)]
pub struct CancelBookingRequest {
    pub token: String,
}
