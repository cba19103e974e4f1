//! Uniform response envelope and pagination types shared by every endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::Order;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;
pub const DEFAULT_SORT: &str = "createdAt";

/// `{statusCode, message, errorCode, data, pageable}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse<T> {
    pub status_code: u16,
    pub message: Option<String>,
    pub error_code: Option<String>,
    pub data: Option<T>,
    pub pageable: Option<PageableResponse>,
}

impl<T> ServiceResponse<T> {
    pub fn from_data(data: T) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            message: None,
            error_code: None,
            data: Some(data),
            pageable: None,
        }
    }

    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            message: Some(message.into()),
            error_code: None,
            data: None,
            pageable: None,
        }
    }

    pub fn from_error(status: StatusCode, message: String, error_code: String) -> Self {
        Self {
            status_code: status.as_u16(),
            message: Some(message),
            error_code: Some(error_code),
            data: None,
            pageable: None,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status_code = status.as_u16();
        self
    }
}

impl<T> ServiceResponse<Vec<T>> {
    pub fn from_page(page: Page<T>) -> Self {
        let pageable = page.pageable();
        Self {
            status_code: StatusCode::OK.as_u16(),
            message: None,
            error_code: None,
            data: Some(page.content),
            pageable: Some(pageable),
        }
    }
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageableResponse {
    pub page: u64,
    pub count: u64,
    pub total_pages: u64,
    pub total_elements: u64,
}

/// One page of results plus the total across all pages
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageableRequest, total_elements: u64) -> Self {
        Self {
            content,
            page: request.page(),
            size: request.size(),
            total_elements,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(self.size)
    }

    pub fn pageable(&self) -> PageableResponse {
        PageableResponse {
            page: self.page,
            count: self.content.len() as u64,
            total_pages: self.total_pages(),
            total_elements: self.total_elements,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, utoipa::ToSchema)]
pub enum SortDirection {
    #[serde(rename = "ASC")]
    Asc,
    #[default]
    #[serde(rename = "DESC")]
    Desc,
}

impl<'de> Deserialize<'de> for SortDirection {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortDirection::Asc),
            "DESC" => Ok(SortDirection::Desc),
            _ => Err(serde::de::Error::unknown_variant(&raw, &["ASC", "DESC"])),
        }
    }
}

impl SortDirection {
    pub fn order(self) -> Order {
        match self {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }
}

/// `?page=&size=&sort=&direction=` with defaults 0 / 10 / createdAt / DESC
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageableRequest {
    pub page: Option<u64>,
    pub size: Option<u64>,
    pub sort: Option<String>,
    pub direction: Option<SortDirection>,
}

impl PageableRequest {
    pub fn of(page: u64, size: u64) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
            ..Default::default()
        }
    }

    pub fn page(&self) -> u64 {
        self.page.unwrap_or(0)
    }

    pub fn size(&self) -> u64 {
        self.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u64 {
        self.page().saturating_mul(self.size())
    }

    pub fn sort(&self) -> &str {
        self.sort
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SORT)
    }

    pub fn order(&self) -> Order {
        self.direction.unwrap_or_default().order()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pageable_defaults() {
        let req = PageableRequest::default();
        assert_eq!(req.page(), 0);
        assert_eq!(req.size(), 10);
        assert_eq!(req.sort(), "createdAt");
        assert_eq!(req.order(), Order::Desc);
    }

    #[test]
    fn test_direction_ignores_case() {
        let parse = |raw: &str| serde_json::from_value::<SortDirection>(serde_json::json!(raw));
        assert_eq!(parse("aSc").unwrap(), SortDirection::Asc);
        assert_eq!(parse("desc").unwrap(), SortDirection::Desc);
        assert_eq!(parse(" DESC ").unwrap(), SortDirection::Desc);
        assert!(parse("sideways").is_err());
        assert_eq!(serde_json::to_value(SortDirection::Asc).unwrap(), "ASC");
    }

    #[test]
    fn test_size_is_clamped() {
        assert_eq!(PageableRequest::of(0, 0).size(), 1);
        assert_eq!(PageableRequest::of(0, 1000).size(), MAX_PAGE_SIZE);
        assert_eq!(PageableRequest::of(3, 10).offset(), 30);
    }

    #[test]
    fn test_page_block() {
        let page = Page::new((0..10).collect::<Vec<_>>(), &PageableRequest::of(0, 10), 25);
        assert_eq!(
            page.pageable(),
            PageableResponse {
                page: 0,
                count: 10,
                total_pages: 3,
                total_elements: 25
            }
        );
    }

    #[test]
    fn test_empty_page() {
        let page: Page<u8> = Page::new(vec![], &PageableRequest::default(), 0);
        assert_eq!(page.total_pages(), 0);
    }

    #[test]
    fn test_envelope_keeps_null_keys() {
        let body = serde_json::to_value(ServiceResponse::from_data(1)).unwrap();
        assert_eq!(body["statusCode"], 200);
        assert!(body.get("message").unwrap().is_null());
        assert!(body.get("errorCode").unwrap().is_null());
        assert!(body.get("pageable").unwrap().is_null());
        assert_eq!(body["data"], 1);
    }

    #[test]
    fn test_direction_parses_case_insensitively() {
        let d: SortDirection = serde_json::from_str("\"asc\"").unwrap();
        assert_eq!(d, SortDirection::Asc);
        let d: SortDirection = serde_json::from_str("\"DESC\"").unwrap();
        assert_eq!(d, SortDirection::Desc);
    }
}
